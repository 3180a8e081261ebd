use std::cmp::Ordering;

use itertools::Itertools;
use tracing::debug_span;
use z3::ast::{self, Ast};

use common::{
    log_debug, log_fatal,
    z3::{AstExt, AstKind, AstNodeSort, DeclKind},
};

use crate::ast::{BinaryOp, CastKind, ExprId, ExprKind, IntKind, NodeFactory, TypeId, UnaryOp};

use super::{OpaqueOp, SortMapping, Z3ConvSession};

const TAG: &str = "reverse";
const SPAN_FORMULA: &str = "formula";

/// How the type of a reconstructed binary operation is determined.
#[derive(Debug, Clone, Copy)]
enum ResultType {
    Bool,
    /// The operand type with the higher integer conversion rank.
    Rank,
    Lhs,
}

impl<'ctx> Z3ConvSession<'ctx, '_> {
    /// Translates the formula to an equivalent expression.
    /// Repeated calls for the same formula return the same expression.
    pub fn to_expr(&mut self, formula: &ast::Dynamic<'ctx>) -> ExprId {
        self.get_or_lift(formula).unwrap_or_else(|| {
            log_fatal!(
                target: TAG,
                "Formula has no expression equivalent: {}",
                formula
            )
        })
    }

    fn get_or_lift(&mut self, formula: &ast::Dynamic<'ctx>) -> Option<ExprId> {
        if let Some(expr) = self.tables.expr_of(formula) {
            return Some(expr);
        }

        let span = debug_span!(target: TAG, SPAN_FORMULA, formula = %formula).entered();
        let expr = self.lift(formula);
        if let Some(expr) = expr {
            log_debug!(target: TAG, expr = %self.ast.display(expr));
        }
        span.exit();

        let expr = expr?;
        self.tables.insert_expr(formula.clone(), expr);
        Some(expr)
    }

    fn lift_operand(&mut self, formula: &ast::Dynamic<'ctx>) -> ExprId {
        self.get_or_lift(formula).unwrap_or_else(|| {
            log_fatal!(
                target: TAG,
                "Operand is a helper constant and cannot be translated: {}",
                formula
            )
        })
    }

    fn lift(&mut self, formula: &ast::Dynamic<'ctx>) -> Option<ExprId> {
        self.stats.reverse_visits += 1;

        match formula.ast_kind() {
            AstKind::App | AstKind::Numeral => {}
            AstKind::Quantifier => {
                log_fatal!(target: TAG, "Unsupported quantified formula: {}", formula)
            }
            kind => log_fatal!(
                target: TAG,
                "Unexpected formula of kind {:?}: {}",
                kind,
                formula
            ),
        }

        match formula.num_children() {
            0 => self.lift_constant(formula),
            1 => Some(self.lift_unary_app(formula)),
            _ => Some(self.lift_nary_app(formula)),
        }
    }

    fn lift_constant(&mut self, formula: &ast::Dynamic<'ctx>) -> Option<ExprId> {
        let kind = formula.app_decl_kind();
        let expr = match kind {
            DeclKind::TRUE | DeclKind::FALSE => {
                let ty = self.ast.types().unsigned_int();
                self.ast
                    .create_integer_literal((kind == DeclKind::TRUE) as u128, ty)
            }
            DeclKind::BNUM => self.lift_bv_numeral(formula),
            DeclKind::FPA_NUM
            | DeclKind::FPA_PLUS_ZERO
            | DeclKind::FPA_MINUS_ZERO
            | DeclKind::FPA_PLUS_INF
            | DeclKind::FPA_MINUS_INF
            | DeclKind::FPA_NAN => self.lift_fp_numeral(formula, kind == DeclKind::FPA_NAN),
            DeclKind::ANUM => log_fatal!(
                target: TAG,
                "Arithmetic numerals have no C type: {}",
                formula
            ),
            // Solver-introduced helpers are consumed by their parents.
            DeclKind::INTERNAL => return None,
            DeclKind::UNINTERPRETED => {
                if self.registry.witnessed_type(formula).is_some() {
                    return None;
                }
                let decl = self.tables.decl_of(formula);
                self.ast.create_decl_ref(decl)
            }
            _ => log_fatal!(
                target: TAG,
                "Unsupported constant of kind {:?}: {}",
                kind,
                formula
            ),
        };
        Some(expr)
    }

    fn lift_bv_numeral(&mut self, formula: &ast::Dynamic<'ctx>) -> ExprId {
        let value = formula.as_u128().unwrap_or_else(|| {
            log_fatal!(
                target: TAG,
                "Numeral does not fit in 128 bits: {}",
                formula
            )
        });
        let ty = self.literal_type(formula);
        if self.ast.types().is_char(ty) {
            self.ast.create_character_literal(value as u32, ty)
        } else {
            self.ast.create_integer_literal(value, ty)
        }
    }

    fn lift_fp_numeral(&mut self, formula: &ast::Dynamic<'ctx>, is_nan: bool) -> ExprId {
        let (ebits, sbits) = formula.fpa_widths();
        let bits = formula
            .fpa_ieee_bits()
            // The bit pattern of NaN is left unspecified by the solver.
            .or_else(|| is_nan.then(|| quiet_nan_bits(ebits, sbits)))
            .unwrap_or_else(|| {
                log_fatal!(
                    target: TAG,
                    "Could not get the bit pattern of: {}",
                    formula
                )
            });
        let ty = self.literal_type(formula);
        self.ast.create_floating_literal(bits, ty)
    }

    /// The type for a literal or a cast of the sort of the formula.
    fn literal_type(&self, formula: &ast::Dynamic<'ctx>) -> TypeId {
        let sort = AstNodeSort::of(formula);
        self.hinted_type(formula, &sort).unwrap_or_else(|| {
            self.ast
                .types()
                .best_fit_type(&sort, self.config.literal_signedness.is_signed())
        })
    }

    fn hinted_type(&self, formula: &ast::Dynamic<'ctx>, sort: &AstNodeSort) -> Option<TypeId> {
        if !self.config.type_hints {
            return None;
        }
        self.tables
            .hinted_type(formula)
            .filter(|ty| self.sort_of(*ty) == *sort)
    }

    fn lift_unary_app(&mut self, formula: &ast::Dynamic<'ctx>) -> ExprId {
        let args = formula.children();
        let arg = &args[0];
        let kind = formula.app_decl_kind();
        match kind {
            DeclKind::NOT => {
                let operand = self.lift_operand(arg);
                self.make_not(operand)
            }
            DeclKind::EXTRACT | DeclKind::ZERO_EXT | DeclKind::SIGN_EXT => {
                self.lift_integral_cast(formula, arg)
            }
            DeclKind::UNINTERPRETED => self.lift_opaque_unary_app(formula, arg),
            _ => log_fatal!(
                target: TAG,
                "Unsupported unary operation of kind {:?}: {}",
                kind,
                formula
            ),
        }
    }

    fn lift_integral_cast(
        &mut self,
        formula: &ast::Dynamic<'ctx>,
        arg: &ast::Dynamic<'ctx>,
    ) -> ExprId {
        let kind = formula.app_decl_kind();
        if kind == DeclKind::EXTRACT && formula.app_decl_int_param(1) != 0 {
            log_fatal!(
                target: TAG,
                "Extraction not starting at the lowest bit has no cast equivalent: {}",
                formula
            )
        }

        let operand = self.lift_operand(arg);
        let operand_ty = self.ast.type_of(operand);
        if !self.ast.is_integer(operand_ty) {
            log_fatal!(
                target: TAG,
                "Operand of {} is expected to be an integer: {}",
                formula,
                self.ast.display(operand)
            )
        }

        // The kind of the extension in C follows the signedness of the operand.
        let operand = match kind {
            DeclKind::ZERO_EXT => self.with_signedness(operand, false),
            DeclKind::SIGN_EXT => self.with_signedness(operand, true),
            _ => operand,
        };
        let operand_ty = self.ast.type_of(operand);

        let sort = AstNodeSort::of(formula);
        let ty = self.hinted_type(formula, &sort).unwrap_or_else(|| {
            self.ast
                .types()
                .int_type_for_bitwidth(sort.size(), self.ast.is_signed_integer(operand_ty))
                .unwrap_or_else(|| {
                    log_fatal!(target: TAG, "No integer type for the result of: {}", formula)
                })
        });
        self.ast
            .create_cast(CastKind::IntegralCast, true, operand, ty)
    }

    fn lift_opaque_unary_app(
        &mut self,
        formula: &ast::Dynamic<'ctx>,
        arg: &ast::Dynamic<'ctx>,
    ) -> ExprId {
        let op = self.registry.resolve(formula).unwrap_or_else(|| {
            log_fatal!(
                target: TAG,
                "Unknown uninterpreted function: {}",
                formula.decl().name()
            )
        });
        let operand = self.lift_operand(arg);
        let operand_ty = self.ast.type_of(operand);
        match op {
            OpaqueOp::AddrOf => {
                let ty = self.ast.types_mut().pointer_to(operand_ty);
                self.ast.create_unary(UnaryOp::AddrOf, operand, ty)
            }
            OpaqueOp::Deref => {
                let ty = self.ast.pointee(operand_ty).unwrap_or_else(|| {
                    log_fatal!(
                        target: TAG,
                        "Operand of dereference is expected to be a pointer: {}",
                        self.ast.display(operand)
                    )
                });
                self.ast.create_unary(UnaryOp::Deref, operand, ty)
            }
            OpaqueOp::Paren => self.ast.create_paren(operand),
            OpaqueOp::PtrDecay => {
                let ty = self
                    .ast
                    .types_mut()
                    .array_decayed(operand_ty)
                    .unwrap_or_else(|| {
                        log_fatal!(
                            target: TAG,
                            "Operand of pointer decay is expected to be an array: {}",
                            self.ast.display(operand)
                        )
                    });
                self.ast
                    .create_cast(CastKind::ArrayToPointerDecay, false, operand, ty)
            }
            OpaqueOp::PtrToInt => {
                let sort = AstNodeSort::of(formula);
                let ty = self.hinted_type(formula, &sort).unwrap_or_else(|| {
                    self.ast
                        .types()
                        .int_type_for_bitwidth(sort.size(), false)
                        .unwrap_or_else(|| {
                            log_fatal!(target: TAG, "No integer type for the result of: {}", formula)
                        })
                });
                self.ast
                    .create_cast(CastKind::PointerToIntegral, true, operand, ty)
            }
            OpaqueOp::IntToPtr | OpaqueOp::ArraySub | OpaqueOp::Member => log_fatal!(
                target: TAG,
                "Unexpected number of arguments for {}: {}",
                op,
                formula
            ),
        }
    }

    fn lift_nary_app(&mut self, formula: &ast::Dynamic<'ctx>) -> ExprId {
        let args = formula.children();
        let kind = formula.app_decl_kind();
        match kind {
            DeclKind::ITE => self.lift_bool_to_int(formula, &args),
            DeclKind::EQ => self.lift_binary(BinaryOp::Eq, ResultType::Bool, formula, &args),
            DeclKind::DISTINCT if args.len() == 2 => {
                self.lift_binary(BinaryOp::Ne, ResultType::Bool, formula, &args)
            }
            DeclKind::AND => self.lift_fold(BinaryOp::LAnd, ResultType::Bool, &args),
            DeclKind::OR => self.lift_fold(BinaryOp::LOr, ResultType::Bool, &args),
            DeclKind::BADD => self.lift_fold(BinaryOp::Add, ResultType::Rank, &args),
            DeclKind::BMUL => self.lift_fold(BinaryOp::Mul, ResultType::Rank, &args),
            DeclKind::BAND => self.lift_fold(BinaryOp::And, ResultType::Rank, &args),
            DeclKind::BOR => self.lift_fold(BinaryOp::Or, ResultType::Rank, &args),
            DeclKind::BXOR => self.lift_fold(BinaryOp::Xor, ResultType::Rank, &args),
            DeclKind::BSUB => self.lift_binary(BinaryOp::Sub, ResultType::Rank, formula, &args),
            DeclKind::BSREM | DeclKind::BSREM_I => {
                self.lift_binary(BinaryOp::Rem, ResultType::Rank, formula, &args)
            }
            DeclKind::BSHL => self.lift_binary(BinaryOp::Shl, ResultType::Lhs, formula, &args),
            DeclKind::BASHR | DeclKind::BLSHR => {
                self.lift_shift_right(kind == DeclKind::BASHR, formula, &args)
            }
            DeclKind::UNINTERPRETED => self.lift_opaque_nary_app(formula, &args),
            _ => log_fatal!(
                target: TAG,
                "Unsupported operation of kind {:?}: {}",
                kind,
                formula
            ),
        }
    }

    /// Lifts `ite(c, 1, 0)` and `ite(c, 0, 1)`, the encodings of converting
    /// a boolean to an integer.
    fn lift_bool_to_int(
        &mut self,
        formula: &ast::Dynamic<'ctx>,
        args: &[ast::Dynamic<'ctx>],
    ) -> ExprId {
        let sort = AstNodeSort::of(formula);
        let branches = args
            .iter()
            .collect_tuple()
            .filter(|_| matches!(sort, AstNodeSort::BitVector { .. }))
            .and_then(|(cond, then, els)| Some((cond, then.as_u128()?, els.as_u128()?)));
        let (cond, is_negated) = match branches {
            Some((cond, 1, 0)) => (cond, false),
            Some((cond, 0, 1)) => (cond, true),
            _ => log_fatal!(
                target: TAG,
                "Unsupported conditional formula: {}",
                formula
            ),
        };

        let mut operand = self.lift_operand(cond);
        if !self.ast.types().is_bool(self.ast.type_of(operand)) {
            log_fatal!(
                target: TAG,
                "Condition is expected to be a boolean: {}",
                self.ast.display(operand)
            )
        }
        if is_negated {
            operand = self.make_not(operand);
        }

        let ty = self.literal_type(formula);
        self.ast
            .create_cast(CastKind::IntegralCast, false, operand, ty)
    }

    /// The logical negation, typed `int` as in C.
    fn make_not(&mut self, operand: ExprId) -> ExprId {
        let ty = self.ast.types().int(IntKind::Int, true);
        self.ast.create_unary(UnaryOp::LNot, operand, ty)
    }

    fn binary_args<'f>(
        formula: &ast::Dynamic<'ctx>,
        args: &'f [ast::Dynamic<'ctx>],
    ) -> (&'f ast::Dynamic<'ctx>, &'f ast::Dynamic<'ctx>) {
        args.iter().collect_tuple().unwrap_or_else(|| {
            log_fatal!(
                target: TAG,
                "Expected a binary operation: {}",
                formula
            )
        })
    }

    fn lift_binary(
        &mut self,
        op: BinaryOp,
        rule: ResultType,
        formula: &ast::Dynamic<'ctx>,
        args: &[ast::Dynamic<'ctx>],
    ) -> ExprId {
        let (lhs, rhs) = Self::binary_args(formula, args);
        let lhs = self.lift_operand(lhs);
        let rhs = self.lift_operand(rhs);
        self.make_binary(op, rule, lhs, rhs)
    }

    /// Folds the arguments into left-associative binary operations.
    fn lift_fold(&mut self, op: BinaryOp, rule: ResultType, args: &[ast::Dynamic<'ctx>]) -> ExprId {
        let operands = args
            .iter()
            .map(|arg| self.lift_operand(arg))
            .collect::<Vec<_>>();
        operands
            .into_iter()
            .reduce(|lhs, rhs| self.make_binary(op, rule, lhs, rhs))
            .unwrap_or_else(|| log_fatal!(target: TAG, "No operands for {}", op))
    }

    fn lift_shift_right(
        &mut self,
        is_arithmetic: bool,
        formula: &ast::Dynamic<'ctx>,
        args: &[ast::Dynamic<'ctx>],
    ) -> ExprId {
        let (lhs, rhs) = Self::binary_args(formula, args);
        let lhs = self.lift_operand(lhs);
        let rhs = self.lift_operand(rhs);
        // The kind of the shift in C follows the signedness of the left operand.
        let lhs = self.with_signedness(lhs, is_arithmetic);
        self.make_binary(BinaryOp::Shr, ResultType::Lhs, lhs, rhs)
    }

    fn with_signedness(&mut self, expr: ExprId, is_signed: bool) -> ExprId {
        let ty = self.ast.type_of(expr);
        if !self.ast.is_integer(ty) || self.ast.is_signed_integer(ty) == is_signed {
            return expr;
        }

        match self
            .ast
            .types()
            .int_type_for_bitwidth(self.ast.bit_width(ty) as u32, is_signed)
        {
            Some(target) => self
                .ast
                .create_cast(CastKind::IntegralCast, true, expr, target),
            None => expr,
        }
    }

    fn make_binary(&mut self, op: BinaryOp, rule: ResultType, lhs: ExprId, rhs: ExprId) -> ExprId {
        let lhs_ty = self.ast.type_of(lhs);
        let rhs_ty = self.ast.type_of(rhs);
        let ty = match rule {
            ResultType::Bool => self.ast.types().bool(),
            ResultType::Rank => match self.ast.types().integer_type_order(lhs_ty, rhs_ty) {
                Some(Ordering::Less) => rhs_ty,
                _ => lhs_ty,
            },
            ResultType::Lhs => lhs_ty,
        };
        self.ast.create_binary(op, lhs, rhs, ty)
    }

    fn lift_opaque_nary_app(
        &mut self,
        formula: &ast::Dynamic<'ctx>,
        args: &[ast::Dynamic<'ctx>],
    ) -> ExprId {
        let op = self.registry.resolve(formula).unwrap_or_else(|| {
            log_fatal!(
                target: TAG,
                "Unknown uninterpreted function: {}",
                formula.decl().name()
            )
        });
        let (first, second) = Self::binary_args(formula, args);
        match op {
            OpaqueOp::ArraySub => {
                let base = self.lift_operand(first);
                let index = self.lift_operand(second);
                let ty = self.ast.pointee(self.ast.type_of(base)).unwrap_or_else(|| {
                    log_fatal!(
                        target: TAG,
                        "Base of array subscript is expected to be a pointer: {}",
                        self.ast.display(base)
                    )
                });
                self.ast.create_array_subscript(base, index, ty)
            }
            OpaqueOp::Member => {
                let mut base = self.lift_operand(first);
                if matches!(self.ast.expr(base).kind, ExprKind::Unary {
                    op: UnaryOp::Deref,
                    ..
                }) {
                    base = self.ast.create_paren(base);
                }
                // The field's symbol is resolved directly, not as a reference.
                let field = self.tables.decl_of(second);
                self.ast.create_member(base, field, false)
            }
            OpaqueOp::IntToPtr => {
                let ty = self.registry.witnessed_type(first).unwrap_or_else(|| {
                    log_fatal!(
                        target: TAG,
                        "First argument of {} is expected to be a type witness: {}",
                        op,
                        first
                    )
                });
                let operand = self.lift_operand(second);
                self.ast
                    .create_cast(CastKind::IntegralToPointer, true, operand, ty)
            }
            OpaqueOp::AddrOf
            | OpaqueOp::Deref
            | OpaqueOp::Paren
            | OpaqueOp::PtrDecay
            | OpaqueOp::PtrToInt => log_fatal!(
                target: TAG,
                "Unexpected number of arguments for {}: {}",
                op,
                formula
            ),
        }
    }
}

/// The canonical quiet NaN of the format: positive, with only the most
/// significant bit of the trailing significand set.
fn quiet_nan_bits(ebits: u32, sbits: u32) -> u128 {
    let exponent = ((1u128 << ebits) - 1) << (sbits - 1);
    exponent | (1u128 << (sbits - 2))
}
