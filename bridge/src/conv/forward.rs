use tracing::debug_span;
use z3::{
    ast::{self, Ast},
    FuncDecl,
};

use common::{
    log_debug, log_fatal,
    z3::{float_from_ieee_bits, AstExt, AstNode, AstNodeSort, DeclKind},
};

use crate::ast::{BinaryOp, CastKind, DeclId, ExprId, ExprKind, StorageKind, TypeId, UnaryOp};

use super::{OpaqueOp, SortMapping, Z3ConvSession};

const TAG: &str = "forward";
const SPAN_EXPR: &str = "expr";

impl<'ctx> Z3ConvSession<'ctx, '_> {
    /// Translates the expression to an equivalent formula.
    /// Repeated calls for the same expression return the same formula.
    pub fn to_formula(&mut self, expr: ExprId) -> ast::Dynamic<'ctx> {
        if let Some(formula) = self.tables.formula_of(expr) {
            return formula.clone();
        }

        let span = debug_span!(target: TAG, SPAN_EXPR, expr = %self.ast.display(expr)).entered();
        let formula = self.translate_expr(expr);
        log_debug!(target: TAG, formula = %formula);
        span.exit();

        self.tables.insert_formula(expr, formula.clone());
        formula
    }

    fn translate_expr(&mut self, id: ExprId) -> ast::Dynamic<'ctx> {
        self.stats.forward_visits += 1;

        let expr = self.ast.expr(id).clone();
        match expr.kind {
            ExprKind::BoolLiteral(value) => {
                ast::Dynamic::from_ast(&ast::Bool::from_bool(self.context, value))
            }
            ExprKind::IntegerLiteral(value) => self.translate_integer_literal(value, expr.ty),
            ExprKind::CharacterLiteral(value) => {
                self.translate_integer_literal(value as u128, expr.ty)
            }
            ExprKind::FloatingLiteral(bits) => self.translate_floating_literal(bits, expr.ty),
            ExprKind::DeclRef(decl) => self.symbol_for(decl),
            ExprKind::Unary { op, operand } => self.translate_unary_expr(op, operand, expr.ty),
            ExprKind::Binary { op, lhs, rhs } => self.translate_binary_expr(op, lhs, rhs),
            ExprKind::Cast { kind, operand, .. } => {
                self.translate_cast_expr(kind, operand, expr.ty)
            }
            ExprKind::Member {
                base,
                field,
                is_arrow,
            } => self.translate_member_expr(base, field, is_arrow),
            ExprKind::ArraySubscript { base, index } => {
                self.translate_array_subscript_expr(base, index, expr.ty)
            }
            ExprKind::Paren(inner) => self.translate_paren_expr(inner),
            ExprKind::Call { .. } => log_fatal!(
                target: TAG,
                "Unsupported expression: {}",
                self.ast.display(id)
            ),
        }
    }

    fn translate_integer_literal(&mut self, value: u128, ty: TypeId) -> ast::Dynamic<'ctx> {
        let formula = match self.sort_of(ty) {
            AstNodeSort::Bool => {
                ast::Dynamic::from_ast(&ast::Bool::from_bool(self.context, value != 0))
            }
            AstNodeSort::BitVector { size } => {
                ast::Dynamic::from_ast(&self.make_bv_numeral(value, size))
            }
            sort => log_fatal!(
                target: TAG,
                "Integer literal {} has a non-integral sort: {}",
                value,
                sort
            ),
        };
        self.tables.hint_type(&formula, ty);
        formula
    }

    fn translate_floating_literal(&mut self, bits: u128, ty: TypeId) -> ast::Dynamic<'ctx> {
        let formula = match self.sort_of(ty) {
            AstNodeSort::Float { ebits, sbits } => ast::Dynamic::from_ast(
                &float_from_ieee_bits(self.context, bits, ebits, sbits),
            ),
            sort => log_fatal!(
                target: TAG,
                "Floating literal {:#x} has a non-floating sort: {}",
                bits,
                sort
            ),
        };
        self.tables.hint_type(&formula, ty);
        formula
    }

    fn make_bv_numeral(&self, value: u128, size: u32) -> ast::BV<'ctx> {
        if size <= u64::BITS {
            ast::BV::from_u64(self.context, value as u64, size)
        } else {
            ast::BV::from_str(self.context, size, &value.to_string()).unwrap_or_else(|| {
                log_fatal!(target: TAG, "Invalid numeral {} for width {}", value, size)
            })
        }
    }

    /// The zero-arity application standing for the declaration.
    fn symbol_for(&mut self, decl: DeclId) -> ast::Dynamic<'ctx> {
        let context = self.context;
        let ast = &*self.ast;
        self.tables
            .register_symbol(decl, || {
                let info = ast.decl(decl);
                // The id keeps declarations with the same name apart.
                let name = match info.storage {
                    StorageKind::Field { record } => format!(
                        "{}_{}.{}",
                        decl.index(),
                        ast.types().record_name(record).unwrap_or_default(),
                        info.name
                    ),
                    StorageKind::Local | StorageKind::Global => {
                        format!("{}_{}", decl.index(), info.name)
                    }
                };
                let sort = ast.types().sort_of(info.ty).to_z3(context);
                log_debug!(target: TAG, "Creating symbol {} for {}", name, decl);
                FuncDecl::new(context, name, &[], &sort).apply(&[])
            })
            .clone()
    }

    fn translate_unary_expr(
        &mut self,
        op: UnaryOp,
        operand: ExprId,
        ty: TypeId,
    ) -> ast::Dynamic<'ctx> {
        let operand = self.to_formula(operand);
        let opaque_op = match op {
            UnaryOp::LNot => {
                // Folds the double negation of coerced integers.
                return ast::Dynamic::from_ast(&self.bool_cast(&operand).not().simplify());
            }
            UnaryOp::AddrOf => OpaqueOp::AddrOf,
            UnaryOp::Deref => OpaqueOp::Deref,
            _ => log_fatal!(
                target: TAG,
                "Unsupported unary operator {:?} on: {}",
                op,
                operand
            ),
        };
        let range = self.sort_of(ty).to_z3(self.context);
        self.registry.apply(opaque_op, &[&operand], &range)
    }

    fn translate_binary_expr(
        &mut self,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    ) -> ast::Dynamic<'ctx> {
        let left = self.to_formula(lhs);
        let right = self.to_formula(rhs);

        match op {
            BinaryOp::LAnd | BinaryOp::LOr => {
                let left = self.bool_cast(&left);
                let right = self.bool_cast(&right);
                let result = if op == BinaryOp::LAnd {
                    ast::Bool::and(self.context, &[&left, &right])
                } else {
                    ast::Bool::or(self.context, &[&left, &right])
                };
                return ast::Dynamic::from_ast(&result);
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                assert_eq!(
                    left.get_sort(),
                    right.get_sort(),
                    "Operands of {op} are expected to be of the same sort: {left}, {right}"
                );
                let result = if op == BinaryOp::Eq {
                    left._eq(&right)
                } else {
                    ast::Dynamic::distinct(self.context, &[&left, &right])
                };
                return ast::Dynamic::from_ast(&result);
            }
            _ => {}
        }

        let (left, right) = (AstNode::from(left), AstNode::from(right));
        let left_bv = left.as_bit_vector();
        let right = match op {
            // Z3 requires the operands of a shift to be of the same size.
            BinaryOp::Shr if left.z3_sort() != right.z3_sort() => {
                let left_size = left_bv.get_size();
                let right_bv = right.as_bit_vector();
                let right_size = right_bv.get_size();
                if right_size > left_size {
                    right_bv.extract(left_size - 1, 0)
                } else {
                    right_bv.zero_ext(left_size - right_size)
                }
            }
            _ => right.as_bit_vector().clone(),
        };
        assert_eq!(
            left_bv.get_size(),
            right.get_size(),
            "Operands of {op} are expected to be of the same width: {left}, {right}"
        );

        let f: fn(&ast::BV<'ctx>, &ast::BV<'ctx>) -> ast::BV<'ctx> = match op {
            BinaryOp::Rem => ast::BV::bvsrem,
            BinaryOp::Add => ast::BV::bvadd,
            BinaryOp::Sub => ast::BV::bvsub,
            BinaryOp::And => ast::BV::bvand,
            BinaryOp::Xor => ast::BV::bvxor,
            BinaryOp::Shr if self.ast.is_signed_integer(self.ast.type_of(lhs)) => {
                ast::BV::bvashr
            }
            BinaryOp::Shr => ast::BV::bvlshr,
            _ => log_fatal!(
                target: TAG,
                "Unsupported binary operator {:?} on: {}, {}",
                op,
                left,
                right
            ),
        };
        ast::Dynamic::from_ast(&f(left_bv, &right))
    }

    fn translate_cast_expr(
        &mut self,
        kind: CastKind,
        operand: ExprId,
        ty: TypeId,
    ) -> ast::Dynamic<'ctx> {
        let source = self.to_formula(operand);
        let src_ty = self.ast.type_of(operand);
        let dst_sort = self.sort_of(ty);

        let formula = match kind {
            CastKind::PointerToIntegral => {
                let range = dst_sort.to_z3(self.context);
                self.registry.apply(OpaqueOp::PtrToInt, &[&source], &range)
            }
            CastKind::IntegralToPointer => {
                let witness = self.registry.type_witness(ty, dst_sort.size());
                let range = dst_sort.to_z3(self.context);
                self.registry
                    .apply(OpaqueOp::IntToPtr, &[&witness, &source], &range)
            }
            CastKind::IntegralCast | CastKind::NullToPointer => match AstNode::from(source) {
                AstNode::Bool(cond) => {
                    let size = dst_sort.size();
                    ast::Dynamic::from_ast(&cond.ite(
                        &self.make_bv_numeral(1, size),
                        &self.make_bv_numeral(0, size),
                    ))
                }
                AstNode::BitVector(bv) => {
                    ast::Dynamic::from_ast(&self.translate_bitwise_cast(&bv, src_ty, &dst_sort))
                }
                source => log_fatal!(
                    target: TAG,
                    "Unsupported operand for {}: {}",
                    kind,
                    source
                ),
            },
            CastKind::ArrayToPointerDecay => {
                if !AstNode::from(source.clone()).is_bit_vector() {
                    log_fatal!(
                        target: TAG,
                        "Array to decay is expected to be a bit vector: {}",
                        source
                    )
                }
                let range = dst_sort.to_z3(self.context);
                self.registry.apply(OpaqueOp::PtrDecay, &[&source], &range)
            }
            CastKind::IntegralToBoolean => ast::Dynamic::from_ast(&self.bool_cast(&source)),
            _ => log_fatal!(
                target: TAG,
                "Unsupported cast {} of: {}",
                kind,
                self.ast.display(operand)
            ),
        };

        if matches!(
            kind,
            CastKind::IntegralCast | CastKind::IntegralToPointer | CastKind::PointerToIntegral
        ) {
            self.tables.hint_type(&formula, ty);
        }
        formula
    }

    /// Extends or truncates the source to the width of the destination.
    fn translate_bitwise_cast(
        &self,
        source: &ast::BV<'ctx>,
        src_ty: TypeId,
        dst_sort: &AstNodeSort,
    ) -> ast::BV<'ctx> {
        let src_size = source.get_size();
        let dst_size = dst_sort.size();
        if dst_size > src_size {
            if self.ast.is_signed_integer(src_ty) {
                source.sign_ext(dst_size - src_size)
            } else {
                source.zero_ext(dst_size - src_size)
            }
        } else if dst_size < src_size {
            source.extract(dst_size - 1, 0)
        } else {
            source.clone()
        }
    }

    fn translate_member_expr(
        &mut self,
        base: ExprId,
        field: DeclId,
        is_arrow: bool,
    ) -> ast::Dynamic<'ctx> {
        let mut base_formula = self.to_formula(base);
        if is_arrow {
            let base_ty = self.ast.type_of(base);
            let record_ty = self.ast.pointee(base_ty).unwrap_or_else(|| {
                log_fatal!(
                    target: TAG,
                    "Base of an arrow member access is expected to be a pointer: {}",
                    self.ast.display(base)
                )
            });
            let range = self.sort_of(record_ty).to_z3(self.context);
            base_formula = self
                .registry
                .apply(OpaqueOp::Deref, &[&base_formula], &range);
        }

        let field_formula = self.symbol_for(field);
        let range = field_formula.get_sort();
        self.registry
            .apply(OpaqueOp::Member, &[&base_formula, &field_formula], &range)
    }

    fn translate_array_subscript_expr(
        &mut self,
        base: ExprId,
        index: ExprId,
        ty: TypeId,
    ) -> ast::Dynamic<'ctx> {
        let base_formula = self.to_formula(base);
        let index_formula = self.to_formula(index);
        for formula in [&base_formula, &index_formula] {
            if !AstNode::from(formula.clone()).is_bit_vector() {
                log_fatal!(
                    target: TAG,
                    "Operands of array subscript are expected to be bit vectors: {}",
                    formula
                )
            }
        }

        let range = self.sort_of(ty).to_z3(self.context);
        self.registry.apply(
            OpaqueOp::ArraySub,
            &[&base_formula, &index_formula],
            &range,
        )
    }

    fn translate_paren_expr(&mut self, inner: ExprId) -> ast::Dynamic<'ctx> {
        let inner = self.to_formula(inner);
        // Grouping of native operations is implied by the term structure.
        if inner.app_decl_kind() == DeclKind::UNINTERPRETED {
            let range = inner.get_sort();
            self.registry.apply(OpaqueOp::Paren, &[&inner], &range)
        } else {
            inner
        }
    }
}
