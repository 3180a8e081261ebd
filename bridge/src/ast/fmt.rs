use std::fmt::{Display, Formatter, Result};

use super::*;

/// Renders an expression as C source text.
/// Parentheses are only printed where the tree has a paren node.
pub struct ExprDisplay<'a> {
    ast: &'a AstContext,
    id: ExprId,
}

impl<'a> ExprDisplay<'a> {
    pub(super) fn new(ast: &'a AstContext, id: ExprId) -> Self {
        Self { ast, id }
    }

    fn of(&self, id: ExprId) -> ExprDisplay<'a> {
        ExprDisplay::new(self.ast, id)
    }
}

impl Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let expr = self.ast.expr(self.id);
        match &expr.kind {
            ExprKind::BoolLiteral(value) => write!(f, "{value}"),
            ExprKind::IntegerLiteral(value) => {
                write!(f, "{value}")?;
                if !self.ast.types().is_signed_integer(expr.ty) {
                    f.write_str("U")?;
                }
                Result::Ok(())
            }
            ExprKind::CharacterLiteral(value) => match char::from_u32(*value) {
                Some(c) if c.is_ascii_graphic() || c == ' ' => write!(f, "'{c}'"),
                _ => write!(f, "'\\x{value:02x}'"),
            },
            ExprKind::FloatingLiteral(bits) => match self.ast.bit_width(expr.ty) {
                32 => write!(f, "{:?}F", f32::from_bits(*bits as u32)),
                64 => write!(f, "{:?}", f64::from_bits(*bits as u64)),
                _ => write!(f, "__builtin_bit_cast({}, {bits:#x})", self.ast.display_type(expr.ty)),
            },
            ExprKind::DeclRef(decl) => f.write_str(&self.ast.decl(*decl).name),
            ExprKind::Unary { op, operand } => {
                if op.is_postfix() {
                    write!(f, "{}{op}", self.of(*operand))
                } else {
                    write!(f, "{op}{}", self.of(*operand))
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                write!(f, "{} {op} {}", self.of(*lhs), self.of(*rhs))
            }
            ExprKind::Cast {
                is_explicit: true,
                operand,
                ..
            } => write!(f, "({}){}", self.ast.display_type(expr.ty), self.of(*operand)),
            ExprKind::Cast { operand, .. } => self.of(*operand).fmt(f),
            ExprKind::Member {
                base,
                field,
                is_arrow,
            } => write!(
                f,
                "{}{}{}",
                self.of(*base),
                if *is_arrow { "->" } else { "." },
                self.ast.decl(*field).name
            ),
            ExprKind::ArraySubscript { base, index } => {
                write!(f, "{}[{}]", self.of(*base), self.of(*index))
            }
            ExprKind::Paren(inner) => write!(f, "({})", self.of(*inner)),
            ExprKind::Call { callee, args } => {
                write!(f, "{}(", self.of(*callee))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    self.of(*arg).fmt(f)?;
                }
                f.write_str(")")
            }
        }
    }
}

pub struct TypeDisplay<'a> {
    types: &'a TypeTable,
    ty: TypeId,
}

impl<'a> TypeDisplay<'a> {
    pub fn new(types: &'a TypeTable, ty: TypeId) -> Self {
        Self { types, ty }
    }
}

impl Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.types.get(self.ty) {
            Type::Void => f.write_str("void"),
            Type::Bool => f.write_str("_Bool"),
            Type::Int {
                kind: IntKind::Char,
                is_signed,
            } if *is_signed == self.types.target().char_is_signed => f.write_str("char"),
            Type::Int {
                kind,
                is_signed: true,
            } if *kind == IntKind::Char => write!(f, "signed {kind}"),
            Type::Int {
                kind,
                is_signed: true,
            } => write!(f, "{kind}"),
            Type::Int { kind, .. } => write!(f, "unsigned {kind}"),
            Type::Float(kind) => write!(f, "{kind}"),
            Type::Pointer(pointee) => write!(f, "{} *", TypeDisplay::new(self.types, *pointee)),
            Type::Array { element, len } => {
                write!(f, "{}[{len}]", TypeDisplay::new(self.types, *element))
            }
            Type::Record { name, .. } => write!(f, "struct {name}"),
        }
    }
}
