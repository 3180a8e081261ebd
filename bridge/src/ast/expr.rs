use derive_more as dm;

use super::{DeclId, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, dm::Display)]
#[display("e{_0}")]
pub struct ExprId(pub(crate) u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    BoolLiteral(bool),
    IntegerLiteral(u128),
    CharacterLiteral(u32),
    /// The IEEE-754 bit pattern of the value.
    FloatingLiteral(u128),
    DeclRef(DeclId),
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Cast {
        kind: CastKind,
        is_explicit: bool,
        operand: ExprId,
    },
    Member {
        base: ExprId,
        field: DeclId,
        is_arrow: bool,
    },
    ArraySubscript {
        base: ExprId,
        index: ExprId,
    },
    Paren(ExprId),
    Call {
        callee: ExprId,
        args: Vec<ExprId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, dm::Display)]
pub enum UnaryOp {
    #[display("&")]
    AddrOf,
    #[display("*")]
    Deref,
    #[display("+")]
    Plus,
    #[display("-")]
    Minus,
    #[display("~")]
    Not,
    #[display("!")]
    LNot,
    #[display("++")]
    PreInc,
    #[display("--")]
    PreDec,
    #[display("++")]
    PostInc,
    #[display("--")]
    PostDec,
}

impl UnaryOp {
    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, dm::Display)]
pub enum BinaryOp {
    #[display("*")]
    Mul,
    #[display("/")]
    Div,
    #[display("%")]
    Rem,
    #[display("+")]
    Add,
    #[display("-")]
    Sub,
    #[display("<<")]
    Shl,
    #[display(">>")]
    Shr,
    #[display("<")]
    Lt,
    #[display(">")]
    Gt,
    #[display("<=")]
    Le,
    #[display(">=")]
    Ge,
    #[display("==")]
    Eq,
    #[display("!=")]
    Ne,
    #[display("&")]
    And,
    #[display("^")]
    Xor,
    #[display("|")]
    Or,
    #[display("&&")]
    LAnd,
    #[display("||")]
    LOr,
    #[display("=")]
    Assign,
    #[display(",")]
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, dm::Display)]
pub enum CastKind {
    NoOp,
    IntegralCast,
    IntegralToBoolean,
    IntegralToPointer,
    PointerToIntegral,
    NullToPointer,
    ArrayToPointerDecay,
    LValueToRValue,
    BitCast,
    FloatingCast,
    IntegralToFloating,
    FloatingToIntegral,
}
