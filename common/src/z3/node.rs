use derive_more as dm;
use z3::{
    ast::{self, Ast},
    Context, Sort, Symbol,
};

use super::{AstExt, SortKind};

/* NOTE: Why not using `Dynamic` everywhere?
 * Most operations are only defined for a specific sort, and the variants let
 * us check the sort once when a term enters the translators instead of at
 * every use site.
 */
#[derive(Debug, Clone, PartialEq, Eq, dm::Display)]
#[display("{_0}")]
pub enum AstNode<'ctx> {
    Bool(ast::Bool<'ctx>),
    BitVector(ast::BV<'ctx>),
    Float(ast::Float<'ctx>),
    /// Terms of uninterpreted sorts (i.e., aggregates).
    Opaque(ast::Dynamic<'ctx>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, dm::Display)]
pub enum AstNodeSort {
    #[display("Bool")]
    Bool,
    #[display("(_ BitVec {size})")]
    BitVector { size: u32 },
    #[display("(_ FloatingPoint {ebits} {sbits})")]
    Float { ebits: u32, sbits: u32 },
    #[display("{name}")]
    Uninterpreted { name: String },
}

impl AstNodeSort {
    /// The number of bits a value of this sort occupies.
    /// Uninterpreted sorts have no bit-level representation and report zero.
    pub fn size(&self) -> u32 {
        match self {
            Self::Bool => 1,
            Self::BitVector { size } => *size,
            Self::Float { ebits, sbits } => ebits + sbits,
            Self::Uninterpreted { .. } => 0,
        }
    }

    pub fn to_z3<'ctx>(&self, context: &'ctx Context) -> Sort<'ctx> {
        match self {
            Self::Bool => Sort::bool(context),
            Self::BitVector { size } => Sort::bitvector(context, *size),
            Self::Float { ebits, sbits } => Sort::float(context, *ebits, *sbits),
            Self::Uninterpreted { name } => Sort::uninterpreted(context, Symbol::String(name.clone())),
        }
    }

    pub fn of<'ctx>(ast: &ast::Dynamic<'ctx>) -> Self {
        let sort = ast.get_sort();
        match sort.kind() {
            SortKind::Bool => Self::Bool,
            SortKind::BV => Self::BitVector {
                size: ast
                    .as_bv()
                    .map(|bv| bv.get_size())
                    .unwrap_or_else(|| panic!("Bit vector sort without a size: {ast}")),
            },
            SortKind::FloatingPoint => {
                let (ebits, sbits) = ast.fpa_widths();
                Self::Float { ebits, sbits }
            }
            SortKind::Uninterpreted => Self::Uninterpreted {
                name: sort.to_string(),
            },
            kind => panic!("Unsupported Z3 sort {kind:?} for term: {ast}"),
        }
    }
}

impl<'ctx> From<ast::Bool<'ctx>> for AstNode<'ctx> {
    fn from(ast: ast::Bool<'ctx>) -> Self {
        Self::Bool(ast)
    }
}

impl<'ctx> From<ast::BV<'ctx>> for AstNode<'ctx> {
    fn from(ast: ast::BV<'ctx>) -> Self {
        Self::BitVector(ast)
    }
}

impl<'ctx> From<ast::Dynamic<'ctx>> for AstNode<'ctx> {
    fn from(ast: ast::Dynamic<'ctx>) -> Self {
        match ast.get_sort().kind() {
            SortKind::Bool => ast.as_bool().map(Self::Bool),
            SortKind::BV => ast.as_bv().map(Self::BitVector),
            SortKind::FloatingPoint => ast.as_float().map(Self::Float),
            _ => Some(Self::Opaque(ast.clone())),
        }
        .unwrap_or_else(|| panic!("Sort of {ast} is not compatible with its kind."))
    }
}

impl<'ctx> AstNode<'ctx> {
    pub fn as_bool(&self) -> &ast::Bool<'ctx> {
        match self {
            Self::Bool(ast) => ast,
            _ => panic!("Expected the value to be a boolean expression: {self}"),
        }
    }

    pub fn as_bit_vector(&self) -> &ast::BV<'ctx> {
        match self {
            Self::BitVector(ast) => ast,
            _ => panic!("Expected the value to be a bit vector: {self}"),
        }
    }

    #[inline]
    pub fn is_bit_vector(&self) -> bool {
        matches!(self, Self::BitVector(..))
    }
}

impl<'ctx> AstNode<'ctx> {
    pub fn ast(&self) -> &dyn ast::Ast<'ctx> {
        match self {
            Self::Bool(ast) => ast,
            Self::BitVector(ast) => ast,
            Self::Float(ast) => ast,
            Self::Opaque(ast) => ast,
        }
    }

    pub fn z3_sort(&self) -> Sort<'ctx> {
        self.ast().get_sort()
    }
}
