//! Translation between C expressions and Z3 formulas.
//!
//! A [`Z3ConvSession`] owns the translation tables for one structuring
//! operation. Expressions are translated with [`Z3ConvSession::to_formula`],
//! and (possibly simplified) formulas are translated back with
//! [`Z3ConvSession::to_expr`]. Both directions are memoized.
//!
//! Operations that the solver has no model for (pointers, aggregates, and
//! reinterpretations) are encoded as uninterpreted functions. See [`OpaqueOp`].

mod forward;
mod opaque;
mod reverse;
mod sorts;
mod tables;

use z3::{
    ast::{self, Ast},
    Context,
};

use common::{
    log_fatal,
    z3::{float_is_zero, AstNode, AstNodeSort},
};

use crate::{
    ast::{AstContext, DeclId, TypeId},
    config::ReverseConfig,
};

pub use opaque::{OpaqueOp, OpaqueRegistry};
pub use sorts::{size_of_sort, SortMapping};
use tables::TranslationTables;

const TAG: &str = "conv";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// The number of expressions actually translated (not served from memo).
    pub forward_visits: usize,
    /// The number of formulas actually translated (not served from memo).
    pub reverse_visits: usize,
}

pub struct Z3ConvSession<'ctx, 'a> {
    context: &'ctx Context,
    ast: &'a mut AstContext,
    config: ReverseConfig,
    tables: TranslationTables<'ctx>,
    registry: OpaqueRegistry<'ctx>,
    stats: SessionStats,
}

impl<'ctx, 'a> Z3ConvSession<'ctx, 'a> {
    pub fn new(context: &'ctx Context, ast: &'a mut AstContext) -> Self {
        Self::with_config(context, ast, ReverseConfig::default())
    }

    pub fn with_config(
        context: &'ctx Context,
        ast: &'a mut AstContext,
        config: ReverseConfig,
    ) -> Self {
        Self {
            context,
            ast,
            config,
            tables: TranslationTables::default(),
            registry: OpaqueRegistry::new(context),
            stats: SessionStats::default(),
        }
    }

    #[inline]
    pub fn ast(&self) -> &AstContext {
        self.ast
    }

    #[inline]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn sort_of(&self, ty: TypeId) -> AstNodeSort {
        self.ast.types().sort_of(ty)
    }

    /// The symbol registered for the declaration so far, if any.
    pub fn symbol_of(&self, decl: DeclId) -> Option<ast::Dynamic<'ctx>> {
        self.tables.symbol_of(decl).cloned()
    }

    /// Converts the formula to a boolean by comparing it against zero.
    pub fn bool_cast(&self, formula: &ast::Dynamic<'ctx>) -> ast::Bool<'ctx> {
        match AstNode::from(formula.clone()) {
            AstNode::Bool(ast) => ast,
            AstNode::BitVector(ast) => {
                let zero = ast::BV::from_u64(self.context, 0, ast.get_size());
                ast._eq(&zero).not().simplify()
            }
            // Both zeros are false, NaN is true.
            AstNode::Float(ast) => float_is_zero(&ast).not().simplify(),
            AstNode::Opaque(ast) => {
                log_fatal!(target: TAG, "Cannot convert to boolean: {}", ast)
            }
        }
    }
}
