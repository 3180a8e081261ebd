use std::collections::{hash_map::Entry, HashMap};

use z3::ast;

use common::{log_fatal, z3::AstExt};

use crate::ast::{DeclId, ExprId, TypeId};

const TAG: &str = "tables";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FormulaId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SymbolId(u32);

/// The lookup tables shared by the translators within a session.
/// Entries are never removed or overwritten.
#[derive(Default)]
pub(crate) struct TranslationTables<'ctx> {
    formulas: Vec<ast::Dynamic<'ctx>>,
    expr_to_formula: HashMap<ExprId, FormulaId>,
    /// Keyed by the structural hash and equality of terms.
    formula_to_expr: HashMap<ast::Dynamic<'ctx>, ExprId>,
    symbols: Vec<ast::Dynamic<'ctx>>,
    decl_to_symbol: HashMap<DeclId, SymbolId>,
    /// Keyed by the id of the symbol's function declaration.
    symbol_to_decl: HashMap<u32, DeclId>,
    type_hints: HashMap<ast::Dynamic<'ctx>, TypeId>,
}

impl<'ctx> TranslationTables<'ctx> {
    pub fn formula_of(&self, expr: ExprId) -> Option<&ast::Dynamic<'ctx>> {
        self.expr_to_formula
            .get(&expr)
            .map(|id| &self.formulas[id.0 as usize])
    }

    pub fn insert_formula(&mut self, expr: ExprId, formula: ast::Dynamic<'ctx>) {
        match self.expr_to_formula.entry(expr) {
            Entry::Occupied(entry) => log_fatal!(
                target: TAG,
                "Expression {} is already mapped to a formula: {}",
                expr,
                self.formulas[entry.get().0 as usize],
            ),
            Entry::Vacant(entry) => {
                entry.insert(FormulaId(self.formulas.len() as u32));
                self.formulas.push(formula);
            }
        }
    }

    pub fn expr_of(&self, formula: &ast::Dynamic<'ctx>) -> Option<ExprId> {
        self.formula_to_expr.get(formula).copied()
    }

    pub fn insert_expr(&mut self, formula: ast::Dynamic<'ctx>, expr: ExprId) {
        match self.formula_to_expr.entry(formula) {
            Entry::Occupied(entry) => log_fatal!(
                target: TAG,
                "Formula {} is already mapped to an expression: {}",
                entry.key(),
                entry.get(),
            ),
            Entry::Vacant(entry) => {
                entry.insert(expr);
            }
        }
    }

    pub fn symbol_of(&self, decl: DeclId) -> Option<&ast::Dynamic<'ctx>> {
        self.decl_to_symbol
            .get(&decl)
            .map(|id| &self.symbols[id.0 as usize])
    }

    /// Registers the symbol for the declaration unless it already has one.
    /// Returns the symbol in effect.
    pub fn register_symbol(
        &mut self,
        decl: DeclId,
        make_symbol: impl FnOnce() -> ast::Dynamic<'ctx>,
    ) -> &ast::Dynamic<'ctx> {
        let id = match self.decl_to_symbol.entry(decl) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let symbol = make_symbol();
                let id = SymbolId(self.symbols.len() as u32);
                self.symbol_to_decl.insert(symbol.app_decl_id(), decl);
                self.symbols.push(symbol);
                *entry.insert(id)
            }
        };
        &self.symbols[id.0 as usize]
    }

    pub fn decl_of(&self, symbol: &ast::Dynamic<'ctx>) -> DeclId {
        self.symbol_to_decl
            .get(&symbol.app_decl_id())
            .copied()
            .unwrap_or_else(|| {
                log_fatal!(target: TAG, "No declaration is known for symbol: {}", symbol)
            })
    }

    pub fn hint_type(&mut self, formula: &ast::Dynamic<'ctx>, ty: TypeId) {
        self.type_hints.entry(formula.clone()).or_insert(ty);
    }

    pub fn hinted_type(&self, formula: &ast::Dynamic<'ctx>) -> Option<TypeId> {
        self.type_hints.get(formula).copied()
    }
}
