//! A minimal C expression tree, standing in for the front-end's AST.
//!
//! Nodes are stored in arenas owned by [`AstContext`] and referred to by ids.
//! Expressions are immutable once created; new nodes are only added through
//! [`NodeFactory`].

mod decl;
mod expr;
mod factory;
mod fmt;
mod types;

use delegate::delegate;

pub use decl::*;
pub use expr::*;
pub use factory::NodeFactory;
pub use fmt::{ExprDisplay, TypeDisplay};
pub use types::*;

#[derive(Debug, Clone)]
pub struct AstContext {
    types: TypeTable,
    decls: Vec<Decl>,
    exprs: Vec<Expr>,
}

impl AstContext {
    pub fn new(target: TargetInfo) -> Self {
        Self {
            types: TypeTable::new(target),
            decls: Vec::new(),
            exprs: Vec::new(),
        }
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeTable {
        &mut self.types
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        self.decls
            .get(id.0 as usize)
            .unwrap_or_else(|| panic!("Unknown declaration: {id}"))
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        self.exprs
            .get(id.0 as usize)
            .unwrap_or_else(|| panic!("Unknown expression: {id}"))
    }

    #[inline]
    pub fn type_of(&self, id: ExprId) -> TypeId {
        self.expr(id).ty
    }

    pub fn add_var(&mut self, name: &str, ty: TypeId, storage: StorageKind) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(Decl {
            name: name.to_owned(),
            ty,
            storage,
        });
        id
    }

    /// Declares a record type with the given fields, laid out without padding.
    pub fn add_record(&mut self, name: &str, fields: &[(&str, TypeId)]) -> (TypeId, Vec<DeclId>) {
        let bits = fields
            .iter()
            .map(|(_, ty)| self.types.bit_width(*ty))
            .sum();
        let record = self.types.record(name, bits);
        let fields = fields
            .iter()
            .map(|(field, ty)| self.add_var(field, *ty, StorageKind::Field { record }))
            .collect();
        (record, fields)
    }

    pub(crate) fn add_expr(&mut self, kind: ExprKind, ty: TypeId) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(Expr { kind, ty });
        id
    }

    pub fn display(&self, id: ExprId) -> ExprDisplay<'_> {
        ExprDisplay::new(self, id)
    }

    pub fn display_type(&self, ty: TypeId) -> TypeDisplay<'_> {
        TypeDisplay::new(&self.types, ty)
    }

    delegate! {
        to self.types {
            pub fn bit_width(&self, ty: TypeId) -> u64;
            pub fn is_integer(&self, ty: TypeId) -> bool;
            pub fn is_signed_integer(&self, ty: TypeId) -> bool;
            pub fn pointee(&self, ty: TypeId) -> Option<TypeId>;
        }
    }
}

impl Default for AstContext {
    fn default() -> Self {
        Self::new(TargetInfo::default())
    }
}
