use std::collections::HashMap;

use derive_more as dm;
use z3::{
    ast::{self, Ast},
    Context, FuncDecl, Sort,
};

use common::{
    log_debug,
    z3::{AstExt, DeclKind},
};

use crate::ast::TypeId;

const TAG: &str = "opaque";

/// Operations without a native model in the solver, encoded as applications of
/// uninterpreted functions named after the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, dm::Display, dm::FromStr)]
pub enum OpaqueOp {
    AddrOf,
    Deref,
    Paren,
    PtrDecay,
    PtrToInt,
    /// Arguments: the type witness of the destination, the integer.
    IntToPtr,
    /// Arguments: the base pointer, the index.
    ArraySub,
    /// Arguments: the base, the application of the field's symbol.
    Member,
}

impl OpaqueOp {
    pub const fn arity(&self) -> usize {
        match self {
            OpaqueOp::AddrOf
            | OpaqueOp::Deref
            | OpaqueOp::Paren
            | OpaqueOp::PtrDecay
            | OpaqueOp::PtrToInt => 1,
            OpaqueOp::IntToPtr | OpaqueOp::ArraySub | OpaqueOp::Member => 2,
        }
    }
}

/// Creates the applications of opaque operations and remembers their tags.
/// # Remarks
/// Function declarations are keyed by their numeric id in the solver, which
/// is unique among the declarations alive in the context. Declarations with
/// the same name and signature are shared by the solver, so the tags stay
/// valid for terms rebuilt by simplification.
pub struct OpaqueRegistry<'ctx> {
    context: &'ctx Context,
    ops: HashMap<u32, OpaqueOp>,
    witnesses: HashMap<u32, TypeId>,
    witness_by_type: HashMap<TypeId, ast::Dynamic<'ctx>>,
}

impl<'ctx> OpaqueRegistry<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        Self {
            context,
            ops: HashMap::new(),
            witnesses: HashMap::new(),
            witness_by_type: HashMap::new(),
        }
    }

    pub fn apply(
        &mut self,
        op: OpaqueOp,
        args: &[&ast::Dynamic<'ctx>],
        range: &Sort<'ctx>,
    ) -> ast::Dynamic<'ctx> {
        assert_eq!(
            args.len(),
            op.arity(),
            "Unexpected number of arguments for {op}"
        );
        let domain = args.iter().map(|arg| arg.get_sort()).collect::<Vec<_>>();
        let domain = domain.iter().collect::<Vec<_>>();
        let decl = FuncDecl::new(self.context, op.to_string(), &domain, range);
        let args = args
            .iter()
            .map(|arg| *arg as &dyn Ast<'ctx>)
            .collect::<Vec<_>>();
        let app = decl.apply(&args);
        self.ops.entry(app.app_decl_id()).or_insert(op);
        app
    }

    /// The opaque operation the term is an application of.
    pub fn resolve(&self, app: &ast::Dynamic<'ctx>) -> Option<OpaqueOp> {
        if app.app_decl_kind() != DeclKind::UNINTERPRETED {
            return None;
        }

        self.ops.get(&app.app_decl_id()).copied().or_else(|| {
            // Terms not created through this registry (e.g., parsed ones).
            let op = app.decl().name().parse::<OpaqueOp>().ok()?;
            (op.arity() == app.num_children()).then_some(op)
        })
    }

    /// A constant standing for the given type in places where the solver
    /// requires a term, as in the first argument of `IntToPtr`.
    pub fn type_witness(&mut self, ty: TypeId, width: u32) -> ast::Dynamic<'ctx> {
        if let Some(witness) = self.witness_by_type.get(&ty) {
            return witness.clone();
        }

        let decl = FuncDecl::new(
            self.context,
            format!("{}!{ty}", OpaqueOp::IntToPtr),
            &[],
            &Sort::bitvector(self.context, width),
        );
        let witness = decl.apply(&[]);
        log_debug!(target: TAG, "Type witness created: {} for {}", witness, ty);
        self.witnesses.insert(witness.app_decl_id(), ty);
        self.witness_by_type.insert(ty, witness.clone());
        witness
    }

    pub fn witnessed_type(&self, term: &ast::Dynamic<'ctx>) -> Option<TypeId> {
        if term.app_decl_kind() != DeclKind::UNINTERPRETED {
            return None;
        }
        self.witnesses.get(&term.app_decl_id()).copied()
    }
}
