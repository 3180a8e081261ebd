mod node;

pub use node::*;

use std::ffi::CStr;

use z3::{
    ast::{self, Ast},
    Context,
};
pub use z3_sys::{AstKind, DeclKind, SortKind};
use z3_sys::{
    Z3_fpa_get_ebits, Z3_fpa_get_sbits, Z3_get_app_decl, Z3_get_ast_kind, Z3_get_decl_int_parameter,
    Z3_get_decl_kind, Z3_get_func_decl_id, Z3_get_numeral_string, Z3_get_sort, Z3_is_numeral_ast,
    Z3_mk_fpa_is_zero, Z3_mk_fpa_sort, Z3_mk_fpa_to_fp_bv, Z3_mk_fpa_to_ieee_bv, Z3_simplify, Z3_to_app,
};

/// Queries on terms that the safe API does not offer.
pub trait AstExt<'ctx>: Ast<'ctx> {
    /// The unsigned value of a numeral term, if it is one and fits.
    fn as_u128(&self) -> Option<u128> {
        unsafe {
            let ctx = self.get_ctx().get_z3_context();
            if !Z3_is_numeral_ast(ctx, self.get_z3_ast()) {
                return None;
            }
            Some(Z3_get_numeral_string(ctx, self.get_z3_ast()))
                .filter(|x| !x.is_null())
                .map(|x| CStr::from_ptr(x))
                .and_then(|s| s.to_str().ok())
                .and_then(|s| s.parse::<u128>().ok())
        }
    }

    fn ast_kind(&self) -> AstKind {
        unsafe { Z3_get_ast_kind(self.get_ctx().get_z3_context(), self.get_z3_ast()) }
    }

    /// The kind of the function declaration this application is built with.
    /// # Remarks
    /// Numerals are applications too; only quantifiers and bound variables
    /// are not.
    fn app_decl_kind(&self) -> DeclKind {
        unsafe {
            let ctx = self.get_ctx().get_z3_context();
            let app = Z3_to_app(ctx, self.get_z3_ast());
            Z3_get_decl_kind(ctx, Z3_get_app_decl(ctx, app))
        }
    }

    /// A unique numeric identifier of the function declaration this application
    /// is built with. Stable as long as the declaration is alive in the context.
    fn app_decl_id(&self) -> u32 {
        unsafe {
            let ctx = self.get_ctx().get_z3_context();
            let app = Z3_to_app(ctx, self.get_z3_ast());
            Z3_get_func_decl_id(ctx, Z3_get_app_decl(ctx, app))
        }
    }

    /// The integer parameter at `index` of the declaration this application is
    /// built with, e.g., `[high, low]` for extractions.
    fn app_decl_int_param(&self, index: u32) -> i32 {
        unsafe {
            let ctx = self.get_ctx().get_z3_context();
            let app = Z3_to_app(ctx, self.get_z3_ast());
            Z3_get_decl_int_parameter(ctx, Z3_get_app_decl(ctx, app), index)
        }
    }

    /// Exponent and significand widths of a floating-point term.
    fn fpa_widths(&self) -> (u32, u32) {
        unsafe {
            let ctx = self.get_ctx().get_z3_context();
            let sort = Z3_get_sort(ctx, self.get_z3_ast());
            (Z3_fpa_get_ebits(ctx, sort), Z3_fpa_get_sbits(ctx, sort))
        }
    }

    /// The IEEE-754 bit pattern of a floating-point numeral.
    fn fpa_ieee_bits(&self) -> Option<u128> {
        let bits = unsafe {
            let ctx = self.get_ctx().get_z3_context();
            let bv = Z3_simplify(ctx, Z3_mk_fpa_to_ieee_bv(ctx, self.get_z3_ast()));
            ast::BV::wrap(self.get_ctx(), bv)
        };
        bits.as_u128()
    }
}

impl<'ctx, T: Ast<'ctx>> AstExt<'ctx> for T {}

/// Builds a floating-point numeral from its IEEE-754 bit pattern.
pub fn float_from_ieee_bits<'ctx>(
    context: &'ctx Context,
    bits: u128,
    ebits: u32,
    sbits: u32,
) -> ast::Float<'ctx> {
    let bv = ast::BV::from_str(context, ebits + sbits, &bits.to_string())
        .unwrap_or_else(|| panic!("Invalid bit pattern for a floating-point value: {bits:#x}"));
    unsafe {
        let ctx = context.get_z3_context();
        let sort = Z3_mk_fpa_sort(ctx, ebits, sbits);
        ast::Float::wrap(
            context,
            Z3_simplify(ctx, Z3_mk_fpa_to_fp_bv(ctx, bv.get_z3_ast(), sort)),
        )
    }
}

/// The IEEE-754 zero test, true for both signed zeros.
pub fn float_is_zero<'ctx>(value: &ast::Float<'ctx>) -> ast::Bool<'ctx> {
    unsafe {
        ast::Bool::wrap(
            value.get_ctx(),
            Z3_mk_fpa_is_zero(value.get_ctx().get_z3_context(), value.get_z3_ast()),
        )
    }
}
