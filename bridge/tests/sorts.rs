mod utils;

use exprbridge::{
    ast::*,
    conv::{size_of_sort, Z3ConvSession},
    AstNodeSort,
};
use z3::ast::{self, Ast};

use utils::*;

#[test]
fn test_symbol_sorts_follow_declared_types() {
    let context = new_context();
    let mut ast = AstContext::default();
    let x_ty = int(&ast);
    let ptr_ty = ast.types_mut().pointer_to(x_ty);
    let double_ty = ast.types().float(FloatKind::Double);
    let bool_ty = ast.types().bool();
    let (record_ty, _) = ast.add_record("pair", &[("a", x_ty), ("b", x_ty)]);

    let (_, x) = var(&mut ast, "x", x_ty);
    let (_, p) = var(&mut ast, "p", ptr_ty);
    let (_, d) = var(&mut ast, "d", double_ty);
    let (_, b) = var(&mut ast, "b", bool_ty);
    let (_, r) = var(&mut ast, "r", record_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    for (expr, ty) in [
        (x, x_ty),
        (p, ptr_ty),
        (d, double_ty),
        (b, bool_ty),
        (r, record_ty),
    ] {
        let formula = session.to_formula(expr);
        let sort = AstNodeSort::of(&formula);
        assert_eq!(sort, session.sort_of(ty));
        assert_eq!(formula.get_sort(), sort.to_z3(&context));
    }

    assert_eq!(session.sort_of(bool_ty), AstNodeSort::Bool);
    assert_eq!(size_of_sort(&session.sort_of(ptr_ty)), 64);
    assert_eq!(session.sort_of(double_ty), AstNodeSort::Float {
        ebits: 11,
        sbits: 53,
    });
    assert_eq!(session.sort_of(record_ty), AstNodeSort::Uninterpreted {
        name: "pair".to_owned(),
    });
}

#[test]
fn test_sort_widths_match_target() {
    let mut ast = AstContext::new(TargetInfo {
        pointer_width: 32,
        ..Default::default()
    });
    let x_ty = int(&ast);
    let ptr_ty = ast.types_mut().pointer_to(x_ty);
    let array_ty = ast.types_mut().array_of(x_ty, 3);

    let context = new_context();
    let session = Z3ConvSession::new(&context, &mut ast);
    assert_eq!(size_of_sort(&session.sort_of(ptr_ty)), 32);
    assert_eq!(size_of_sort(&session.sort_of(array_ty)), 96);

    let bv = ast::Dynamic::from_ast(&ast::BV::from_u64(&context, 0, 24));
    assert_eq!(AstNodeSort::of(&bv), AstNodeSort::BitVector { size: 24 });
}
