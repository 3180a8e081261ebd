mod utils;

use exprbridge::{
    ast::*,
    config::{ReverseConfig, Signedness},
    conv::Z3ConvSession,
};
use z3::{
    ast::{self, Ast},
    FuncDecl, Sort,
};

use utils::*;

#[test]
fn test_numeral_without_hint_uses_best_fit_type() {
    let context = new_context();
    let mut ast = AstContext::default();
    let mut session = Z3ConvSession::new(&context, &mut ast);

    let formula = ast::Dynamic::from_ast(&ast::BV::from_u64(&context, 7, 16));
    let expr = session.to_expr(&formula);

    let ast = session.ast();
    assert_eq!(ast.expr(expr).kind, ExprKind::IntegerLiteral(7));
    assert_eq!(ast.type_of(expr), ast.types().int(IntKind::Short, true));
}

#[test]
fn test_literal_signedness_is_configurable() {
    let context = new_context();
    let mut ast = AstContext::default();
    let config = ReverseConfig {
        literal_signedness: Signedness::Unsigned,
        ..Default::default()
    };
    let mut session = Z3ConvSession::with_config(&context, &mut ast, config);

    let formula = ast::Dynamic::from_ast(&ast::BV::from_u64(&context, 7, 64));
    let expr = session.to_expr(&formula);

    let ast = session.ast();
    assert_eq!(ast.type_of(expr), ast.types().int(IntKind::Long, false));
}

#[test]
fn test_byte_numeral_becomes_character_literal() {
    let context = new_context();
    let mut ast = AstContext::default();
    let mut session = Z3ConvSession::new(&context, &mut ast);

    let formula = ast::Dynamic::from_ast(&ast::BV::from_u64(&context, 'A' as u64, 8));
    let expr = session.to_expr(&formula);

    let ast = session.ast();
    assert_eq!(ast.expr(expr).kind, ExprKind::CharacterLiteral('A' as u32));
    assert!(ast.types().is_char(ast.type_of(expr)));
}

#[test]
fn test_truth_values_become_unsigned_literals() {
    let context = new_context();
    let mut ast = AstContext::default();
    let mut session = Z3ConvSession::new(&context, &mut ast);

    let t = session.to_expr(&ast::Dynamic::from_ast(&ast::Bool::from_bool(&context, true)));
    let f = session.to_expr(&ast::Dynamic::from_ast(&ast::Bool::from_bool(&context, false)));

    let ast = session.ast();
    assert_eq!(ast.expr(t).kind, ExprKind::IntegerLiteral(1));
    assert_eq!(ast.expr(f).kind, ExprKind::IntegerLiteral(0));
    assert_eq!(ast.type_of(t), ast.types().unsigned_int());
}

#[test]
fn test_floating_numerals() {
    let context = new_context();
    let mut ast = AstContext::default();
    let mut session = Z3ConvSession::new(&context, &mut ast);

    let value = common::z3::float_from_ieee_bits(&context, 2.5f32.to_bits() as u128, 8, 24);
    let expr = session.to_expr(&ast::Dynamic::from_ast(&value));
    let nan = common::z3::float_from_ieee_bits(&context, f64::NAN.to_bits() as u128, 11, 53);
    let nan = session.to_expr(&ast::Dynamic::from_ast(&nan));

    let ast = session.ast();
    assert_eq!(
        ast.expr(expr).kind,
        ExprKind::FloatingLiteral(2.5f32.to_bits() as u128)
    );
    assert_eq!(ast.type_of(expr), ast.types().float(FloatKind::Float));
    let ExprKind::FloatingLiteral(bits) = ast.expr(nan).kind else {
        panic!("Expected a floating literal");
    };
    assert!(f64::from_bits(bits as u64).is_nan());
}

#[test]
fn test_symbol_becomes_reference() {
    let context = new_context();
    let mut ast = AstContext::default();
    let x_ty = int(&ast);
    let (x_decl, x) = var(&mut ast, "x", x_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    let formula = session.to_formula(x);
    let expr = session.to_expr(&formula);

    assert_eq!(session.ast().expr(expr).kind, ExprKind::DeclRef(x_decl));
}

#[test]
fn test_reverse_memoization() {
    let context = new_context();
    let mut ast = AstContext::default();
    let mut session = Z3ConvSession::new(&context, &mut ast);

    let sum = ast::Dynamic::from_ast(&ast::BV::from_u64(&context, 3, 32).bvadd(
        &ast::BV::from_u64(&context, 4, 32),
    ));
    let first = session.to_expr(&sum);
    let visits = session.stats().reverse_visits;
    assert_eq!(visits, 3);

    let second = session.to_expr(&sum);
    assert_eq!(first, second);
    assert_eq!(session.stats().reverse_visits, visits);
}

#[test]
fn test_nary_conjunction_folds_left() {
    let context = new_context();
    let mut ast = AstContext::default();
    let bool_ty = ast.types().bool();
    let (p_decl, p) = var(&mut ast, "p", bool_ty);
    let (q_decl, q) = var(&mut ast, "q", bool_ty);
    let (r_decl, r) = var(&mut ast, "r", bool_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    let [p, q, r] = [p, q, r].map(|e| session.to_formula(e).as_bool().unwrap());
    let formula = ast::Dynamic::from_ast(&ast::Bool::and(&context, &[&p, &q, &r]));
    let expr = session.to_expr(&formula);

    let ast = session.ast();
    assert_eq!(ast.type_of(expr), bool_ty);
    let ExprKind::Binary {
        op: BinaryOp::LAnd,
        lhs,
        rhs,
    } = ast.expr(expr).kind
    else {
        panic!("Expected a conjunction: {}", ast.display(expr));
    };
    assert_eq!(ast.expr(rhs).kind, ExprKind::DeclRef(r_decl));
    let ExprKind::Binary {
        op: BinaryOp::LAnd,
        lhs: inner_lhs,
        rhs: inner_rhs,
    } = ast.expr(lhs).kind
    else {
        panic!("Expected a nested conjunction: {}", ast.display(lhs));
    };
    assert_eq!(ast.expr(inner_lhs).kind, ExprKind::DeclRef(p_decl));
    assert_eq!(ast.expr(inner_rhs).kind, ExprKind::DeclRef(q_decl));
    assert_eq!(ast.display(expr).to_string(), "p && q && r");
}

#[test]
fn test_addition_takes_higher_ranked_type() {
    let context = new_context();
    let mut ast = AstContext::default();
    let x_ty = int(&ast);
    let (_, x) = var(&mut ast, "x", x_ty);
    let y_ty = uint(&ast);
    let (_, y) = var(&mut ast, "y", y_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    let x = session.to_formula(x);
    let y = session.to_formula(y);
    let xy = ast::Dynamic::from_ast(&x.as_bv().unwrap().bvadd(&y.as_bv().unwrap()));
    let yx = ast::Dynamic::from_ast(&y.as_bv().unwrap().bvadd(&x.as_bv().unwrap()));
    let xx = ast::Dynamic::from_ast(&x.as_bv().unwrap().bvsrem(&x.as_bv().unwrap()));

    let xy = session.to_expr(&xy);
    let yx = session.to_expr(&yx);
    let xx = session.to_expr(&xx);
    let ast = session.ast();
    assert_eq!(ast.type_of(xy), y_ty);
    assert_eq!(ast.type_of(yx), y_ty);
    assert_eq!(ast.type_of(xx), x_ty);
    assert!(matches!(ast.expr(xx).kind, ExprKind::Binary {
        op: BinaryOp::Rem,
        ..
    }));
}

#[test]
fn test_extraction_becomes_integral_cast() {
    let context = new_context();
    let mut ast = AstContext::default();
    let x_ty = long(&ast);
    let (_, x) = var(&mut ast, "x", x_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    let x_formula = session.to_formula(x);
    let low = ast::Dynamic::from_ast(&x_formula.as_bv().unwrap().extract(31, 0));
    let expr = session.to_expr(&low);

    let ast = session.ast();
    assert_eq!(ast.type_of(expr), int(ast));
    assert!(matches!(ast.expr(expr).kind, ExprKind::Cast {
        kind: CastKind::IntegralCast,
        is_explicit: true,
        ..
    }));
    assert_eq!(ast.display(expr).to_string(), "(int)x");
}

#[test]
#[should_panic(expected = "Extraction not starting at the lowest bit")]
fn test_extraction_of_high_bits_is_unsupported() {
    let context = new_context();
    let mut ast = AstContext::default();
    let x_ty = long(&ast);
    let (_, x) = var(&mut ast, "x", x_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    let x_formula = session.to_formula(x);
    let byte = ast::Dynamic::from_ast(&x_formula.as_bv().unwrap().extract(15, 8));
    session.to_expr(&byte);
}

#[test]
fn test_negation_is_typed_int() {
    let context = new_context();
    let mut ast = AstContext::default();
    let bool_ty = ast.types().bool();
    let (_, p) = var(&mut ast, "p", bool_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    let p = session.to_formula(p).as_bool().unwrap();
    let expr = session.to_expr(&ast::Dynamic::from_ast(&p.not()));

    let ast = session.ast();
    assert_eq!(ast.type_of(expr), int(ast));
    assert_eq!(ast.display(expr).to_string(), "!p");
}

#[test]
fn test_negation_of_integer_is_folded() {
    let context = new_context();
    let mut ast = AstContext::default();
    let x_ty = int(&ast);
    let (x_decl, x) = var(&mut ast, "x", x_ty);
    let not = ast.create_unary(UnaryOp::LNot, x, x_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    let formula = session.to_formula(not);
    let expr = session.to_expr(&formula);

    let ast = session.ast();
    assert_eq!(ast.type_of(expr), ast.types().bool());
    let ExprKind::Binary {
        op: BinaryOp::Eq,
        lhs,
        rhs,
    } = ast.expr(expr).kind
    else {
        panic!("Expected a comparison with zero: {}", ast.display(expr));
    };
    assert!(
        [lhs, rhs]
            .iter()
            .any(|e| ast.expr(*e).kind == ExprKind::DeclRef(x_decl))
    );
}

#[test]
fn test_negated_condition_becomes_integral_cast() {
    let context = new_context();
    let mut ast = AstContext::default();
    let bool_ty = ast.types().bool();
    let (_, p) = var(&mut ast, "p", bool_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    let p = session.to_formula(p).as_bool().unwrap();
    let zero = ast::BV::from_u64(&context, 0, 32);
    let one = ast::BV::from_u64(&context, 1, 32);
    let expr = session.to_expr(&ast::Dynamic::from_ast(&p.ite(&zero, &one)));

    let ast = session.ast();
    assert_eq!(ast.type_of(expr), int(ast));
    let ExprKind::Cast {
        kind: CastKind::IntegralCast,
        operand,
        ..
    } = ast.expr(expr).kind
    else {
        panic!("Expected an integral cast: {}", ast.display(expr));
    };
    assert!(matches!(ast.expr(operand).kind, ExprKind::Unary {
        op: UnaryOp::LNot,
        ..
    }));
    assert_eq!(ast.display(operand).to_string(), "!p");
}

#[test]
#[should_panic(expected = "Unsupported conditional formula")]
fn test_general_conditional_is_unsupported() {
    let context = new_context();
    let mut ast = AstContext::default();
    let bool_ty = ast.types().bool();
    let (_, p) = var(&mut ast, "p", bool_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    let p = session.to_formula(p).as_bool().unwrap();
    let two = ast::BV::from_u64(&context, 2, 32);
    let zero = ast::BV::from_u64(&context, 0, 32);
    session.to_expr(&ast::Dynamic::from_ast(&p.ite(&two, &zero)));
}

#[test]
fn test_logical_shift_of_signed_operand_is_made_unsigned() {
    let context = new_context();
    let mut ast = AstContext::default();
    let x_ty = int(&ast);
    let (_, x) = var(&mut ast, "x", x_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    let x = session.to_formula(x);
    let shift = ast::Dynamic::from_ast(
        &x.as_bv()
            .unwrap()
            .bvlshr(&ast::BV::from_u64(&context, 3, 32)),
    );
    let expr = session.to_expr(&shift);

    let ast = session.ast();
    assert_eq!(ast.type_of(expr), uint(ast));
    assert_eq!(ast.display(expr).to_string(), "(unsigned int)x >> 3");
}

#[test]
fn test_simplified_conjunction() {
    let context = new_context();
    let mut ast = AstContext::default();
    let bool_ty = ast.types().bool();
    let (p_decl, p) = var(&mut ast, "p", bool_ty);
    let (_, q) = var(&mut ast, "q", bool_ty);
    let and = ast.create_binary(BinaryOp::LAnd, p, q, bool_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    let q_formula = session.to_formula(q);
    let formula = session.to_formula(and);
    let truth = ast::Dynamic::from_ast(&ast::Bool::from_bool(&context, true));
    let simplified = formula.substitute(&[(&q_formula, &truth)]).simplify();
    let expr = session.to_expr(&simplified);

    assert_eq!(session.ast().expr(expr).kind, ExprKind::DeclRef(p_decl));
}

#[test]
#[should_panic(expected = "Unsupported quantified formula")]
fn test_quantifier_is_unsupported() {
    let context = new_context();
    let mut ast = AstContext::default();
    let mut session = Z3ConvSession::new(&context, &mut ast);

    let x = ast::BV::new_const(&context, "x", 32);
    let body = x._eq(&x);
    let formula = ast::forall_const(&context, &[&x as &dyn Ast], &[], &body);
    session.to_expr(&ast::Dynamic::from_ast(&formula));
}

#[test]
#[should_panic(expected = "Unknown uninterpreted function")]
fn test_unknown_function_is_unsupported() {
    let context = new_context();
    let mut ast = AstContext::default();
    let mut session = Z3ConvSession::new(&context, &mut ast);

    let sort = Sort::bitvector(&context, 32);
    let f = FuncDecl::new(&context, "Negate", &[&sort], &sort);
    let one = ast::BV::from_u64(&context, 1, 32);
    let formula = f.apply(&[&one as &dyn Ast]);
    session.to_expr(&formula);
}

#[test]
#[should_panic(expected = "Operand of dereference is expected to be a pointer")]
fn test_dereference_of_non_pointer() {
    let context = new_context();
    let mut ast = AstContext::default();
    let x_ty = int(&ast);
    let (_, x) = var(&mut ast, "x", x_ty);

    let mut session = Z3ConvSession::new(&context, &mut ast);
    let x = session.to_formula(x);
    let sort = Sort::bitvector(&context, 32);
    let deref = FuncDecl::new(&context, "Deref", &[&sort], &sort);
    session.to_expr(&deref.apply(&[&x as &dyn Ast]));
}

#[test]
#[should_panic(expected = "No declaration is known for symbol")]
fn test_unknown_symbol() {
    let context = new_context();
    let mut ast = AstContext::default();
    let mut session = Z3ConvSession::new(&context, &mut ast);

    let y = ast::BV::new_const(&context, "y", 32);
    session.to_expr(&ast::Dynamic::from_ast(&y));
}
