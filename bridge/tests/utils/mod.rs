#![allow(dead_code)]

use exprbridge::ast::*;
use z3::{Config, Context};

pub fn new_context() -> Context {
    exprbridge::init_logging();
    Context::new(&Config::new())
}

pub fn int(ast: &AstContext) -> TypeId {
    ast.types().int(IntKind::Int, true)
}

pub fn uint(ast: &AstContext) -> TypeId {
    ast.types().int(IntKind::Int, false)
}

pub fn long(ast: &AstContext) -> TypeId {
    ast.types().int(IntKind::Long, true)
}

pub fn ulong(ast: &AstContext) -> TypeId {
    ast.types().int(IntKind::Long, false)
}

pub fn var(ast: &mut AstContext, name: &str, ty: TypeId) -> (DeclId, ExprId) {
    let decl = ast.add_var(name, ty, StorageKind::Local);
    (decl, ast.create_decl_ref(decl))
}

pub fn int_lit(ast: &mut AstContext, value: u128) -> ExprId {
    let ty = int(ast);
    ast.create_integer_literal(value, ty)
}

/// Asserts that two expressions have the same operators, types, literal
/// values and declarations at every level.
pub fn assert_same_shape(ast: &AstContext, expected: ExprId, actual: ExprId) {
    let (e, a) = (ast.expr(expected), ast.expr(actual));
    assert_eq!(
        e.ty,
        a.ty,
        "Type mismatch: `{}` vs `{}`",
        ast.display(expected),
        ast.display(actual)
    );

    use ExprKind::*;
    match (&e.kind, &a.kind) {
        (
            Unary {
                op: op1,
                operand: x1,
            },
            Unary {
                op: op2,
                operand: x2,
            },
        ) => {
            assert_eq!(op1, op2);
            assert_same_shape(ast, *x1, *x2);
        }
        (
            Binary {
                op: op1,
                lhs: l1,
                rhs: r1,
            },
            Binary {
                op: op2,
                lhs: l2,
                rhs: r2,
            },
        ) => {
            assert_eq!(op1, op2);
            assert_same_shape(ast, *l1, *l2);
            assert_same_shape(ast, *r1, *r2);
        }
        (
            Cast {
                kind: k1,
                is_explicit: x1,
                operand: o1,
            },
            Cast {
                kind: k2,
                is_explicit: x2,
                operand: o2,
            },
        ) => {
            assert_eq!((k1, x1), (k2, x2));
            assert_same_shape(ast, *o1, *o2);
        }
        (
            Member {
                base: b1,
                field: f1,
                is_arrow: a1,
            },
            Member {
                base: b2,
                field: f2,
                is_arrow: a2,
            },
        ) => {
            assert_eq!((f1, a1), (f2, a2));
            assert_same_shape(ast, *b1, *b2);
        }
        (
            ArraySubscript {
                base: b1,
                index: i1,
            },
            ArraySubscript {
                base: b2,
                index: i2,
            },
        ) => {
            assert_same_shape(ast, *b1, *b2);
            assert_same_shape(ast, *i1, *i2);
        }
        (Paren(x1), Paren(x2)) => assert_same_shape(ast, *x1, *x2),
        (k1, k2) => assert_eq!(
            k1,
            k2,
            "`{}` vs `{}`",
            ast.display(expected),
            ast.display(actual)
        ),
    }
}
