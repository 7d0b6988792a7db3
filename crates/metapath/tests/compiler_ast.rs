use metapath::compile;
use metapath::parser::ast::{Axis, BinaryOp, Expr, Literal, NodeTest};

fn ast_of(expr: &str) -> Expr {
    compile(expr).unwrap().ast().clone()
}

#[test]
fn unary_sign_runs_fold_by_parity() {
    assert_eq!(ast_of("- - 3"), Expr::Literal(Literal::Integer(3)));
    match ast_of("-3") {
        Expr::Negate(inner) => assert_eq!(*inner, Expr::Literal(Literal::Integer(3))),
        other => panic!("expected a negation, got {other:?}"),
    }
}

#[test]
fn arrow_desugars_into_a_function_call_with_prepended_operand() {
    match ast_of("'a' => concat('b')") {
        Expr::FunctionCall { name, args } => {
            assert_eq!(name.local, "concat");
            assert_eq!(args.len(), 2);
            assert_eq!(args[0], Expr::Literal(Literal::String("a".to_string())));
        }
        other => panic!("expected a function call, got {other:?}"),
    }
}

#[test]
fn additive_chains_fold_left_deep() {
    match ast_of("1 - 2 + 3") {
        Expr::Binary { left, op, .. } => {
            assert_eq!(op, BinaryOp::Add);
            match *left {
                Expr::Binary { op, .. } => assert_eq!(op, BinaryOp::Sub),
                other => panic!("expected a nested subtraction, got {other:?}"),
            }
        }
        other => panic!("expected a binary chain, got {other:?}"),
    }
}

#[test]
fn logic_chains_are_nary() {
    match ast_of("1 or 2 or 3") {
        Expr::Or(operands) => assert_eq!(operands.len(), 3),
        other => panic!("expected an n-ary or, got {other:?}"),
    }
}

#[test]
fn single_operand_chains_are_transparent() {
    assert_eq!(ast_of("42"), Expr::Literal(Literal::Integer(42)));
}

#[test]
fn multiple_let_bindings_nest_right_associatively() {
    match ast_of("let $a := 1, $b := 2 return 3") {
        Expr::Let { var, body, .. } => {
            assert_eq!(var.local, "a");
            match *body {
                Expr::Let { var, .. } => assert_eq!(var.local, "b"),
                other => panic!("expected a nested let, got {other:?}"),
            }
        }
        other => panic!("expected a let, got {other:?}"),
    }
}

#[test]
fn abbreviated_parent_step_is_a_wildcard_parent() {
    assert_eq!(
        ast_of(".."),
        Expr::Step {
            axis: Axis::Parent,
            test: NodeTest::Wildcard
        }
    );
}

#[test]
fn abbreviated_steps_build_flag_and_model_instance_nodes() {
    match ast_of("@id") {
        Expr::Flag(NodeTest::Name(name)) => assert_eq!(name.local, "id"),
        other => panic!("expected a flag step, got {other:?}"),
    }
    match ast_of("item") {
        Expr::ModelInstance(NodeTest::Name(name)) => assert_eq!(name.local, "item"),
        other => panic!("expected a model-instance step, got {other:?}"),
    }
}

#[test]
fn predicates_wrap_their_base_expression() {
    match ast_of("item[1][@id]") {
        Expr::Predicate { base, predicates } => {
            assert_eq!(predicates.len(), 2);
            assert!(matches!(*base, Expr::ModelInstance(_)));
        }
        other => panic!("expected a predicate node, got {other:?}"),
    }
}

#[test]
fn paths_preserve_slash_shapes() {
    assert!(matches!(ast_of("/"), Expr::RootSlashOnlyPath));
    assert!(matches!(ast_of("/a"), Expr::RootSlashPath(_)));
    assert!(matches!(ast_of("//a"), Expr::RootDoubleSlashPath(_)));
    assert!(matches!(
        ast_of("a/b"),
        Expr::RelativeSlashPath { .. }
    ));
    assert!(matches!(
        ast_of("a//b"),
        Expr::RelativeDoubleSlashPath { .. }
    ));
}
