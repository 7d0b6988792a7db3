use metapath::{
    AtomicValue, DynamicContext, Error, ErrorCode, Item, MetapathNode, SimpleNode, compile,
};
use metapath::{assembly, doc, field};
use rstest::rstest;

fn eval(expr: &str) -> Result<Vec<Item<SimpleNode>>, Error> {
    let ctx = DynamicContext::<SimpleNode>::default();
    compile(expr).unwrap().evaluate(&ctx, None)
}

fn eval_bool(expr: &str) -> bool {
    match eval(expr).unwrap().as_slice() {
        [Item::Atomic(AtomicValue::Boolean(b))] => *b,
        other => panic!("expected a boolean singleton for {expr}, got {other:?}"),
    }
}

#[rstest]
#[case("1 = 1 and 2 = 2", true)]
#[case("1 = 1 and 2 = 3", false)]
#[case("1 = 2 or 2 = 2", true)]
#[case("1 = 2 or 2 = 3", false)]
#[case("1 = 1 or 1 = 2 or 1 = 3", true)]
fn and_or_basics(#[case] expr: &str, #[case] expected: bool) {
    assert_eq!(eval_bool(expr), expected);
}

#[test]
fn or_short_circuits_before_the_failing_operand() {
    // The division by zero on the right is never evaluated.
    assert!(eval_bool("1 = 1 or 1 div 0 = 1"));
}

#[test]
fn and_short_circuits_before_the_failing_operand() {
    assert!(!eval_bool("1 = 2 and 1 div 0 = 1"));
}

#[rstest]
#[case("boolean(())", false)]
#[case("boolean('')", false)]
#[case("boolean('a')", true)]
#[case("boolean(0)", false)]
#[case("boolean(7)", true)]
#[case("boolean(0.0)", false)]
#[case("boolean(true())", true)]
#[case("boolean(false())", false)]
fn effective_boolean_values(#[case] expr: &str, #[case] expected: bool) {
    assert_eq!(eval_bool(expr), expected);
}

#[test]
fn effective_boolean_value_of_multiple_atomics_errors() {
    let err = eval("boolean((1, 2))").unwrap_err();
    assert_eq!(err.code, ErrorCode::FORG0006);
}

#[test]
fn node_sequences_are_truthy() {
    let document = doc()
        .child(assembly("root").child(field("a").value("x")).child(field("a").value("y")))
        .build();
    let root = document.model_items()[0].clone();
    let ctx = DynamicContext::<SimpleNode>::default();
    let seq = compile("boolean(a)").unwrap().evaluate(&ctx, root.clone()).unwrap();
    assert_eq!(seq, vec![Item::Atomic(AtomicValue::Boolean(true))]);
    let seq = compile("boolean(missing)").unwrap().evaluate(&ctx, root).unwrap();
    assert_eq!(seq, vec![Item::Atomic(AtomicValue::Boolean(false))]);
}

#[test]
fn empty_sequence_is_false_in_logic_operands() {
    assert!(!eval_bool("() or ()"));
    assert!(!eval_bool("() and 1 = 1"));
}
