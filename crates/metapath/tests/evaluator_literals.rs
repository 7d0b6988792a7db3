use metapath::{AtomicValue, DynamicContext, Item, SimpleNode, compile};
use rstest::rstest;

fn eval(expr: &str) -> Vec<Item<SimpleNode>> {
    let ctx = DynamicContext::<SimpleNode>::default();
    compile(expr).unwrap().evaluate(&ctx, None).unwrap()
}

fn single_atomic(expr: &str) -> AtomicValue {
    let seq = eval(expr);
    assert_eq!(seq.len(), 1, "expected a singleton result for {expr}");
    match &seq[0] {
        Item::Atomic(a) => a.clone(),
        Item::Node(_) => panic!("expected an atomic result for {expr}"),
    }
}

#[test]
fn integer_literal() {
    assert_eq!(single_atomic("42"), AtomicValue::Integer(42));
}

#[test]
fn decimal_literal() {
    let value = single_atomic("3.5");
    assert_eq!(value.type_name(), "decimal");
    assert_eq!(value.string_value(), "3.5");
}

#[test]
fn leading_dot_decimal_literal() {
    let value = single_atomic(".5");
    assert_eq!(value.type_name(), "decimal");
    assert_eq!(value.string_value(), "0.5");
}

#[test]
fn scientific_literal_is_decimal() {
    let value = single_atomic("1.5e2");
    assert_eq!(value.type_name(), "decimal");
    assert_eq!(value.string_value(), "150");
}

#[rstest]
#[case("'a'", "a")]
#[case("\"a\"", "a")]
#[case("\"a\"\"b\"", "a\"b")]
#[case("'a''b'", "a'b")]
#[case("''", "")]
fn string_literals(#[case] expr: &str, #[case] expected: &str) {
    assert_eq!(
        single_atomic(expr),
        AtomicValue::String(expected.to_string())
    );
}

#[test]
fn empty_parentheses_yield_empty_sequence() {
    assert!(eval("()").is_empty());
}

#[test]
fn comma_concatenates_branch_results() {
    let seq = eval("1, 2, 'x'");
    assert_eq!(
        seq,
        vec![
            Item::Atomic(AtomicValue::Integer(1)),
            Item::Atomic(AtomicValue::Integer(2)),
            Item::Atomic(AtomicValue::String("x".to_string())),
        ]
    );
}

#[test]
fn parenthesized_expression_is_transparent() {
    assert_eq!(single_atomic("(42)"), AtomicValue::Integer(42));
}
