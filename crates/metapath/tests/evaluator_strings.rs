use metapath::{AtomicValue, DynamicContext, Error, Item, SimpleNode, compile};
use rstest::rstest;

fn eval(expr: &str) -> Result<Vec<Item<SimpleNode>>, Error> {
    let ctx = DynamicContext::<SimpleNode>::default();
    compile(expr).unwrap().evaluate(&ctx, None)
}

fn single_string(expr: &str) -> String {
    match eval(expr).unwrap().as_slice() {
        [Item::Atomic(AtomicValue::String(s))] => s.clone(),
        other => panic!("expected a string singleton for {expr}, got {other:?}"),
    }
}

#[rstest]
#[case("'a' || 'b'", "ab")]
#[case("1 || 2", "12")]
#[case("() || 'x'", "x")]
#[case("'a' || 'b' || 'c'", "abc")]
fn string_concat_operator(#[case] expr: &str, #[case] expected: &str) {
    assert_eq!(single_string(expr), expected);
}

#[test]
fn string_concat_feeds_every_item_of_a_sequence() {
    assert_eq!(single_string("('a', 'b') || 'c'"), "abc");
}

#[test]
fn concat_function_joins_arguments() {
    assert_eq!(single_string("concat('a', 'b', 'c')"), "abc");
    assert_eq!(single_string("concat('a', ())"), "a");
}

#[test]
fn arrow_operator_prepends_the_left_operand() {
    assert_eq!(single_string("'a' => concat('b')"), "ab");
    assert_eq!(single_string("'a' => concat('b') => concat('c')"), "abc");
}

#[rstest]
#[case("string(42)", "42")]
#[case("string(())", "")]
#[case("string('x')", "x")]
#[case("string(3.50)", "3.5")]
fn string_function(#[case] expr: &str, #[case] expected: &str) {
    assert_eq!(single_string(expr), expected);
}

#[test]
fn string_length_counts_characters() {
    match eval("string-length('héllo')").unwrap().as_slice() {
        [Item::Atomic(AtomicValue::Integer(n))] => assert_eq!(*n, 5),
        other => panic!("unexpected result {other:?}"),
    }
}

#[rstest]
#[case("contains('abc', 'b')", true)]
#[case("contains('abc', 'z')", false)]
#[case("starts-with('abc', 'ab')", true)]
#[case("starts-with('abc', 'bc')", false)]
#[case("ends-with('abc', 'bc')", true)]
#[case("ends-with('abc', 'ab')", false)]
fn substring_predicates(#[case] expr: &str, #[case] expected: bool) {
    match eval(expr).unwrap().as_slice() {
        [Item::Atomic(AtomicValue::Boolean(b))] => assert_eq!(*b, expected),
        other => panic!("unexpected result {other:?}"),
    }
}
