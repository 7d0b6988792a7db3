use metapath::{AtomicValue, DynamicContext, Error, ErrorCode, Item, SimpleNode, compile};
use rstest::rstest;

fn eval(expr: &str) -> Result<Vec<Item<SimpleNode>>, Error> {
    let ctx = DynamicContext::<SimpleNode>::default();
    compile(expr).unwrap().evaluate(&ctx, None)
}

fn single_atomic(expr: &str) -> AtomicValue {
    let seq = eval(expr).unwrap();
    assert_eq!(seq.len(), 1, "expected a singleton result for {expr}");
    match &seq[0] {
        Item::Atomic(a) => a.clone(),
        Item::Node(_) => panic!("expected an atomic result for {expr}"),
    }
}

#[rstest]
#[case("1 + 2", AtomicValue::Integer(3))]
#[case("7 - 3", AtomicValue::Integer(4))]
#[case("2 * 3", AtomicValue::Integer(6))]
#[case("7 idiv 2", AtomicValue::Integer(3))]
#[case("-7 idiv 2", AtomicValue::Integer(-3))]
#[case("7 mod 2", AtomicValue::Integer(1))]
fn integer_arithmetic(#[case] expr: &str, #[case] expected: AtomicValue) {
    assert_eq!(single_atomic(expr), expected);
}

#[test]
fn integer_division_produces_a_decimal() {
    let value = single_atomic("1 div 2");
    assert_eq!(value.type_name(), "decimal");
    assert_eq!(value.string_value(), "0.5");
}

#[test]
fn mixed_numeric_operands_promote_to_decimal() {
    let value = single_atomic("1 + 2.5");
    assert_eq!(value.type_name(), "decimal");
    assert_eq!(value.string_value(), "3.5");
}

#[rstest]
#[case("1 div 0")]
#[case("1 idiv 0")]
#[case("1 mod 0")]
fn division_by_zero_errors(#[case] expr: &str) {
    let err = eval(expr).unwrap_err();
    assert_eq!(err.code, ErrorCode::FOAR0001);
}

#[rstest]
#[case("1 + ()")]
#[case("() + 1")]
#[case("() * 3")]
#[case("-()")]
fn absent_operand_yields_empty_sequence(#[case] expr: &str) {
    assert!(eval(expr).unwrap().is_empty());
}

#[rstest]
#[case("-3", -3)]
#[case("--3", 3)]
#[case("+-+3", -3)]
#[case("+3", 3)]
fn unary_sign_parity(#[case] expr: &str, #[case] expected: i64) {
    assert_eq!(single_atomic(expr), AtomicValue::Integer(expected));
}

#[test]
fn string_plus_integer_names_both_operand_types() {
    let err = eval("'abc' + 1").unwrap_err();
    assert_eq!(err.code, ErrorCode::MPTY0004);
    assert!(err.message.contains("string"), "message: {}", err.message);
    assert!(err.message.contains("integer"), "message: {}", err.message);
}

#[test]
fn negating_a_string_is_a_type_error() {
    let err = eval("-'abc'").unwrap_err();
    assert_eq!(err.code, ErrorCode::MPTY0004);
}

#[test]
fn integer_overflow_is_detected() {
    let err = eval("9223372036854775807 + 1").unwrap_err();
    assert_eq!(err.code, ErrorCode::FOAR0002);
}
