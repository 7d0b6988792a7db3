use metapath::xdm::{parse_date, parse_duration};
use metapath::{
    AtomicValue, DynamicContext, DynamicContextBuilder, Error, ErrorCode, ExpandedName, Item,
    MetapathNode, SimpleNode, compile,
};
use metapath::{assembly, doc, flag};
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
#[case("'a' = 'a'", true)]
#[case("'a' = 'b'", false)]
#[case("'a' != 'b'", true)]
#[case("1 < 2", true)]
#[case("2 <= 2", true)]
#[case("3 > 2.5", true)]
#[case("2 >= 3", false)]
#[case("1 = 1.0", true)]
fn general_comparisons(#[case] expr: &str, #[case] expected: bool) {
    assert_eq!(eval_bool(expr), expected);
}

#[rstest]
#[case("'a' eq 'a'", true)]
#[case("'a' eq 'b'", false)]
#[case("'b' gt 'a'", true)]
#[case("1 lt 2", true)]
#[case("2 le 2", true)]
#[case("2 ne 3", true)]
#[case("2.5 ge 2", true)]
fn value_comparisons(#[case] expr: &str, #[case] expected: bool) {
    assert_eq!(eval_bool(expr), expected);
}

#[test]
fn general_comparison_is_existential_over_the_cross_product() {
    assert!(eval_bool("(1, 2) = (2, 3)"));
    assert!(!eval_bool("(1, 2) = (3, 4)"));
}

#[rstest]
#[case("(1, 2) eq (2, 3)")]
#[case("() eq 1")]
#[case("1 eq ()")]
fn value_comparison_on_non_singletons_is_empty(#[case] expr: &str) {
    assert!(eval(expr).unwrap().is_empty());
}

#[rstest]
#[case("1 = 'x'")]
#[case("1 eq '1'")]
#[case("true() lt 1")]
fn cross_family_comparison_errors(#[case] expr: &str) {
    let err = eval(expr).unwrap_err();
    assert_eq!(err.code, ErrorCode::MPTY0004);
    assert_eq!(err.kind, metapath::ErrorKind::Dynamic);
}

#[test]
fn boolean_ordering() {
    assert!(eval_bool("false() lt true()"));
    assert!(!eval_bool("true() lt false()"));
    assert!(eval_bool("true() = true()"));
}

fn single_flagged_node() -> SimpleNode {
    let document = doc()
        .child(assembly("item").flag(flag("id", "a1")).flag(flag("count", "42")))
        .build();
    document.model_items()[0].clone()
}

#[test]
fn untyped_flag_value_casts_to_the_typed_side() {
    let node = single_flagged_node();
    let ctx = DynamicContext::<SimpleNode>::default();
    let truthy = |expr: &str| {
        let seq = compile(expr)
            .unwrap()
            .evaluate(&ctx, node.clone())
            .unwrap();
        matches!(seq.as_slice(), [Item::Atomic(AtomicValue::Boolean(true))])
    };
    // untyped vs string casts to string; untyped vs numeric casts to numeric
    assert!(truthy("@id = 'a1'"));
    assert!(truthy("@count = 42"));
    assert!(truthy("@count < 43"));
    assert!(!truthy("@id = 'zz'"));
}

#[test]
fn untyped_both_sides_compare_as_strings() {
    let node = single_flagged_node();
    let ctx = DynamicContext::<SimpleNode>::default();
    let seq = compile("@id = @id")
        .unwrap()
        .evaluate(&ctx, node)
        .unwrap();
    assert_eq!(seq, vec![Item::Atomic(AtomicValue::Boolean(true))]);
}

fn eval_with_vars(expr: &str, vars: &[(&str, AtomicValue)]) -> Result<Vec<Item<SimpleNode>>, Error> {
    let mut builder = DynamicContextBuilder::<SimpleNode>::new();
    for (name, value) in vars {
        builder = builder.with_variable(
            ExpandedName::local(*name),
            vec![Item::Atomic(value.clone())],
        );
    }
    compile(expr).unwrap().evaluate(&builder.build(), None)
}

#[test]
fn dates_and_durations_compare_within_their_family() {
    let early = parse_date("2020-01-01").unwrap();
    let late = parse_date("2021-06-30").unwrap();
    let seq = eval_with_vars("$a lt $b", &[("a", early), ("b", late)]).unwrap();
    assert_eq!(seq, vec![Item::Atomic(AtomicValue::Boolean(true))]);

    let short = parse_duration("PT1H").unwrap();
    let long = parse_duration("PT90M").unwrap();
    let seq = eval_with_vars("$a le $b", &[("a", short), ("b", long)]).unwrap();
    assert_eq!(seq, vec![Item::Atomic(AtomicValue::Boolean(true))]);
}

#[test]
fn mixed_duration_subtypes_do_not_compare() {
    let ym = parse_duration("P1M").unwrap();
    let dt = parse_duration("PT1H").unwrap();
    let err = eval_with_vars("$a lt $b", &[("a", ym), ("b", dt)]).unwrap_err();
    assert_eq!(err.code, ErrorCode::MPTY0004);
}

#[test]
fn base64_values_are_outside_the_comparison_families() {
    let b = AtomicValue::Base64Binary("AQID".to_string());
    let err = eval_with_vars("$a eq $b", &[("a", b.clone()), ("b", b)]).unwrap_err();
    assert_eq!(err.code, ErrorCode::MPTY0004);
}
