use metapath::xdm::{parse_date, parse_date_time, parse_duration};
use metapath::{
    AtomicValue, DynamicContextBuilder, Error, ErrorCode, ExpandedName, Item, SimpleNode, compile,
};
use rstest::rstest;

fn eval_with_vars(
    expr: &str,
    vars: &[(&str, AtomicValue)],
) -> Result<Vec<Item<SimpleNode>>, Error> {
    let mut builder = DynamicContextBuilder::<SimpleNode>::new();
    for (name, value) in vars {
        builder = builder.with_variable(
            ExpandedName::local(*name),
            vec![Item::Atomic(value.clone())],
        );
    }
    compile(expr).unwrap().evaluate(&builder.build(), None)
}

fn single(expr: &str, vars: &[(&str, AtomicValue)]) -> AtomicValue {
    let seq = eval_with_vars(expr, vars).unwrap();
    assert_eq!(seq.len(), 1, "expected a singleton result for {expr}");
    match &seq[0] {
        Item::Atomic(a) => a.clone(),
        Item::Node(_) => panic!("expected an atomic result for {expr}"),
    }
}

fn date(s: &str) -> AtomicValue {
    parse_date(s).unwrap()
}

fn date_time(s: &str) -> AtomicValue {
    parse_date_time(s).unwrap()
}

fn duration(s: &str) -> AtomicValue {
    parse_duration(s).unwrap()
}

#[test]
fn duration_lexical_forms() {
    assert_eq!(duration("P1Y1M"), AtomicValue::YearMonthDuration(13));
    assert_eq!(duration("-P2M"), AtomicValue::YearMonthDuration(-2));
    assert_eq!(duration("P1DT1H1M1S"), AtomicValue::DayTimeDuration(90_061));
    assert_eq!(duration("PT1M"), AtomicValue::DayTimeDuration(60));
    assert_eq!(duration("P0D"), AtomicValue::DayTimeDuration(0));
    assert!(parse_duration("P1Y1D").is_none());
}

#[test]
fn date_plus_year_month_duration() {
    let result = single(
        "$d + $dur",
        &[("d", date("2020-01-15")), ("dur", duration("P1Y1M"))],
    );
    assert_eq!(result.string_value(), "2021-02-15");
}

#[test]
fn year_month_duration_plus_date_commutes() {
    let result = single(
        "$dur + $d",
        &[("d", date("2020-01-15")), ("dur", duration("P2M"))],
    );
    assert_eq!(result.string_value(), "2020-03-15");
}

#[test]
fn date_plus_day_time_duration() {
    let result = single(
        "$d + $dur",
        &[("d", date("2020-01-01")), ("dur", duration("P1D"))],
    );
    assert_eq!(result.string_value(), "2020-01-02");
}

#[test]
fn date_minus_date_is_a_day_time_duration() {
    let result = single(
        "$a - $b",
        &[("a", date("2020-01-02")), ("b", date("2020-01-01"))],
    );
    assert_eq!(result, AtomicValue::DayTimeDuration(86_400));
}

#[test]
fn date_time_minus_date_time() {
    let result = single(
        "$a - $b",
        &[
            ("a", date_time("2020-01-01T12:00:00Z")),
            ("b", date_time("2020-01-01T10:30:00Z")),
        ],
    );
    assert_eq!(result, AtomicValue::DayTimeDuration(5_400));
}

#[test]
fn date_time_plus_day_time_duration() {
    let result = single(
        "$dt + $dur",
        &[
            ("dt", date_time("2020-01-01T10:00:00Z")),
            ("dur", duration("PT2H")),
        ],
    );
    assert_eq!(result, date_time("2020-01-01T12:00:00Z"));
}

#[rstest]
#[case("$dur * 2", "PT2H")]
#[case("2 * $dur", "PT2H")]
#[case("$dur div 2", "PT30M")]
fn day_time_duration_scaling(#[case] expr: &str, #[case] expected: &str) {
    let result = single(expr, &[("dur", duration("PT1H"))]);
    assert_eq!(result, duration(expected));
}

#[test]
fn year_month_duration_scaling() {
    assert_eq!(
        single("$dur * 3", &[("dur", duration("P2M"))]),
        AtomicValue::YearMonthDuration(6)
    );
    assert_eq!(
        single("$dur div 2", &[("dur", duration("P1Y2M"))]),
        AtomicValue::YearMonthDuration(7)
    );
}

#[test]
fn same_subtype_duration_division_yields_a_ratio() {
    let result = single(
        "$a div $b",
        &[("a", duration("PT2H")), ("b", duration("PT1H"))],
    );
    assert_eq!(result.type_name(), "decimal");
    assert_eq!(result.string_value(), "2");
}

#[test]
fn duration_addition_within_a_subtype() {
    assert_eq!(
        single(
            "$a + $b",
            &[("a", duration("P1M")), ("b", duration("P1Y"))]
        ),
        AtomicValue::YearMonthDuration(13)
    );
    assert_eq!(
        single(
            "$a - $b",
            &[("a", duration("PT2H")), ("b", duration("PT30M"))]
        ),
        AtomicValue::DayTimeDuration(5_400)
    );
}

#[test]
fn date_plus_integer_names_both_types() {
    let err = eval_with_vars("$d + 1", &[("d", date("2020-01-01"))]).unwrap_err();
    assert_eq!(err.code, ErrorCode::MPTY0004);
    assert!(err.message.contains("date"), "message: {}", err.message);
    assert!(err.message.contains("integer"), "message: {}", err.message);
}

#[test]
fn mixed_duration_subtype_addition_is_unsupported() {
    let err = eval_with_vars(
        "$a + $b",
        &[("a", duration("P1M")), ("b", duration("PT1H"))],
    )
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::MPTY0004);
}

#[test]
fn duration_division_by_zero_errors() {
    let err = eval_with_vars("$a div 0", &[("a", duration("PT1H"))]).unwrap_err();
    assert_eq!(err.code, ErrorCode::FOAR0001);
}
