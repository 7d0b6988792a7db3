use metapath::{AtomicValue, DynamicContext, Error, ErrorCode, Item, SimpleNode, compile};

fn eval(expr: &str) -> Result<Vec<Item<SimpleNode>>, Error> {
    let ctx = DynamicContext::<SimpleNode>::default();
    compile(expr).unwrap().evaluate(&ctx, None)
}

fn integers(seq: &[Item<SimpleNode>]) -> Vec<i64> {
    seq.iter()
        .map(|item| match item {
            Item::Atomic(AtomicValue::Integer(i)) => *i,
            other => panic!("expected integers, got {other:?}"),
        })
        .collect()
}

#[test]
fn ascending_range_enumerates_inclusive_endpoints() {
    assert_eq!(integers(&eval("1 to 3").unwrap()), vec![1, 2, 3]);
}

#[test]
fn singleton_range() {
    assert_eq!(integers(&eval("2 to 2").unwrap()), vec![2]);
}

#[test]
fn descending_range_is_empty() {
    assert!(eval("3 to 1").unwrap().is_empty());
}

#[test]
fn absent_endpoint_yields_empty() {
    assert!(eval("() to 2").unwrap().is_empty());
    assert!(eval("1 to ()").unwrap().is_empty());
}

#[test]
fn non_integer_endpoint_is_a_type_error() {
    let err = eval("'a' to 2").unwrap_err();
    assert_eq!(err.code, ErrorCode::MPTY0004);
}

#[test]
fn range_composes_with_predicates() {
    assert_eq!(integers(&eval("(1 to 5)[3]").unwrap()), vec![3]);
}
