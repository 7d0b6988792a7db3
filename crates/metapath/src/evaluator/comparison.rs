//! Atomic value comparison.
//!
//! Comparison is defined per family (string, numeric, boolean, date,
//! date-time, and the two duration subtypes, each against itself only). All
//! six operators derive from two primitives per family: an equality test
//! and a strict less-than. Cross-family pairs are a user-facing type error.

use crate::parser::ast::ComparisonOp;
use crate::runtime::{Error, ErrorCode};
use crate::xdm::{self, AtomicValue};

use super::numeric::{classify, date_epoch_seconds, to_decimal};

pub(crate) fn compare_atomic(
    a: &AtomicValue,
    b: &AtomicValue,
    op: ComparisonOp,
) -> Result<bool, Error> {
    use ComparisonOp::*;
    match op {
        Eq => eq_atomic(a, b),
        Ne => Ok(!eq_atomic(a, b)?),
        Lt => lt_atomic(a, b),
        Gt => lt_atomic(b, a),
        Le => Ok(lt_atomic(a, b)? || eq_atomic(a, b)?),
        Ge => Ok(lt_atomic(b, a)? || eq_atomic(a, b)?),
    }
}

fn family_error(a: &AtomicValue, b: &AtomicValue) -> Error {
    Error::dynamic_error(
        ErrorCode::MPTY0004,
        format!(
            "values of type {} and {} cannot be compared",
            a.type_name(),
            b.type_name()
        ),
    )
}

fn eq_atomic(a: &AtomicValue, b: &AtomicValue) -> Result<bool, Error> {
    use AtomicValue as V;
    if let (Some(x), Some(y)) = (classify(a), classify(b)) {
        return Ok(to_decimal(x) == to_decimal(y));
    }
    match (a, b) {
        (V::String(x), V::String(y)) => Ok(x == y),
        (V::Boolean(x), V::Boolean(y)) => Ok(x == y),
        (V::Date { date: x, tz: tx }, V::Date { date: y, tz: ty }) => {
            Ok(date_epoch_seconds(x, *tx) == date_epoch_seconds(y, *ty))
        }
        (V::DateTime(x), V::DateTime(y)) => Ok(
            (x.timestamp(), x.timestamp_subsec_nanos())
                == (y.timestamp(), y.timestamp_subsec_nanos()),
        ),
        (V::YearMonthDuration(x), V::YearMonthDuration(y)) => Ok(x == y),
        (V::DayTimeDuration(x), V::DayTimeDuration(y)) => Ok(x == y),
        _ => Err(family_error(a, b)),
    }
}

fn lt_atomic(a: &AtomicValue, b: &AtomicValue) -> Result<bool, Error> {
    use AtomicValue as V;
    if let (Some(x), Some(y)) = (classify(a), classify(b)) {
        return Ok(to_decimal(x) < to_decimal(y));
    }
    match (a, b) {
        (V::String(x), V::String(y)) => Ok(x < y),
        (V::Boolean(x), V::Boolean(y)) => Ok(!*x && *y),
        (V::Date { date: x, tz: tx }, V::Date { date: y, tz: ty }) => {
            Ok(date_epoch_seconds(x, *tx) < date_epoch_seconds(y, *ty))
        }
        (V::DateTime(x), V::DateTime(y)) => Ok(
            (x.timestamp(), x.timestamp_subsec_nanos())
                < (y.timestamp(), y.timestamp_subsec_nanos()),
        ),
        (V::YearMonthDuration(x), V::YearMonthDuration(y)) => Ok(x < y),
        (V::DayTimeDuration(x), V::DayTimeDuration(y)) => Ok(x < y),
        _ => Err(family_error(a, b)),
    }
}

/// Value comparisons treat untyped operands as strings.
pub(crate) fn untyped_to_string(value: AtomicValue) -> AtomicValue {
    match value {
        AtomicValue::UntypedAtomic(s) => AtomicValue::String(s),
        other => other,
    }
}

/// One cross-product pair of a general comparison: an untyped side casts to
/// the concrete type of the typed side; two untyped sides compare as
/// strings. Cast failures and cross-family pairs are hard errors, not
/// skipped pairs.
pub(crate) fn general_pair(
    a: &AtomicValue,
    b: &AtomicValue,
    op: ComparisonOp,
) -> Result<bool, Error> {
    use AtomicValue as V;
    match (a, b) {
        (V::UntypedAtomic(x), V::UntypedAtomic(y)) => {
            compare_atomic(&V::String(x.clone()), &V::String(y.clone()), op)
        }
        (V::UntypedAtomic(x), typed) => {
            let cast = cast_untyped(x, typed)?;
            compare_atomic(&cast, typed, op)
        }
        (typed, V::UntypedAtomic(y)) => {
            let cast = cast_untyped(y, typed)?;
            compare_atomic(typed, &cast, op)
        }
        _ => compare_atomic(a, b, op),
    }
}

fn cast_untyped(lexical: &str, target: &AtomicValue) -> Result<AtomicValue, Error> {
    use AtomicValue as V;
    let cast_err = || {
        Error::dynamic_error(
            ErrorCode::FORG0001,
            format!("cannot cast '{lexical}' to {}", target.type_name()),
        )
    };
    Ok(match target {
        V::Integer(_) | V::Decimal(_) => xdm::parse_numeric(lexical).ok_or_else(cast_err)?,
        V::String(_) => V::String(lexical.to_string()),
        V::Boolean(_) => V::Boolean(xdm::parse_boolean(lexical).ok_or_else(cast_err)?),
        V::Date { .. } => xdm::parse_date(lexical).ok_or_else(cast_err)?,
        V::DateTime(_) => xdm::parse_date_time(lexical).ok_or_else(cast_err)?,
        V::YearMonthDuration(_) => match xdm::parse_duration(lexical) {
            Some(v @ V::YearMonthDuration(_)) => v,
            _ => return Err(cast_err()),
        },
        V::DayTimeDuration(_) => match xdm::parse_duration(lexical) {
            Some(v @ V::DayTimeDuration(_)) => v,
            _ => return Err(cast_err()),
        },
        V::Base64Binary(_) => V::Base64Binary(xdm::parse_base64(lexical).ok_or_else(cast_err)?),
        V::UntypedAtomic(_) => unreachable!("untyped targets are handled by the caller"),
    })
}
