//! Numeric classification and the arithmetic operator tables, including the
//! permitted temporal pairings.

use chrono::{DateTime, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::parser::ast::BinaryOp;
use crate::runtime::{Error, ErrorCode};
use crate::xdm::{self, AtomicValue};

/// Numeric classification carrying the value; the subset has two numeric
/// types and integer-pairs stay integral wherever the operator allows it.
#[derive(Clone, Copy)]
pub(crate) enum NumKind {
    Int(i64),
    Dec(Decimal),
}

pub(crate) fn classify(value: &AtomicValue) -> Option<NumKind> {
    match value {
        AtomicValue::Integer(i) => Some(NumKind::Int(*i)),
        AtomicValue::Decimal(d) => Some(NumKind::Dec(*d)),
        _ => None,
    }
}

pub(crate) fn to_decimal(kind: NumKind) -> Decimal {
    match kind {
        NumKind::Int(i) => Decimal::from(i),
        NumKind::Dec(d) => d,
    }
}

fn overflow() -> Error {
    Error::dynamic_error(ErrorCode::FOAR0002, "numeric overflow")
}

fn div_by_zero() -> Error {
    Error::dynamic_error(ErrorCode::FOAR0001, "division by zero")
}

/// Untyped operands cast to a numeric before the operator tables apply.
fn normalize_operand(value: &AtomicValue) -> Result<AtomicValue, Error> {
    match value {
        AtomicValue::UntypedAtomic(s) => xdm::parse_numeric(s).ok_or_else(|| {
            Error::dynamic_error(ErrorCode::FORG0001, format!("cannot cast '{s}' to a number"))
        }),
        other => Ok(other.clone()),
    }
}

pub(crate) fn negate(value: &AtomicValue) -> Result<AtomicValue, Error> {
    let value = normalize_operand(value)?;
    match classify(&value) {
        Some(NumKind::Int(i)) => i
            .checked_neg()
            .map(AtomicValue::Integer)
            .ok_or_else(overflow),
        Some(NumKind::Dec(d)) => Ok(AtomicValue::Decimal(-d)),
        None => Err(Error::dynamic_error(
            ErrorCode::MPTY0004,
            format!("cannot negate a value of type {}", value.type_name()),
        )),
    }
}

/// Dispatch on the runtime type pair: numeric⊗numeric uses standard
/// arithmetic, the temporal table covers the date/duration pairings, and
/// everything else is an unsupported-operation error naming both operand
/// types.
pub(crate) fn arithmetic(
    op: BinaryOp,
    a: &AtomicValue,
    b: &AtomicValue,
) -> Result<AtomicValue, Error> {
    let a = normalize_operand(a)?;
    let b = normalize_operand(b)?;
    if let (Some(x), Some(y)) = (classify(&a), classify(&b)) {
        return numeric_arithmetic(op, x, y);
    }
    temporal_arithmetic(op, &a, &b)
}

fn numeric_arithmetic(op: BinaryOp, a: NumKind, b: NumKind) -> Result<AtomicValue, Error> {
    use BinaryOp::*;
    use NumKind::*;
    match (op, a, b) {
        (Add, Int(x), Int(y)) => x
            .checked_add(y)
            .map(AtomicValue::Integer)
            .ok_or_else(overflow),
        (Sub, Int(x), Int(y)) => x
            .checked_sub(y)
            .map(AtomicValue::Integer)
            .ok_or_else(overflow),
        (Mul, Int(x), Int(y)) => x
            .checked_mul(y)
            .map(AtomicValue::Integer)
            .ok_or_else(overflow),
        (Add, x, y) => to_decimal(x)
            .checked_add(to_decimal(y))
            .map(AtomicValue::Decimal)
            .ok_or_else(overflow),
        (Sub, x, y) => to_decimal(x)
            .checked_sub(to_decimal(y))
            .map(AtomicValue::Decimal)
            .ok_or_else(overflow),
        (Mul, x, y) => to_decimal(x)
            .checked_mul(to_decimal(y))
            .map(AtomicValue::Decimal)
            .ok_or_else(overflow),
        // Division always produces a decimal, even for integer operands.
        (Div, x, y) => {
            let denominator = to_decimal(y);
            if denominator.is_zero() {
                return Err(div_by_zero());
            }
            to_decimal(x)
                .checked_div(denominator)
                .map(AtomicValue::Decimal)
                .ok_or_else(overflow)
        }
        (IDiv, Int(x), Int(y)) => {
            if y == 0 {
                return Err(div_by_zero());
            }
            x.checked_div(y)
                .map(AtomicValue::Integer)
                .ok_or_else(overflow)
        }
        (IDiv, x, y) => {
            let denominator = to_decimal(y);
            if denominator.is_zero() {
                return Err(div_by_zero());
            }
            to_decimal(x)
                .checked_div(denominator)
                .and_then(|d| d.trunc().to_i64())
                .map(AtomicValue::Integer)
                .ok_or_else(overflow)
        }
        (Mod, Int(x), Int(y)) => {
            if y == 0 {
                return Err(div_by_zero());
            }
            x.checked_rem(y)
                .map(AtomicValue::Integer)
                .ok_or_else(overflow)
        }
        (Mod, x, y) => {
            let denominator = to_decimal(y);
            if denominator.is_zero() {
                return Err(div_by_zero());
            }
            to_decimal(x)
                .checked_rem(denominator)
                .map(AtomicValue::Decimal)
                .ok_or_else(overflow)
        }
    }
}

fn temporal_arithmetic(
    op: BinaryOp,
    a: &AtomicValue,
    b: &AtomicValue,
) -> Result<AtomicValue, Error> {
    use AtomicValue as V;
    use BinaryOp::*;
    match (op, a, b) {
        // Additions; duration-plus-temporal commutes.
        (Add, V::Date { date, tz }, V::YearMonthDuration(m))
        | (Add, V::YearMonthDuration(m), V::Date { date, tz }) => Ok(V::Date {
            date: add_months_to_date(*date, *m)?,
            tz: *tz,
        }),
        (Add, V::Date { date, tz }, V::DayTimeDuration(s))
        | (Add, V::DayTimeDuration(s), V::Date { date, tz }) => Ok(V::Date {
            date: add_seconds_to_date(*date, *s)?,
            tz: *tz,
        }),
        (Add, V::DateTime(dt), V::YearMonthDuration(m))
        | (Add, V::YearMonthDuration(m), V::DateTime(dt)) => {
            Ok(V::DateTime(add_months_to_date_time(*dt, *m)?))
        }
        (Add, V::DateTime(dt), V::DayTimeDuration(s))
        | (Add, V::DayTimeDuration(s), V::DateTime(dt)) => Ok(V::DateTime(
            dt.checked_add_signed(seconds_duration(*s)?)
                .ok_or_else(overflow)?,
        )),
        (Add, V::YearMonthDuration(x), V::YearMonthDuration(y)) => x
            .checked_add(*y)
            .map(V::YearMonthDuration)
            .ok_or_else(overflow),
        (Add, V::DayTimeDuration(x), V::DayTimeDuration(y)) => x
            .checked_add(*y)
            .map(V::DayTimeDuration)
            .ok_or_else(overflow),

        // Subtractions; temporal minus temporal yields a day-time duration.
        (Sub, V::Date { date: x, tz: tx }, V::Date { date: y, tz: ty }) => Ok(
            V::DayTimeDuration(date_epoch_seconds(x, *tx) - date_epoch_seconds(y, *ty)),
        ),
        (Sub, V::DateTime(x), V::DateTime(y)) => {
            Ok(V::DayTimeDuration(x.signed_duration_since(*y).num_seconds()))
        }
        (Sub, V::Date { date, tz }, V::YearMonthDuration(m)) => Ok(V::Date {
            date: add_months_to_date(*date, m.checked_neg().ok_or_else(overflow)?)?,
            tz: *tz,
        }),
        (Sub, V::Date { date, tz }, V::DayTimeDuration(s)) => Ok(V::Date {
            date: add_seconds_to_date(*date, s.checked_neg().ok_or_else(overflow)?)?,
            tz: *tz,
        }),
        (Sub, V::DateTime(dt), V::YearMonthDuration(m)) => Ok(V::DateTime(
            add_months_to_date_time(*dt, m.checked_neg().ok_or_else(overflow)?)?,
        )),
        (Sub, V::DateTime(dt), V::DayTimeDuration(s)) => Ok(V::DateTime(
            dt.checked_sub_signed(seconds_duration(*s)?)
                .ok_or_else(overflow)?,
        )),
        (Sub, V::YearMonthDuration(x), V::YearMonthDuration(y)) => x
            .checked_sub(*y)
            .map(V::YearMonthDuration)
            .ok_or_else(overflow),
        (Sub, V::DayTimeDuration(x), V::DayTimeDuration(y)) => x
            .checked_sub(*y)
            .map(V::DayTimeDuration)
            .ok_or_else(overflow),

        // Duration scaling.
        (Mul, V::YearMonthDuration(m), other) | (Mul, other, V::YearMonthDuration(m))
            if classify(other).is_some() =>
        {
            scale_months(*m, classify(other).expect("numeric factor"))
        }
        (Mul, V::DayTimeDuration(s), other) | (Mul, other, V::DayTimeDuration(s))
            if classify(other).is_some() =>
        {
            scale_seconds(*s, classify(other).expect("numeric factor"))
        }

        // Duration division; same-subtype division yields a decimal ratio.
        (Div, V::YearMonthDuration(x), V::YearMonthDuration(y)) => {
            if *y == 0 {
                return Err(div_by_zero());
            }
            Decimal::from(*x)
                .checked_div(Decimal::from(*y))
                .map(V::Decimal)
                .ok_or_else(overflow)
        }
        (Div, V::DayTimeDuration(x), V::DayTimeDuration(y)) => {
            if *y == 0 {
                return Err(div_by_zero());
            }
            Decimal::from(*x)
                .checked_div(Decimal::from(*y))
                .map(V::Decimal)
                .ok_or_else(overflow)
        }
        (Div, V::YearMonthDuration(m), other) if classify(other).is_some() => {
            divide_months(*m, classify(other).expect("numeric divisor"))
        }
        (Div, V::DayTimeDuration(s), other) if classify(other).is_some() => {
            divide_seconds(*s, classify(other).expect("numeric divisor"))
        }

        (op, a, b) => Err(Error::dynamic_error(
            ErrorCode::MPTY0004,
            format!(
                "operator {} is not defined for operands of type {} and {}",
                op.symbol(),
                a.type_name(),
                b.type_name()
            ),
        )),
    }
}

fn scale_months(months: i32, factor: NumKind) -> Result<AtomicValue, Error> {
    Decimal::from(months)
        .checked_mul(to_decimal(factor))
        .and_then(|d| d.round().to_i32())
        .map(AtomicValue::YearMonthDuration)
        .ok_or_else(overflow)
}

fn divide_months(months: i32, divisor: NumKind) -> Result<AtomicValue, Error> {
    let divisor = to_decimal(divisor);
    if divisor.is_zero() {
        return Err(div_by_zero());
    }
    Decimal::from(months)
        .checked_div(divisor)
        .and_then(|d| d.round().to_i32())
        .map(AtomicValue::YearMonthDuration)
        .ok_or_else(overflow)
}

fn scale_seconds(seconds: i64, factor: NumKind) -> Result<AtomicValue, Error> {
    Decimal::from(seconds)
        .checked_mul(to_decimal(factor))
        .and_then(|d| d.round().to_i64())
        .map(AtomicValue::DayTimeDuration)
        .ok_or_else(overflow)
}

fn divide_seconds(seconds: i64, divisor: NumKind) -> Result<AtomicValue, Error> {
    let divisor = to_decimal(divisor);
    if divisor.is_zero() {
        return Err(div_by_zero());
    }
    Decimal::from(seconds)
        .checked_div(divisor)
        .and_then(|d| d.round().to_i64())
        .map(AtomicValue::DayTimeDuration)
        .ok_or_else(overflow)
}

/// Seconds since the epoch at midnight of `date`, honoring an explicit
/// timezone offset (UTC otherwise).
pub(crate) fn date_epoch_seconds(date: &NaiveDate, tz: Option<FixedOffset>) -> i64 {
    let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
    midnight.and_utc().timestamp() - i64::from(tz.map_or(0, |o| o.local_minus_utc()))
}

fn seconds_duration(seconds: i64) -> Result<Duration, Error> {
    Duration::try_seconds(seconds).ok_or_else(overflow)
}

fn add_months_to_date(date: NaiveDate, months: i32) -> Result<NaiveDate, Error> {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.ok_or_else(overflow)
}

fn add_seconds_to_date(date: NaiveDate, seconds: i64) -> Result<NaiveDate, Error> {
    let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
    midnight
        .checked_add_signed(seconds_duration(seconds)?)
        .map(|dt| dt.date())
        .ok_or_else(overflow)
}

fn add_months_to_date_time(
    dt: DateTime<FixedOffset>,
    months: i32,
) -> Result<DateTime<FixedOffset>, Error> {
    let local = dt.naive_local();
    let date = add_months_to_date(local.date(), months)?;
    let shifted = NaiveDateTime::new(date, local.time());
    shifted
        .and_local_timezone(*dt.offset())
        .single()
        .ok_or_else(overflow)
}
