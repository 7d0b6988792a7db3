//! Data model shared by the compiler and the evaluator: expanded names,
//! atomic values, items, and sequences.
//!
//! Atomic values keep their lexical behavior close to the XDM types they
//! model: durations are stored normalized (months / seconds), temporal
//! values use `chrono`, decimals use `rust_decimal`, and base64 values keep
//! their lexical form after validation.

use core::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// A namespace-resolved name: optional namespace URI plus local part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<String>, local: impl Into<String>) -> Self {
        Self {
            ns_uri,
            local: local.into(),
        }
    }

    /// A name with no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self::new(None, local)
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(ns) => write!(f, "Q{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Atomic value universe of the Metapath subset.
///
/// `UntypedAtomic` is produced by atomizing node items; it must be cast to a
/// concrete type before most operators apply (the evaluator's comparison and
/// arithmetic modules own those rules).
#[derive(Debug, Clone, PartialEq)]
pub enum AtomicValue {
    String(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    Date {
        date: NaiveDate,
        tz: Option<FixedOffset>,
    },
    DateTime(DateTime<FixedOffset>),
    /// Whole months, negative for negative durations.
    YearMonthDuration(i32),
    /// Whole seconds, negative for negative durations.
    DayTimeDuration(i64),
    /// Validated lexical form.
    Base64Binary(String),
    UntypedAtomic(String),
}

impl AtomicValue {
    /// Stable type tag used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AtomicValue::String(_) => "string",
            AtomicValue::Integer(_) => "integer",
            AtomicValue::Decimal(_) => "decimal",
            AtomicValue::Boolean(_) => "boolean",
            AtomicValue::Date { .. } => "date",
            AtomicValue::DateTime(_) => "date-time",
            AtomicValue::YearMonthDuration(_) => "year-month-duration",
            AtomicValue::DayTimeDuration(_) => "day-time-duration",
            AtomicValue::Base64Binary(_) => "base64-binary",
            AtomicValue::UntypedAtomic(_) => "untyped-atomic",
        }
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, AtomicValue::UntypedAtomic(_))
    }

    /// Canonical string form.
    pub fn string_value(&self) -> String {
        match self {
            AtomicValue::String(s) | AtomicValue::UntypedAtomic(s) => s.clone(),
            AtomicValue::Integer(i) => i.to_string(),
            AtomicValue::Decimal(d) => d.normalize().to_string(),
            AtomicValue::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            AtomicValue::Date { date, tz } => {
                let mut out = date.format("%Y-%m-%d").to_string();
                if let Some(tz) = tz {
                    out.push_str(&format_offset(*tz));
                }
                out
            }
            AtomicValue::DateTime(dt) => dt.to_rfc3339(),
            AtomicValue::YearMonthDuration(months) => format_year_month(*months),
            AtomicValue::DayTimeDuration(secs) => format_day_time(*secs),
            AtomicValue::Base64Binary(s) => s.clone(),
        }
    }
}

fn format_offset(off: FixedOffset) -> String {
    let secs = off.local_minus_utc();
    if secs == 0 {
        return "Z".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.abs();
    format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
}

fn format_year_month(months: i32) -> String {
    if months == 0 {
        return "P0M".to_string();
    }
    let mut out = String::new();
    if months < 0 {
        out.push('-');
    }
    out.push('P');
    let m = months.unsigned_abs();
    let years = m / 12;
    let rem = m % 12;
    if years > 0 {
        out.push_str(&format!("{years}Y"));
    }
    if rem > 0 || years == 0 {
        out.push_str(&format!("{rem}M"));
    }
    out
}

fn format_day_time(secs: i64) -> String {
    if secs == 0 {
        return "PT0S".to_string();
    }
    let mut out = String::new();
    if secs < 0 {
        out.push('-');
    }
    out.push('P');
    let mut rest = secs.unsigned_abs();
    let days = rest / 86_400;
    rest %= 86_400;
    let hours = rest / 3_600;
    rest %= 3_600;
    let minutes = rest / 60;
    let seconds = rest % 60;
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours > 0 || minutes > 0 || seconds > 0 {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{hours}H"));
        }
        if minutes > 0 {
            out.push_str(&format!("{minutes}M"));
        }
        if seconds > 0 {
            out.push_str(&format!("{seconds}S"));
        }
    }
    out
}

/// Parse a numeric lexical value: integer lexicals become `Integer`, decimal
/// and scientific lexicals become `Decimal`.
pub fn parse_numeric(s: &str) -> Option<AtomicValue> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    if let Ok(i) = t.parse::<i64>() {
        return Some(AtomicValue::Integer(i));
    }
    if let Ok(d) = Decimal::from_str(t) {
        return Some(AtomicValue::Decimal(d));
    }
    if let Ok(d) = Decimal::from_scientific(t) {
        return Some(AtomicValue::Decimal(d));
    }
    None
}

pub fn parse_boolean(s: &str) -> Option<bool> {
    match s.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parse `YYYY-MM-DD` with an optional `Z`/`±hh:mm` suffix.
pub fn parse_date(s: &str) -> Option<AtomicValue> {
    let (body, tz) = split_timezone(s.trim())?;
    let date = NaiveDate::parse_from_str(body, "%Y-%m-%d").ok()?;
    Some(AtomicValue::Date { date, tz })
}

/// Parse an RFC 3339 date-time; a missing timezone is treated as UTC.
pub fn parse_date_time(s: &str) -> Option<AtomicValue> {
    let t = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(AtomicValue::DateTime(dt));
    }
    let naive = NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    let utc = FixedOffset::east_opt(0)?;
    Some(AtomicValue::DateTime(
        naive.and_local_timezone(utc).single()?,
    ))
}

fn split_timezone(s: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(body) = s.strip_suffix('Z') {
        return Some((body, Some(FixedOffset::east_opt(0)?)));
    }
    if s.len() > 6 && s.is_char_boundary(s.len() - 6) {
        let (body, suffix) = s.split_at(s.len() - 6);
        let bytes = suffix.as_bytes();
        if (bytes[0] == b'+' || bytes[0] == b'-') && bytes[3] == b':' {
            let hours: i32 = suffix[1..3].parse().ok()?;
            let minutes: i32 = suffix[4..6].parse().ok()?;
            let mut secs = hours * 3_600 + minutes * 60;
            if bytes[0] == b'-' {
                secs = -secs;
            }
            let off = FixedOffset::east_opt(secs)?;
            return Some((body, Some(off)));
        }
    }
    Some((s, None))
}

/// Parse an ISO 8601 duration lexical into one of the two duration subtypes.
///
/// Mixed year-month and day-time components are rejected (the subset has no
/// general duration type). Fractional seconds truncate toward zero.
pub fn parse_duration(s: &str) -> Option<AtomicValue> {
    let t = s.trim();
    let (negative, rest) = match t.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, t),
    };
    let rest = rest.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };
    if date_part.is_empty() && time_part.is_none() {
        return None;
    }
    if let Some(tp) = time_part
        && tp.is_empty()
    {
        return None;
    }
    let date_fields = parse_duration_fields(date_part, &['Y', 'M', 'D'])?;
    let time_fields = match time_part {
        Some(tp) => parse_duration_fields(tp, &['H', 'M', 'S'])?,
        None => Vec::new(),
    };
    let has_year_month = date_fields.iter().any(|(c, _)| *c == 'Y' || *c == 'M');
    let has_day_time =
        date_fields.iter().any(|(c, _)| *c == 'D') || !time_fields.is_empty();
    if has_year_month && has_day_time {
        return None;
    }
    if has_year_month {
        let mut months: i64 = 0;
        for (c, v) in date_fields {
            months += match c {
                'Y' => (v as i64).checked_mul(12)?,
                'M' => v as i64,
                _ => return None,
            };
        }
        if negative {
            months = -months;
        }
        Some(AtomicValue::YearMonthDuration(
            i32::try_from(months).ok()?,
        ))
    } else {
        let mut seconds: i64 = 0;
        for (c, v) in date_fields.into_iter().chain(time_fields) {
            let unit: i64 = match c {
                'D' => 86_400,
                'H' => 3_600,
                'M' => 60,
                'S' => 1,
                _ => return None,
            };
            seconds = seconds.checked_add((v as i64).checked_mul(unit)?)?;
        }
        if negative {
            seconds = -seconds;
        }
        Some(AtomicValue::DayTimeDuration(seconds))
    }
}

/// Scan `<digits><designator>` groups in order; fractions are only allowed
/// on the seconds field.
fn parse_duration_fields(part: &str, allowed: &[char]) -> Option<Vec<(char, f64)>> {
    let mut out = Vec::new();
    let mut number = String::new();
    let mut next_allowed = 0usize;
    for ch in part.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            number.push(ch);
        } else {
            if number.is_empty() {
                return None;
            }
            let pos = allowed.iter().position(|d| *d == ch)?;
            if pos < next_allowed {
                return None;
            }
            next_allowed = pos + 1;
            let value: f64 = number.parse().ok()?;
            if ch != 'S' && value.fract() != 0.0 {
                return None;
            }
            out.push((ch, value));
            number.clear();
        }
    }
    if !number.is_empty() {
        return None;
    }
    Some(out)
}

/// Validate a base64 lexical form, returning it with whitespace stripped.
pub fn parse_base64(s: &str) -> Option<String> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64_STANDARD.decode(compact.as_bytes()).ok()?;
    Some(compact)
}

/// The universal evaluation result: an ordered, possibly empty item list.
pub type Sequence<N> = Vec<Item<N>>;

/// An item is either a node from the external tree or an atomic value.
#[derive(Debug, Clone, PartialEq)]
pub enum Item<N> {
    Node(N),
    Atomic(AtomicValue),
}

impl<N> From<N> for Item<N> {
    fn from(n: N) -> Self {
        Item::Node(n)
    }
}

impl<N> fmt::Display for Item<N>
where
    N: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Node(_) => write!(f, "<node>"),
            Item::Atomic(a) => write!(f, "{}", a.string_value()),
        }
    }
}
