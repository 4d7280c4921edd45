//! Timestamp resolution.
//!
//! Raw time values are either epoch numbers of unknown unit or strings in a
//! user supplied strftime format. Both end up as a timezone aware instant
//! and a nanosecond epoch integer with millisecond precision.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};
use chrono_tz::{OffsetComponents, Tz};

use crate::error::{ImportError, Result};
use crate::infer::is_integer_like;

const NANOS_PER_MILLI: i64 = 1_000_000;

/// Epoch numbers with this many digits or more are milliseconds
const MILLIS_MIN_DIGITS: u32 = 13;
/// Epoch numbers with this many digits or more are microseconds
const MICROS_MIN_DIGITS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochUnit {
    Seconds,
    Milliseconds,
    Microseconds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTime {
    pub nanos: i64,
    pub instant: DateTime<FixedOffset>,
}

impl ResolvedTime {
    pub fn millis(&self) -> i64 {
        self.nanos / NANOS_PER_MILLI
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| ImportError::config(format!("unknown timezone '{}': {}", name, e)))
}

fn digits(value: i64) -> u32 {
    value.unsigned_abs().checked_ilog10().unwrap_or(0) + 1
}

/// Guess the unit of an epoch number from its digit count. Assumes dates
/// roughly between 1970 and 2286.
pub fn epoch_unit(value: i64) -> EpochUnit {
    match digits(value) {
        d if d < MILLIS_MIN_DIGITS => EpochUnit::Seconds,
        d if d < MICROS_MIN_DIGITS => EpochUnit::Milliseconds,
        _ => EpochUnit::Microseconds,
    }
}

fn epoch_to_datetime(value: i64) -> Option<DateTime<Utc>> {
    let (per_second, nanos_per_unit) = match epoch_unit(value) {
        EpochUnit::Seconds => (1, 0),
        EpochUnit::Milliseconds => (1_000, 1_000_000),
        EpochUnit::Microseconds => (1_000_000, 1_000),
    };
    let secs = value.div_euclid(per_second);
    let nanos = value.rem_euclid(per_second) * nanos_per_unit;
    DateTime::from_timestamp(secs, u32::try_from(nanos).ok()?)
}

fn parse_epoch(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().map(|f| f as i64))
}

fn has_offset_directive(format: &str) -> bool {
    format.contains("%z") || format.contains("%:z") || format.contains("%#z")
}

/// Rewrite strptime-style fraction directives for chrono. `.%f` becomes
/// `%.f`, which reads any number of fraction digits; a bare `%f` is read as
/// six digits of microseconds instead of chrono's whole nanoseconds.
pub fn chrono_format(format: &str) -> String {
    let mut out = String::with_capacity(format.len() + 2);
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('f') if out.ends_with('.') => {
                out.pop();
                out.push_str("%.f");
            }
            Some('f') => out.push_str("%6f"),
            Some(next) => {
                out.push('%');
                out.push(next);
            }
            None => out.push('%'),
        }
    }
    out
}

fn parse_error(value: &str, format: &str, reason: impl ToString) -> ImportError {
    ImportError::Timestamp {
        value: value.to_string(),
        format: format.to_string(),
        reason: reason.to_string(),
    }
}

/// Local reading of `naive` in `tz`. Ambiguous times take the standard
/// time reading; times inside a DST gap use the standard offset.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<FixedOffset> {
    let localized = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, latest) => {
            if earliest.offset().dst_offset() == Duration::zero() {
                earliest
            } else {
                latest
            }
        }
        LocalResult::None => {
            let standard = tz.offset_from_utc_datetime(&naive).base_utc_offset();
            let utc = naive - standard;
            tz.from_utc_datetime(&utc)
        }
    };
    localized.with_timezone(&localized.offset().fix())
}

fn parse_naive(
    value: &str,
    format: &str,
) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    match NaiveDateTime::parse_from_str(value, format) {
        Ok(dt) => Ok(dt),
        // Date-only formats such as "%Y-%m-%d" mean midnight
        Err(e) => NaiveDate::parse_from_str(value, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or(e),
    }
}

fn to_instant(raw: &str, format: &str, tz: Tz) -> Result<DateTime<FixedOffset>> {
    if is_integer_like(raw) {
        return parse_epoch(raw)
            .and_then(epoch_to_datetime)
            .map(|dt| dt.with_timezone(&Utc.fix()))
            .ok_or_else(|| ImportError::TimestampOutOfRange {
                value: raw.to_string(),
            });
    }

    let fmt = chrono_format(format);
    if has_offset_directive(&fmt) {
        return DateTime::parse_from_str(raw, &fmt).map_err(|e| parse_error(raw, format, e));
    }

    let naive = parse_naive(raw, &fmt).map_err(|e| parse_error(raw, format, e))?;
    Ok(localize(naive, tz))
}

/// Resolve a raw time value to nanoseconds since the epoch.
///
/// The nanosecond value is derived from whole milliseconds, so anything
/// finer than a millisecond is dropped.
pub fn resolve(raw: &str, format: &str, tz: Tz) -> Result<ResolvedTime> {
    let instant = to_instant(raw, format, tz)?;

    let epoch = DateTime::<Utc>::default();
    let millis = (instant.with_timezone(&Utc) - epoch).num_milliseconds();
    let nanos = millis
        .checked_mul(NANOS_PER_MILLI)
        .filter(|nanos| *nanos >= 0)
        .ok_or_else(|| ImportError::TimestampOutOfRange {
            value: raw.to_string(),
        })?;

    Ok(ResolvedTime { nanos, instant })
}
