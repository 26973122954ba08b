//! RFC 3339 timestamps for envelope `_date` fields.
//!
//! Timestamps are carried as microseconds since the Unix epoch plus a UTC
//! offset in minutes. Civil-date conversion uses Howard Hinnant's
//! days-from-civil algorithms, valid for the proleptic Gregorian calendar.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;
const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;

/// Error for a string that is not an RFC 3339 datetime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateTimeParseError {
    #[error("not an RFC 3339 datetime: {0:?}")]
    Malformed(String),

    #[error("{field} out of range in {value:?}")]
    OutOfRange { field: &'static str, value: String },

    #[error("invalid UTC offset {0:?}")]
    InvalidOffset(String),
}

/// Current time in microseconds since the Unix epoch.
///
/// A clock set before 1970 reads as negative.
pub fn now_epoch_micros() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(since) => i64::try_from(since.as_micros()).unwrap_or(i64::MAX),
        Err(e) => i64::try_from(e.duration().as_micros()).map_or(i64::MIN, |m| -m),
    }
}

/// Formats `epoch_micros` as `YYYY-MM-DDTHH:MM:SS[.ffffff](Z|±HH:MM)`.
///
/// Trailing zeros of the fraction are dropped, and so is a zero fraction.
pub fn format_datetime_rfc3339(epoch_micros: i64, offset_min: i16) -> String {
    let local = epoch_micros + offset_min as i64 * MICROS_PER_MINUTE;
    let days = local.div_euclid(MICROS_PER_DAY);
    let time = local.rem_euclid(MICROS_PER_DAY);
    let (year, month, day) = civil_from_days(days);

    let hours = time / MICROS_PER_HOUR;
    let minutes = time % MICROS_PER_HOUR / MICROS_PER_MINUTE;
    let seconds = time % MICROS_PER_MINUTE / MICROS_PER_SECOND;
    let micros = time % MICROS_PER_SECOND;

    let fraction = if micros == 0 {
        String::new()
    } else {
        let digits = format!("{:06}", micros);
        format!(".{}", digits.trim_end_matches('0'))
    };

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}{}",
        year,
        month,
        day,
        hours,
        minutes,
        seconds,
        fraction,
        format_offset(offset_min)
    )
}

/// Parses an RFC 3339 datetime into `(epoch_micros, offset_min)`.
///
/// A space is accepted in place of `T`, a missing offset means UTC, and
/// fractions beyond microseconds are truncated.
pub fn parse_datetime_rfc3339(s: &str) -> Result<(i64, i16), DateTimeParseError> {
    let malformed = || DateTimeParseError::Malformed(s.to_string());
    let out_of_range = |field| DateTimeParseError::OutOfRange {
        field,
        value: s.to_string(),
    };

    if !s.is_ascii() || s.len() < 19 {
        return Err(malformed());
    }
    let b = s.as_bytes();
    if b[4] != b'-' || b[7] != b'-' || !matches!(b[10], b'T' | b't' | b' ') || b[13] != b':' || b[16] != b':' {
        return Err(malformed());
    }

    let year: i64 = digits(&s[0..4]).ok_or_else(malformed)?;
    let month: i64 = digits(&s[5..7]).ok_or_else(malformed)?;
    let day: i64 = digits(&s[8..10]).ok_or_else(malformed)?;
    let hours: i64 = digits(&s[11..13]).ok_or_else(malformed)?;
    let minutes: i64 = digits(&s[14..16]).ok_or_else(malformed)?;
    let seconds: i64 = digits(&s[17..19]).ok_or_else(malformed)?;

    if !(1..=12).contains(&month) {
        return Err(out_of_range("month"));
    }
    if day < 1 || day > days_in_month(year, month) {
        return Err(out_of_range("day"));
    }
    if hours > 23 {
        return Err(out_of_range("hours"));
    }
    if minutes > 59 {
        return Err(out_of_range("minutes"));
    }
    if seconds > 59 {
        return Err(out_of_range("seconds"));
    }

    let mut rest = &s[19..];
    let mut micros = 0i64;
    if let Some(after_point) = rest.strip_prefix('.') {
        let end = after_point
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after_point.len());
        if end == 0 {
            return Err(malformed());
        }
        let fraction = &after_point[..end.min(6)];
        micros = digits(fraction).ok_or_else(malformed)? * 10i64.pow(6 - fraction.len() as u32);
        rest = &after_point[end..];
    }

    let offset_min = if rest.is_empty() { 0 } else { parse_offset(rest)? };

    let local = days_from_civil(year, month, day) * MICROS_PER_DAY
        + hours * MICROS_PER_HOUR
        + minutes * MICROS_PER_MINUTE
        + seconds * MICROS_PER_SECOND
        + micros;
    Ok((local - offset_min as i64 * MICROS_PER_MINUTE, offset_min))
}

fn digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_offset(s: &str) -> Result<i16, DateTimeParseError> {
    if s == "Z" || s == "z" {
        return Ok(0);
    }
    let invalid = || DateTimeParseError::InvalidOffset(s.to_string());

    let b = s.as_bytes();
    if b.len() != 6 || b[3] != b':' {
        return Err(invalid());
    }
    let sign = match b[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(invalid()),
    };
    let hours = digits(&s[1..3]).ok_or_else(invalid)?;
    let minutes = digits(&s[4..6]).ok_or_else(invalid)?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok((sign * (hours * 60 + minutes)) as i16)
}

fn format_offset(offset_min: i16) -> String {
    if offset_min == 0 {
        return "Z".to_string();
    }
    let sign = if offset_min < 0 { '-' } else { '+' };
    let abs = offset_min.unsigned_abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i64, month: i64) -> i64 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Days since 1970-01-01 of a civil date.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Civil date of a day count since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}
