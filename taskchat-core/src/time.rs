//! Time utilities: timezone-aware "today" and relative date tokens.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Parse an IANA timezone name like "America/Chicago".
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.trim()
        .parse()
        .map_err(|_| Error::InvalidTimezone(tz.to_string()))
}

/// Calendar date of `now` in the given timezone.
pub fn local_today(now: DateTime<Utc>, tz: &str) -> Result<NaiveDate> {
    let tz = parse_timezone(tz)?;
    Ok(now.with_timezone(&tz).date_naive())
}

/// Parse an ISO date (`YYYY-MM-DD`), tolerating a trailing time part.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Resolve an absolute or relative date expression against `today`.
///
/// Accepts ISO dates, `today`, `tomorrow`, `yesterday`, and signed offsets
/// `+3d`, `-2d`, `+1w`.
pub fn resolve_date(expr: &str, today: NaiveDate) -> Option<NaiveDate> {
    let e = expr.trim().to_lowercase();
    match e.as_str() {
        "today" | "now" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }
    if let Some(days) = parse_offset_days(&e) {
        return today.checked_add_signed(Duration::try_days(days)?);
    }
    parse_iso_date(&e)
}

/// `+3d` -> 3, `-2d` -> -2, `+1w` -> 7.
///
/// Offsets too large for a [`Duration`] are rejected.
pub fn parse_offset_days(token: &str) -> Option<i64> {
    let t = token.trim();
    let (sign, rest) = match t.chars().next()? {
        '+' => (1, &t[1..]),
        '-' => (-1, &t[1..]),
        _ => return None,
    };
    let scale = match rest.chars().last()? {
        'd' => 1,
        'w' => 7,
        _ => return None,
    };
    let n: i64 = rest[..rest.len() - 1].parse().ok()?;
    let days = n.checked_mul(scale)?.checked_mul(sign)?;
    Duration::try_days(days)?;
    Some(days)
}

/// Monday..Sunday of the week containing `day`.
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = day.weekday().num_days_from_monday() as i64;
    let start = day - Duration::days(offset);
    (start, start + Duration::days(6))
}
