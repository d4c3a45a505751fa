//! Value parsers shared by both upload modes.
//!
//! Spreadsheets arrive with dates in half a dozen formats and amounts typed
//! as "₹1,200" or "1500-200". Each parser here is total: bad input degrades
//! to a defined default instead of an error, and strict presence checks are
//! the validator's job.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Trimmed text of the cell at `col`, or an empty string when the column was
/// not resolved or the row is short.
pub fn cell_text(row: &[String], col: Option<usize>) -> String {
    col.and_then(|i| row.get(i))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Parse a date cell. Never fails: blank or unrecognized input resolves to
/// the current time.
///
/// Rules are tried in order, first success wins:
/// 1. blank -> now
/// 2. ISO-like forms (`2024-03-05`, with optional time, RFC 3339)
/// 3. dotted `d.m.yyyy`
/// 4. slash-separated, day-first then US month-first
/// 5. hyphen-separated, same trial order
/// 6. fallback -> now
pub fn parse_date(raw: &str) -> DateTime<Utc> {
    let s = raw.trim();
    if s.is_empty() {
        return Utc::now();
    }
    parse_iso(s)
        .or_else(|| parse_dotted(s))
        .or_else(|| parse_separated(s, '/'))
        .or_else(|| parse_separated(s, '-'))
        .unwrap_or_else(Utc::now)
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Year-first forms only; anything without a leading 4-digit year falls
    // through to the day-first rules below.
    let bytes = s.as_bytes();
    if bytes.len() < 5 || !bytes[..4].iter().all(u8::is_ascii_digit) {
        return None;
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(midnight_utc(d));
        }
    }
    None
}

fn parse_dotted(s: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let year = full_year(parts[2].trim().parse().ok()?);
    NaiveDate::from_ymd_opt(year, month, day).map(midnight_utc)
}

fn parse_separated(s: &str, sep: char) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }
    let a: u32 = parts[0].trim().parse().ok()?;
    let b: u32 = parts[1].trim().parse().ok()?;
    let year = full_year(parts[2].trim().parse().ok()?);
    // Day-first, then the US month-first reading.
    NaiveDate::from_ymd_opt(year, b, a)
        .or_else(|| NaiveDate::from_ymd_opt(year, a, b))
        .map(midnight_utc)
}

/// Two-digit years read as 2000+.
fn full_year(y: i32) -> i32 {
    if y < 100 {
        2000 + y
    } else {
        y
    }
}

/// Parse an amount cell. Currency symbols, commas and whitespace are
/// stripped first. Supports inline addition ("100+50") and left-to-right
/// subtraction when a '-' appears past the first character ("1500-200-100").
/// Unparseable tokens contribute 0; blank input is 0.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-'))
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    if cleaned.contains('+') {
        return cleaned.split('+').map(parse_term).sum();
    }
    if let Some(pos) = cleaned[1..].find('-') {
        let first_end = pos + 1;
        let mut total = parse_term(&cleaned[..first_end]);
        for part in cleaned[first_end + 1..].split('-') {
            total -= parse_term(part);
        }
        return total;
    }
    parse_term(&cleaned)
}

fn parse_term(s: &str) -> f64 {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Parse a quantity cell as a whole number; fractional values truncate and
/// unparseable input is 0.
pub fn parse_qty(raw: &str) -> i64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    if cleaned.is_empty() {
        return 0;
    }
    if let Ok(n) = cleaned.parse::<i64>() {
        return n;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v as i64,
        _ => 0,
    }
}

// =============================================================================
// TESTS
// =============================================================================
