//! Value shape predicates (RFC 6350 §4 value types).
//!
//! Dates and times accept both the basic (`19960415`) and the extended
//! (`1996-04-15`, `10:22:00`) notations found in 2.1 and 3.0 exports.

use chrono::{NaiveDate, NaiveTime};

/// Leap year used to check month/day pairs that carry no year.
const ANY_LEAP_YEAR: i32 = 2000;

fn all_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

fn number(s: &str) -> Option<u32> {
    s.bytes().all(|b| b.is_ascii_digit()).then(|| s.parse().ok())?
}

/// `scheme ":" rest` with a non-empty rest.
#[must_use]
pub fn is_uri(s: &str) -> bool {
    let Some((scheme, rest)) = s.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
}

#[must_use]
pub fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) && s.parse::<i64>().is_ok()
}

/// `[+-]digits[.digits]`.
#[must_use]
pub fn is_float(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, "0"));
    !int.is_empty()
        && !frac.is_empty()
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
}

#[must_use]
pub fn is_boolean(s: &str) -> bool {
    s.eq_ignore_ascii_case("TRUE") || s.eq_ignore_ascii_case("FALSE")
}

/// Simplified BCP 47: an alphabetic primary subtag, then alphanumeric
/// subtags, each 1 to 8 characters, separated by `-`.
#[must_use]
pub fn is_language_tag(s: &str) -> bool {
    let mut subtags = s.split('-');
    let valid = |t: &str, first: bool| {
        (1..=8).contains(&t.len())
            && t.chars().all(|c| {
                if first {
                    c.is_ascii_alphabetic()
                } else {
                    c.is_ascii_alphanumeric()
                }
            })
    };
    subtags.next().is_some_and(|t| valid(t, true)) && subtags.all(|t| valid(t, false))
}

/// `Z`, `±HH`, `±HHMM` or `±HH:MM`.
#[must_use]
pub fn is_utc_offset(s: &str) -> bool {
    if s == "Z" {
        return true;
    }
    let Some(body) = s.strip_prefix(['+', '-']) else {
        return false;
    };
    let body = body.replacen(':', "", 1);
    if !body.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let (hours, minutes) = match body.len() {
        2 => (&body[..], "00"),
        4 => body.split_at(2),
        _ => return false,
    };
    all_digits(hours, 2)
        && all_digits(minutes, 2)
        && number(hours).is_some_and(|h| h <= 23)
        && number(minutes).is_some_and(|m| m <= 59)
}

fn valid_ymd(year: &str, month: &str, day: &str) -> bool {
    let (Some(y), Some(m), Some(d)) = (number(year), number(month), number(day)) else {
        return false;
    };
    i32::try_from(y)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, m, d))
        .is_some()
}

fn valid_month(month: &str) -> bool {
    all_digits(month, 2) && number(month).is_some_and(|m| (1..=12).contains(&m))
}

/// Dates without truncation: `YYYYMMDD`, `YYYY-MM-DD`, `--MMDD`, `---DD`.
fn is_full_date(s: &str) -> bool {
    if let Some(day) = s.strip_prefix("---") {
        return all_digits(day, 2) && number(day).is_some_and(|d| (1..=31).contains(&d));
    }
    if let Some(md) = s.strip_prefix("--") {
        return all_digits(md, 4) && valid_ymd(&ANY_LEAP_YEAR.to_string(), &md[..2], &md[2..]);
    }
    if all_digits(s, 8) {
        return valid_ymd(&s[..4], &s[4..6], &s[6..]);
    }
    s.len() == 10
        && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        && all_digits(&s[..4], 4)
}

/// RFC 6350 `date`: full dates plus the reduced forms `YYYY`, `YYYY-MM` and
/// `--MM`.
#[must_use]
pub fn is_date(s: &str) -> bool {
    if is_full_date(s) || all_digits(s, 4) {
        return true;
    }
    if let Some(month) = s.strip_prefix("--") {
        return valid_month(month);
    }
    match s.split_once('-') {
        Some((year, month)) => all_digits(year, 4) && valid_month(month),
        None => false,
    }
}

/// Splits a trailing zone designator off a time body.
fn split_zone(s: &str) -> Option<(&str, Option<&str>)> {
    if let Some(body) = s.strip_suffix('Z') {
        return Some((body, None));
    }
    let lead = s.len() - s.trim_start_matches('-').len();
    match s[lead..].find(['+', '-']) {
        Some(pos) => {
            let (body, zone) = s.split_at(lead + pos);
            is_utc_offset(zone).then_some((body, Some(zone)))
        }
        None => Some((s, None)),
    }
}

/// Checks `hour[minute[second]]`, optionally truncated with leading `-`.
/// `truncate` allows the `-MM[SS]` and `--SS` forms.
fn is_time_body(body: &str, truncate: bool) -> bool {
    let lead = body.len() - body.trim_start_matches('-').len();
    let digits = body[lead..].replace(':', "");
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let limits: &[u32] = match (lead, truncate) {
        (0, _) => &[23, 59, 60],
        (1, true) => &[59, 60],
        (2, true) => &[60],
        _ => return false,
    };
    let fields = digits.len() / 2;
    if digits.len() % 2 != 0 || fields == 0 || fields > limits.len() {
        return false;
    }

    (0..fields).all(|i| number(&digits[i * 2..i * 2 + 2]).is_some_and(|v| v <= limits[i]))
}

/// RFC 6350 `time`: `HH[MM[SS]][zone]`, `-MM[SS][zone]`, `--SS[zone]`, or
/// the extended `HH:MM[:SS]`.
#[must_use]
pub fn is_time(s: &str) -> bool {
    split_zone(s).is_some_and(|(body, _)| is_time_body(body, true))
}

/// `date-noreduc "T" time-notrunc`.
#[must_use]
pub fn is_date_time(s: &str) -> bool {
    let Some((date, time)) = s.split_once('T') else {
        return false;
    };
    is_full_date(date) && split_zone(time).is_some_and(|(body, _)| is_time_body(body, false))
}

/// A date-time, a date, or `T` followed by a time.
#[must_use]
pub fn is_date_and_or_time(s: &str) -> bool {
    match s.strip_prefix('T') {
        Some(time) => is_time(time),
        None => is_date_time(s) || is_date(s),
    }
}

/// Complete date and time to the second: `YYYYMMDDTHHMMSS[zone]` or
/// `YYYY-MM-DDTHH:MM:SS[zone]`.
#[must_use]
pub fn is_timestamp(s: &str) -> bool {
    let Some((date, time)) = s.split_once('T') else {
        return false;
    };
    let date_ok = if all_digits(date, 8) {
        valid_ymd(&date[..4], &date[4..6], &date[6..])
    } else {
        date.len() == 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
    };
    let time_ok = split_zone(time).is_some_and(|(body, _)| {
        NaiveTime::parse_from_str(body, "%H%M%S").is_ok()
            || NaiveTime::parse_from_str(body, "%H:%M:%S").is_ok()
    });
    date_ok && time_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uris() {
        assert!(is_uri("http://example.com"));
        assert!(is_uri("tel:+1-555-1234"));
        assert!(is_uri("geo:37.386013,-122.082932"));
        assert!(is_uri("urn:uuid:f81d4fae"));
        assert!(!is_uri("example.com"));
        assert!(!is_uri("1http://x"));
        assert!(!is_uri("mailto:"));
        assert!(!is_uri("é:x"));
        assert!(is_uri("http://пример.рф"));
    }

    #[test]
    fn numbers() {
        assert!(is_integer("42"));
        assert!(is_integer("-7"));
        assert!(!is_integer("4.2"));
        assert!(!is_integer(""));
        assert!(is_float("37.386013"));
        assert!(is_float("-122"));
        assert!(!is_float("1e5"));
        assert!(!is_float("abc"));
        assert!(!is_float("1."));
        assert!(!is_float("1.é"));
        assert!(!is_integer("٤٢"));
    }

    #[test]
    fn booleans_and_languages() {
        assert!(is_boolean("true"));
        assert!(is_boolean("FALSE"));
        assert!(!is_boolean("yes"));
        assert!(is_language_tag("en"));
        assert!(is_language_tag("fr-CA"));
        assert!(is_language_tag("zh-Hant-TW"));
        assert!(!is_language_tag("en_US"));
        assert!(!is_language_tag("1en"));
        assert!(!is_language_tag("été"));
        assert!(!is_boolean("trué"));
    }

    #[test]
    fn utc_offsets() {
        assert!(is_utc_offset("Z"));
        assert!(is_utc_offset("-05"));
        assert!(is_utc_offset("+0530"));
        assert!(is_utc_offset("-05:00"));
        assert!(!is_utc_offset("0500"));
        assert!(!is_utc_offset("+2500"));
        assert!(!is_utc_offset("+aé1"));
        assert!(!is_utc_offset("-é"));
        assert!(!is_utc_offset("+05:é"));
    }

    #[test]
    fn dates() {
        assert!(is_date("19850412"));
        assert!(is_date("1985-04-12"));
        assert!(is_date("1985-04"));
        assert!(is_date("1985"));
        assert!(is_date("--0412"));
        assert!(is_date("--0229"));
        assert!(is_date("--04"));
        assert!(is_date("---12"));
        assert!(!is_date("19850230"));
        assert!(!is_date("1985-13"));
        assert!(!is_date("85"));
        assert!(!is_date("--é4"));
        assert!(!is_date("1985-é"));
        assert!(!is_date("ééé"));
    }

    #[test]
    fn times() {
        assert!(is_time("102200"));
        assert!(is_time("1022"));
        assert!(is_time("10"));
        assert!(is_time("-2200"));
        assert!(is_time("--00"));
        assert!(is_time("102200Z"));
        assert!(is_time("102200-0800"));
        assert!(is_time("10:22:00"));
        assert!(!is_time("252200"));
        assert!(!is_time("10220"));
        assert!(!is_time("10é2"));
        assert!(!is_time("102200+aé1"));
    }

    #[test]
    fn date_times() {
        assert!(is_date_time("19961022T140000"));
        assert!(is_date_time("--1022T1400Z"));
        assert!(is_date_time("---22T14"));
        assert!(!is_date_time("1996-10T14"));
        assert!(!is_date_time("19961022T-00"));
        assert!(is_date_and_or_time("19961022T140000"));
        assert!(is_date_and_or_time("1996-10"));
        assert!(is_date_and_or_time("T102200Z"));
        assert!(!is_date_and_or_time("garbage"));
        assert!(!is_date_time("19961022T140000+aé1"));
        assert!(!is_date_time("1996é022T14"));
        assert!(!is_date_and_or_time("Té"));
    }

    #[test]
    fn timestamps() {
        assert!(is_timestamp("19961022T140000"));
        assert!(is_timestamp("19961022T140000Z"));
        assert!(is_timestamp("1995-10-31T22:27:10Z"));
        assert!(is_timestamp("19961022T140000-05"));
        assert!(!is_timestamp("19961022"));
        assert!(!is_timestamp("19961022T1400"));
        assert!(!is_timestamp("19961022T140000+aé1"));
        assert!(!is_timestamp("1996-10-3éT22:27:10Z"));
    }
}
