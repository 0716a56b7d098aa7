//! Checks that apply to a parameter whatever property carries it.

use super::shape::{is_integer, is_language_tag};
use crate::rfc::vcard::core::{VCardParameter, VCardVersion};

const LEVELS: &[&str] = &["beginner", "average", "expert", "high", "medium", "low"];

/// `n[.n]` with decimal digits.
fn is_pid(value: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match value.split_once('.') {
        Some((source, local)) => digits(source) && digits(local),
        None => digits(value),
    }
}

fn is_pref(value: &str) -> bool {
    value
        .trim()
        .parse::<u8>()
        .is_ok_and(|p| (1..=100).contains(&p))
}

/// Checks one parameter. Returns a message describing the first violation.
pub(crate) fn check_param(param: &VCardParameter, version: VCardVersion) -> Result<(), String> {
    if param.is_bare() {
        if version.grammar().allows_bare_tokens() {
            return Ok(());
        }
        return Err(format!("parameter {} has no value", param.name));
    }

    let bad = |what: &str, value: &str| -> Result<(), String> {
        Err(format!("{} has invalid {what}: {value:?}", param.name))
    };

    match param.name.as_str() {
        "LANGUAGE" => {
            for v in &param.values {
                if !is_language_tag(v) {
                    return bad("language tag", v);
                }
            }
        }
        "PREF" => {
            for v in param.split_values() {
                if !is_pref(v) {
                    return bad("preference (1-100)", v);
                }
            }
        }
        "PID" => {
            for v in param.split_values() {
                if !is_pid(v) {
                    return bad("property id", v);
                }
            }
        }
        "SORT-AS" => {
            if param.values.iter().all(|v| v.trim().is_empty()) {
                return bad("sort key", "");
            }
        }
        "LEVEL" => {
            for v in &param.values {
                if !LEVELS.iter().any(|l| l.eq_ignore_ascii_case(v)) {
                    return bad("level", v);
                }
            }
        }
        "INDEX" => {
            for v in &param.values {
                if !is_integer(v) {
                    return bad("index", v);
                }
            }
        }
        _ => {}
    }

    Ok(())
}
