//! Property validation.
//!
//! Every property is checked against the global parameter rules and then
//! against the rule its name and version select from [`rules`].

pub mod params;
pub mod rules;
pub mod shape;

use rules::{EncodingRule, PropertyRule, Shape, ValueType};

use crate::error::{RfcError, RfcResult};
use crate::rfc::vcard::codec::TransferEncoding;
use crate::rfc::vcard::core::{VCard, VCardProperty, VCardValue};

/// Checks a property, returning a message for the first violation.
pub(crate) fn check(property: &VCardProperty) -> Result<(), String> {
    for param in &property.params {
        params::check_param(param, property.version)?;
    }

    let Some(rule) = rules::lookup(&property.name, property.version) else {
        return Ok(());
    };

    check_arity(property, rule)?;
    let declared = check_value_param(property, rule)?;
    check_types(property, rule)?;
    check_encoding(property, rule)?;

    if property.values.iter().any(VCardValue::is_binary) {
        return Ok(());
    }
    check_shape(property, rule, declared)
}

/// ## Summary
/// Validates a property against the rules of its version.
///
/// ## Errors
/// Returns [`RfcError::Validation`] carrying a copy of the property.
pub fn validate(property: &VCardProperty) -> RfcResult<()> {
    check(property).map_err(|message| RfcError::Validation {
        message,
        property: Box::new(property.clone()),
    })
}

/// ## Summary
/// Validates every property of a document.
///
/// ## Errors
/// Returns the first [`RfcError::Validation`] found.
pub fn validate_card(card: &VCard) -> RfcResult<()> {
    card.iter().try_for_each(validate)
}

fn check_arity(property: &VCardProperty, rule: &PropertyRule) -> Result<(), String> {
    let count = property.values.len();
    if count >= rule.min && rule.max.is_none_or(|max| count <= max) {
        return Ok(());
    }
    let expected = match rule.max {
        Some(max) if max == rule.min => max.to_string(),
        Some(max) => format!("{}..={max}", rule.min),
        None => format!("at least {}", rule.min),
    };
    Err(format!(
        "{} takes {expected} value(s), found {count}",
        property.name
    ))
}

/// What the `VALUE` parameter declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Declared {
    None,
    /// `text` or an `x-` extension type: no shape to check.
    Opaque,
    Type(ValueType),
}

fn check_value_param(property: &VCardProperty, rule: &PropertyRule) -> Result<Declared, String> {
    let Some(raw) = property.value_type() else {
        return Ok(Declared::None);
    };

    if raw.trim().to_ascii_lowercase().starts_with("x-") {
        return Ok(Declared::Opaque);
    }
    match ValueType::parse(raw) {
        Some(ValueType::Text) if rule.text_allowed => Ok(Declared::Opaque),
        Some(t) if rule.value_types.contains(&t) => Ok(Declared::Type(t)),
        _ => Err(format!("VALUE={raw} is not allowed for {}", property.name)),
    }
}

fn check_types(property: &VCardProperty, rule: &PropertyRule) -> Result<(), String> {
    let Some(vocab) = rule.type_vocab else {
        return Ok(());
    };
    for value in property.type_values() {
        let lower = value.to_ascii_lowercase();
        if !lower.starts_with("x-") && !vocab.contains(&lower.as_str()) {
            return Err(format!("{} TYPE {value} is unknown", property.name));
        }
    }
    Ok(())
}

fn check_encoding(property: &VCardProperty, rule: &PropertyRule) -> Result<(), String> {
    let declared = property.param("ENCODING");
    match rule.encoding {
        EncodingRule::Any => Ok(()),
        EncodingRule::Binary => {
            let ok = match declared {
                Some(_) => property.encoding() == Some(TransferEncoding::Base64),
                None => property.encoding() != Some(TransferEncoding::QuotedPrintable),
            };
            if ok {
                Ok(())
            } else {
                Err(format!("{} ENCODING must be b or base64", property.name))
            }
        }
        EncodingRule::Forbidden => match declared {
            Some(_) => Err(format!(
                "{} must not carry ENCODING in {}",
                property.name, property.version
            )),
            None => Ok(()),
        },
    }
}

fn check_shape(property: &VCardProperty, rule: &PropertyRule, declared: Declared) -> Result<(), String> {
    let texts = property
        .values
        .iter()
        .filter_map(VCardValue::as_text)
        .collect::<Vec<_>>();
    let each = |t: &[ValueType]| -> Result<(), String> {
        for value in texts.iter().filter(|v| !v.is_empty()) {
            if !t.iter().any(|t| t.matches(value)) {
                let names = t.iter().map(|t| t.as_str()).collect::<Vec<_>>().join("/");
                return Err(format!("{} value {value:?} is not a valid {names}", property.name));
            }
        }
        Ok(())
    };

    match rule.shape {
        Shape::Free => Ok(()),
        Shape::Each(types) => match declared {
            Declared::Opaque => Ok(()),
            Declared::Type(t) => each(&[t]),
            Declared::None => each(types),
        },
        Shape::ByValueParam { default } => match (declared, default) {
            (Declared::Type(t), _) | (Declared::None, Some(t)) => each(&[t]),
            _ => Ok(()),
        },
        Shape::Gender => {
            let sex = texts.first().copied().unwrap_or_default();
            let valid = sex.chars().count() <= 1
                && sex.chars().all(|c| "MFONU".contains(c.to_ascii_uppercase()));
            if valid {
                Ok(())
            } else {
                Err(format!("GENDER sex {sex:?} must be one of M, F, O, N, U"))
            }
        }
        Shape::ClientPidMap => {
            let id_ok = texts
                .first()
                .is_some_and(|v| shape::is_integer(v) && !v.starts_with('-'));
            let uri_ok = texts.get(1).is_some_and(|v| shape::is_uri(v));
            if id_ok && uri_ok {
                Ok(())
            } else {
                Err("CLIENTPIDMAP must be an integer and a URI".to_string())
            }
        }
        Shape::Profile => {
            if texts.first().is_some_and(|v| v.eq_ignore_ascii_case("VCARD")) {
                Ok(())
            } else {
                Err("PROFILE value must be VCARD".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::vcard::core::{ConstructOptions, VCardParameter, VCardVersion};

    fn prop(
        name: &str,
        params: Vec<VCardParameter>,
        values: &[&str],
        version: VCardVersion,
    ) -> VCardProperty {
        let options = ConstructOptions {
            validate: false,
            decode: false,
            warn_decode_failures: false,
        };
        VCardProperty::from_values(
            None,
            name,
            params,
            values.iter().map(|v| VCardValue::from(*v)).collect(),
            version,
            &options,
        )
        .unwrap()
    }

    fn ok(name: &str, params: Vec<VCardParameter>, values: &[&str], version: VCardVersion) -> bool {
        check(&prop(name, params, values, version)).is_ok()
    }

    use VCardVersion::{V2_1, V3, V4};

    #[test]
    fn structured_cardinality() {
        assert!(ok("N", vec![], &["Smith", "John", "", "", ""], V4));
        assert!(!ok("N", vec![], &["Smith", "John"], V4));
        assert!(ok("ADR", vec![], &["", "", "1 Main", "Town", "", "12345", "US"], V3));
        assert!(!ok("ADR", vec![], &["1 Main"], V3));
        assert!(!ok("FN", vec![], &["a", "b"], V4));
    }

    #[test]
    fn geo_by_version() {
        assert!(ok("GEO", vec![], &["37.386013", "-122.082932"], V3));
        assert!(!ok("GEO", vec![], &["north", "-122.0"], V3));
        assert!(ok("GEO", vec![], &["geo:37.386013,-122.082932"], V4));
        assert!(!ok("GEO", vec![], &["37.386013", "-122.082932"], V4));
        assert!(!ok("GEO", vec![], &["37.386013"], V4));
    }

    #[test]
    fn tz_by_version() {
        assert!(ok("TZ", vec![], &["-05:00"], V3));
        assert!(!ok("TZ", vec![], &["America/New_York"], V3));
        assert!(ok("TZ", vec![VCardParameter::value_type("text")], &["America/New_York"], V3));
        assert!(ok("TZ", vec![], &["America/New_York"], V4));
        assert!(ok("TZ", vec![VCardParameter::value_type("utc-offset")], &["-0500"], V4));
        assert!(!ok("TZ", vec![VCardParameter::value_type("utc-offset")], &["EST"], V4));
    }

    #[test]
    fn multibyte_zones_are_rejected() {
        assert!(!ok("TZ", vec![], &["+aé1"], V3));
        assert!(!ok("TZ", vec![], &["-é"], V2_1));
        assert!(!ok("REV", vec![], &["19961022T140000+aé1"], V4));
        assert!(!ok("BDAY", vec![VCardParameter::value_type("date-time")], &["19961022T14+é"], V4));
    }

    #[test]
    fn impp_defined_from_v3() {
        assert!(ok("IMPP", vec![], &["xmpp:alice@example.com"], V3));
        assert!(!ok("IMPP", vec![], &["alice"], V3));
        assert!(rules::is_defined("IMPP", V3));
        assert!(!rules::is_defined("IMPP", V2_1));
    }

    #[test]
    fn media_encoding_by_version() {
        let b64 = || vec![VCardParameter::encoding("b")];
        assert!(ok("PHOTO", b64(), &["aGVsbG8="], V3));
        assert!(!ok("PHOTO", vec![VCardParameter::encoding("8bit")], &["x"], V3));
        assert!(ok("PHOTO", vec![VCardParameter::bare("BASE64")], &["aGVsbG8="], V2_1));
        assert!(!ok("PHOTO", b64(), &["aGVsbG8="], V4));
        assert!(ok("PHOTO", vec![], &["data:image/jpeg;base64,aGVsbG8="], V4));
        assert!(!ok("PHOTO", vec![], &["not a uri"], V4));
    }

    #[test]
    fn value_param_must_be_allowed() {
        assert!(ok("PHOTO", vec![VCardParameter::value_type("uri")], &["http://x/p.jpg"], V3));
        assert!(!ok("PHOTO", vec![VCardParameter::value_type("text")], &["x"], V3));
        assert!(!ok("LANG", vec![VCardParameter::value_type("text")], &["en"], V4));
        assert!(ok("LANG", vec![], &["en"], V4));
        assert!(!ok("LANG", vec![], &["not a tag"], V4));
        assert!(ok("FN", vec![VCardParameter::value_type("x-custom")], &["x"], V4));
    }

    #[test]
    fn type_vocabulary() {
        let tel = |t: &str, v| ok("TEL", vec![VCardParameter::type_param(t)], &["123"], v);
        assert!(tel("home,voice", V3));
        assert!(tel("x-satellite", V4));
        assert!(tel("cell", V4));
        assert!(!tel("bbs", V4));
        assert!(tel("bbs", V3));
        assert!(!tel("spaceship", V3));
        assert!(ok("EMAIL", vec![VCardParameter::type_param("INTERNET")], &["a@b.c"], V3));
        assert!(!ok("EMAIL", vec![VCardParameter::type_param("school")], &["a@b.c"], V4));
    }

    #[test]
    fn tel_uri_value() {
        let uri = || vec![VCardParameter::value_type("uri")];
        assert!(ok("TEL", uri(), &["tel:+1-555-555-5555;ext=5555"], V4));
        assert!(!ok("TEL", uri(), &["+1-555"], V4));
    }

    #[test]
    fn rev_timestamps() {
        assert!(ok("REV", vec![], &["1995-10-31T22:27:10Z"], V3));
        assert!(ok("REV", vec![], &["1995-10-31"], V3));
        assert!(ok("REV", vec![], &["19951031T222710Z"], V4));
        assert!(!ok("REV", vec![], &["1995-10-31"], V4));
    }

    #[test]
    fn bday_checked_only_with_value() {
        assert!(ok("BDAY", vec![], &["circa 1800"], V4));
        assert!(ok("BDAY", vec![VCardParameter::value_type("date")], &["19850412"], V4));
        assert!(!ok("BDAY", vec![VCardParameter::value_type("date")], &["circa 1800"], V4));
    }

    #[test]
    fn gender_clientpidmap_profile() {
        assert!(ok("GENDER", vec![], &["M"], V4));
        assert!(ok("GENDER", vec![], &["", "it's complicated"], V4));
        assert!(!ok("GENDER", vec![], &["Male"], V4));
        assert!(!ok("GENDER", vec![], &["X"], V4));
        assert!(ok("CLIENTPIDMAP", vec![], &["1", "urn:uuid:3df403f4"], V4));
        assert!(!ok("CLIENTPIDMAP", vec![], &["one", "urn:uuid:3df403f4"], V4));
        assert!(ok("PROFILE", vec![], &["VCARD"], V3));
        assert!(!ok("PROFILE", vec![], &["VCALENDAR"], V3));
    }

    #[test]
    fn global_params_apply_to_extensions() {
        assert!(ok("X-FOO", vec![VCardParameter::pref(1)], &["x"], V4));
        assert!(!ok("X-FOO", vec![VCardParameter::new("PREF", "500")], &["x"], V4));
        assert!(!ok("X-FOO", vec![VCardParameter::bare("HOME")], &["x"], V4));
    }

    #[test]
    fn binary_values_skip_shape() {
        let mut photo = prop("PHOTO", vec![VCardParameter::encoding("b")], &["x"], V3);
        photo.values = vec![VCardValue::Binary(vec![1, 2, 3])];
        assert!(check(&photo).is_ok());
    }

    #[test]
    fn validate_wraps_property() {
        let bad = prop("N", vec![], &["Smith"], V4);
        let err = validate(&bad).unwrap_err();
        assert_eq!(err.property().map(|p| p.name.as_str()), Some("N"));
        assert!(err.to_string().contains("N takes 5 value(s), found 1"));
    }
}
