//! vCard property types.

use rolodex_core::config::ParserConfig;

use super::parameter::{VCardParameter, find_param};
use super::value::VCardValue;
use super::version::VCardVersion;
use crate::error::{RfcError, RfcResult};
use crate::rfc::vcard::codec::{self, TransferEncoding};
use crate::rfc::vcard::parse::ContentLine;
use crate::rfc::vcard::validate::{self, rules};

/// A vCard property.
///
/// Once constructed, a property has passed validation for its name and
/// version, and any transfer-encoded payload has been decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCardProperty {
    /// Optional property group (e.g., "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance, repeated keys merged.
    pub params: Vec<VCardParameter>,
    /// Value fields in order.
    pub values: Vec<VCardValue>,
    /// Version the property was validated under.
    pub version: VCardVersion,
    /// Transfer decoding succeeded for every value. When false no value was
    /// decoded and the serializer emits them all without re-encoding.
    pub decoded: bool,
    /// Values hold unescaped text. When false the serializer emits them verbatim.
    pub unescaped: bool,
}

/// Switches applied while constructing a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructOptions {
    pub validate: bool,
    pub decode: bool,
    pub warn_decode_failures: bool,
}

impl Default for ConstructOptions {
    fn default() -> Self {
        Self::from_config(&ParserConfig::default())
    }
}

impl ConstructOptions {
    #[must_use]
    pub const fn from_config(config: &ParserConfig) -> Self {
        Self {
            validate: config.validate,
            decode: true,
            warn_decode_failures: config.warn_decode_failures,
        }
    }

    /// Returns a copy that leaves transfer-encoded payloads untouched.
    #[must_use]
    pub const fn without_decode(mut self) -> Self {
        self.decode = false;
        self
    }
}

impl VCardProperty {
    /// ## Summary
    /// Builds a property from a parsed content line.
    ///
    /// Strips a trailing `.` from the group, rejoins value fields that the
    /// property's rule keeps whole (URIs, 2.1 notes), validates when enabled,
    /// then decodes quoted-printable or base64 payloads when requested.
    ///
    /// ## Errors
    /// Returns [`RfcError::Validation`] carrying the property when it breaks a
    /// rule for its name and version.
    pub fn construct(
        line: ContentLine,
        version: VCardVersion,
        options: &ConstructOptions,
    ) -> RfcResult<Self> {
        let ContentLine {
            group,
            name,
            params,
            values,
        } = line;
        let name = name.to_ascii_uppercase();
        let values = rules::join_policy(&name, version).apply(values, version, &params);

        Self {
            group: normalize_group(group),
            name,
            params,
            values: values.into_iter().map(VCardValue::Text).collect(),
            version,
            decoded: true,
            unescaped: true,
        }
        .finish(options)
    }

    /// ## Summary
    /// Builds a property from values that are already decoded and unescaped.
    ///
    /// ## Errors
    /// Returns [`RfcError::Validation`] when validation is enabled and fails.
    pub fn from_values(
        group: Option<String>,
        name: &str,
        params: Vec<VCardParameter>,
        values: Vec<VCardValue>,
        version: VCardVersion,
        options: &ConstructOptions,
    ) -> RfcResult<Self> {
        Self {
            group: normalize_group(group),
            name: name.to_ascii_uppercase(),
            params,
            values,
            version,
            decoded: true,
            unescaped: true,
        }
        .finish(&options.without_decode())
    }

    /// ## Summary
    /// Builds a property whose values are already in wire form. They are
    /// emitted verbatim: neither escaped nor transfer-encoded.
    ///
    /// ## Errors
    /// Returns [`RfcError::Validation`] when validation is enabled and fails.
    pub fn from_raw(
        group: Option<String>,
        name: &str,
        params: Vec<VCardParameter>,
        values: Vec<String>,
        version: VCardVersion,
        options: &ConstructOptions,
    ) -> RfcResult<Self> {
        Self {
            group: normalize_group(group),
            name: name.to_ascii_uppercase(),
            params,
            values: values.into_iter().map(VCardValue::Text).collect(),
            version,
            decoded: false,
            unescaped: false,
        }
        .finish(&options.without_decode())
    }

    fn finish(mut self, options: &ConstructOptions) -> RfcResult<Self> {
        if options.validate
            && let Err(message) = validate::check(&self)
        {
            return Err(RfcError::Validation {
                message,
                property: Box::new(self),
            });
        }

        if !rules::is_defined(&self.name, self.version) {
            tracing::warn!(
                property = %self.name,
                version = %self.version,
                "Property is not defined in this vCard version"
            );
        }

        if options.decode {
            codec::decode_property(&mut self, options.warn_decode_failures);
        }

        Ok(self)
    }

    /// Returns the parameter with the given name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&VCardParameter> {
        find_param(&self.params, name)
    }

    /// Returns the comma-joined value of a parameter.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<String> {
        self.param(name).and_then(VCardParameter::value)
    }

    /// Returns the declared VALUE type, if any.
    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.param("VALUE").and_then(VCardParameter::first)
    }

    /// Returns the TYPE values, comma-joined legacy values split apart.
    #[must_use]
    pub fn type_values(&self) -> Vec<&str> {
        self.param("TYPE")
            .map(|p| p.split_values().collect())
            .unwrap_or_default()
    }

    /// Returns whether this property has the specified TYPE value.
    #[must_use]
    pub fn has_type(&self, type_value: &str) -> bool {
        self.param("TYPE").is_some_and(|p| p.has_value(type_value))
    }

    /// Returns the transfer encoding declared by `ENCODING` or a 2.1 bare token.
    #[must_use]
    pub fn encoding(&self) -> Option<TransferEncoding> {
        TransferEncoding::from_params(&self.params)
    }

    /// Returns the CHARSET label, if declared.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.param("CHARSET").and_then(VCardParameter::first)
    }

    /// Returns the first value as text.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.values.first().and_then(VCardValue::as_text)
    }

    /// Returns every value field in textual form, joined by `;`.
    #[must_use]
    pub fn joined_values(&self) -> String {
        self.values
            .iter()
            .map(VCardValue::to_text)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Returns whether the property name matches (case-insensitive).
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

fn normalize_group(group: Option<String>) -> Option<String> {
    group
        .map(|g| g.strip_suffix('.').map(str::to_string).unwrap_or(g))
        .filter(|g| !g.is_empty())
}

/// Common property names as constants.
pub mod names {
    pub const VERSION: &str = "VERSION";
    pub const FN: &str = "FN";
    pub const N: &str = "N";
    pub const TEL: &str = "TEL";
    pub const EMAIL: &str = "EMAIL";
    pub const ADR: &str = "ADR";
    pub const GEO: &str = "GEO";
    pub const PHOTO: &str = "PHOTO";
    pub const LOGO: &str = "LOGO";
    pub const SOUND: &str = "SOUND";
    pub const KEY: &str = "KEY";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, values: &[&str], params: Vec<VCardParameter>) -> ContentLine {
        ContentLine {
            group: None,
            name: name.to_string(),
            params,
            values: values.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    #[test]
    fn construct_text_property() {
        let prop = VCardProperty::construct(
            line("fn", &["John Smith"], Vec::new()),
            VCardVersion::V3,
            &ConstructOptions::default(),
        )
        .unwrap();

        assert_eq!(prop.name, "FN");
        assert_eq!(prop.first_text(), Some("John Smith"));
        assert!(prop.decoded);
        assert!(prop.unescaped);
    }

    #[test]
    fn construct_strips_group_dot() {
        let mut content = line("TEL", &["12345"], Vec::new());
        content.group = Some("item1.".to_string());
        let prop =
            VCardProperty::construct(content, VCardVersion::V4, &ConstructOptions::default())
                .unwrap();
        assert_eq!(prop.group.as_deref(), Some("item1"));
    }

    #[test]
    fn construct_rejects_short_structured_name() {
        let err = VCardProperty::construct(
            line("N", &["Smith", "John"], Vec::new()),
            VCardVersion::V4,
            &ConstructOptions::default(),
        )
        .unwrap_err();

        let prop = err.property().unwrap();
        assert_eq!(prop.name, "N");
        assert_eq!(prop.values.len(), 2);
    }

    #[test]
    fn construct_skips_validation_when_disabled() {
        let options = ConstructOptions::from_config(&ParserConfig::default().without_validation());
        let prop = VCardProperty::construct(
            line("N", &["Smith"], Vec::new()),
            VCardVersion::V4,
            &options,
        )
        .unwrap();
        assert_eq!(prop.values.len(), 1);
    }

    #[test]
    fn construct_joins_uri_values() {
        let prop = VCardProperty::construct(
            line("URL", &["http://example.com/a", "b"], Vec::new()),
            VCardVersion::V3,
            &ConstructOptions::default(),
        )
        .unwrap();
        assert_eq!(prop.values, vec![VCardValue::from("http://example.com/a;b")]);
    }

    #[test]
    fn construct_decodes_base64() {
        let prop = VCardProperty::construct(
            line("PHOTO", &["aGVsbG8="], vec![VCardParameter::encoding("b")]),
            VCardVersion::V3,
            &ConstructOptions::default(),
        )
        .unwrap();
        assert_eq!(prop.values, vec![VCardValue::Binary(b"hello".to_vec())]);
        assert_eq!(prop.encoding(), Some(TransferEncoding::Base64));
    }

    #[test]
    fn raw_property_is_not_escaped() {
        let prop = VCardProperty::from_raw(
            None,
            "note",
            Vec::new(),
            vec!["already\\, escaped".to_string()],
            VCardVersion::V4,
            &ConstructOptions::default(),
        )
        .unwrap();
        assert!(!prop.unescaped);
        assert!(!prop.decoded);
        assert_eq!(prop.name, "NOTE");
    }

    #[test]
    fn type_values_split_legacy_commas() {
        let prop = VCardProperty::from_values(
            None,
            "TEL",
            vec![VCardParameter::type_param("home,voice")],
            vec![VCardValue::from("12345")],
            VCardVersion::V3,
            &ConstructOptions::default(),
        )
        .unwrap();
        assert_eq!(prop.type_values(), vec!["home", "voice"]);
        assert!(prop.has_type("VOICE"));
    }
}
