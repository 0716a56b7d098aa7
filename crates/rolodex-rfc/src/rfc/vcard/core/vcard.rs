//! vCard document type.

use super::property::{VCardProperty, names};
use super::structured::{ContactData, StructuredName};
use super::version::VCardVersion;
use crate::error::RfcResult;
use crate::rfc::vcard::index::{self, IndexerId, SearchKind};
use crate::rfc::vcard::parse::{ParseError, ParseErrorKind};

/// A vCard document.
///
/// Holds its properties in input order, VERSION included. Documents produced
/// by the parser, builder, or migrator always carry exactly one VERSION.
#[derive(Debug, Clone)]
pub struct VCard {
    properties: Vec<VCardProperty>,
    version: VCardVersion,
    indexer: Option<IndexerId>,
}

impl PartialEq for VCard {
    /// Structural equality: version and properties in order. The indexer
    /// handle is not part of a document's content.
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.properties == other.properties
    }
}

impl Eq for VCard {}

impl VCard {
    /// ## Summary
    /// Creates a document from constructed properties, taking the version from
    /// its VERSION property.
    ///
    /// ## Errors
    /// Returns a format error if there is no VERSION property or its value is
    /// not a supported version.
    pub fn from_properties(properties: Vec<VCardProperty>) -> RfcResult<Self> {
        let version_prop = properties
            .iter()
            .find(|p| p.is(names::VERSION))
            .ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::MissingVersion,
                    0,
                    "vCard has no VERSION property",
                )
            })?;
        let raw = version_prop.first_text().unwrap_or_default();
        let version = VCardVersion::parse(raw).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::UnsupportedVersion,
                0,
                format!("unsupported vCard version: {raw}"),
            )
        })?;

        Ok(Self::from_parts(properties, version))
    }

    pub(crate) fn from_parts(properties: Vec<VCardProperty>, version: VCardVersion) -> Self {
        Self {
            properties,
            version,
            indexer: None,
        }
    }

    #[must_use]
    pub fn properties(&self) -> &[VCardProperty] {
        &self.properties
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VCardProperty> {
        self.properties.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    #[must_use]
    pub const fn version(&self) -> VCardVersion {
        self.version
    }

    /// Returns the handle of the indexer that catalogued this document.
    #[must_use]
    pub const fn indexer(&self) -> Option<IndexerId> {
        self.indexer
    }

    pub(crate) const fn set_indexer(&mut self, indexer: Option<IndexerId>) {
        self.indexer = indexer;
    }

    /// Returns the first property with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VCardProperty> {
        self.properties.iter().find(|p| p.is(name))
    }

    /// Returns every property with the given name, in order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&VCardProperty> {
        self.properties.iter().filter(|p| p.is(name)).collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the formatted name (first FN).
    #[must_use]
    pub fn contact_name(&self) -> Option<String> {
        self.get(names::FN)
            .and_then(|p| p.values.first())
            .map(|v| v.to_text().into_owned())
    }

    /// Returns the structured name (first N).
    #[must_use]
    pub fn contact_structname(&self) -> Option<StructuredName> {
        self.get(names::N)
            .map(|p| StructuredName::from_values(&p.values))
    }

    /// Returns every telephone number, digits only.
    #[must_use]
    pub fn contact_number(&self) -> Vec<String> {
        self.properties
            .iter()
            .filter_map(index::phone_keys)
            .map(|(_, digits)| digits)
            .collect()
    }

    /// Returns the name, structured name, and phone numbers in one summary.
    #[must_use]
    pub fn contact_data(&self) -> ContactData {
        ContactData {
            name: self.contact_name(),
            struct_name: self.contact_structname(),
            numbers: self.contact_number(),
        }
    }

    /// Returns the keys an indexer would catalogue this document under for `kind`.
    #[must_use]
    pub fn search_keys(&self, kind: &SearchKind) -> Vec<String> {
        match kind {
            SearchKind::Name => self.properties.iter().filter_map(index::name_key).collect(),
            SearchKind::Phone => self
                .properties
                .iter()
                .filter_map(index::phone_keys)
                .flat_map(|(raw, digits)| [raw, digits])
                .collect(),
            SearchKind::Group => self
                .properties
                .iter()
                .filter_map(|p| p.group.clone())
                .collect(),
            SearchKind::Property(name) => self
                .properties
                .iter()
                .filter(|p| name.as_deref().is_none_or(|n| p.is(n)))
                .map(VCardProperty::joined_values)
                .collect(),
        }
    }

    /// Returns whether a formatted or structured name matches `query`.
    #[must_use]
    pub fn find_by_name(&self, query: &str, case: bool, fullmatch: bool) -> bool {
        self.search_keys(&SearchKind::Name)
            .iter()
            .any(|key| index::text_matches(key, query, case, fullmatch))
    }

    /// Returns whether any property group matches `query`.
    #[must_use]
    pub fn find_by_group(&self, query: &str, case: bool, fullmatch: bool) -> bool {
        self.properties
            .iter()
            .filter_map(|p| p.group.as_deref())
            .any(|group| index::text_matches(group, query, case, fullmatch))
    }

    /// Returns whether a telephone number equals or contains `number`.
    /// Both the written and the digits-only spelling are compared; with
    /// `parsestr`, only digits are.
    #[must_use]
    pub fn find_by_phone(&self, number: &str, fullmatch: bool, parsestr: bool) -> bool {
        self.phones(parsestr).any(|phone| {
            if fullmatch {
                phone == number
            } else {
                phone.contains(number)
            }
        })
    }

    #[must_use]
    pub fn find_by_phone_startswith(&self, number: &str, parsestr: bool) -> bool {
        self.phones(parsestr).any(|phone| phone.starts_with(number))
    }

    #[must_use]
    pub fn find_by_phone_endswith(&self, number: &str, parsestr: bool) -> bool {
        self.phones(parsestr).any(|phone| phone.ends_with(number))
    }

    /// Returns whether a property named `name` has `value` as its joined value.
    #[must_use]
    pub fn find_by_property(&self, name: &str, value: &str, fullmatch: bool) -> bool {
        self.search_keys(&SearchKind::Property(Some(name.to_string())))
            .iter()
            .any(|key| index::value_matches(key, value, fullmatch))
    }

    /// Returns whether any property has `value` as its joined value.
    #[must_use]
    pub fn find_by_value(&self, value: &str, fullmatch: bool) -> bool {
        self.search_keys(&SearchKind::Property(None))
            .iter()
            .any(|key| index::value_matches(key, value, fullmatch))
    }

    /// Phone keys as the indexer stores them, digits only with `parsestr`.
    fn phones(&self, parsestr: bool) -> impl Iterator<Item = String> {
        self.search_keys(&SearchKind::Phone)
            .into_iter()
            .map(move |key| if parsestr { index::normalize_phone(&key) } else { key })
    }
}

impl<'a> IntoIterator for &'a VCard {
    type Item = &'a VCardProperty;
    type IntoIter = std::slice::Iter<'a, VCardProperty>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::vcard::core::{ConstructOptions, VCardValue};

    fn prop(name: &str, values: &[&str]) -> VCardProperty {
        VCardProperty::from_values(
            None,
            name,
            Vec::new(),
            values.iter().map(|v| VCardValue::from(*v)).collect(),
            VCardVersion::V3,
            &ConstructOptions::default(),
        )
        .unwrap()
    }

    fn sample() -> VCard {
        VCard::from_properties(vec![
            prop("VERSION", &["3.0"]),
            prop("FN", &["John Smith"]),
            prop("N", &["Smith", "John", "", "", ""]),
            prop("TEL", &["+7 (999) 123-45-67"]),
        ])
        .unwrap()
    }

    #[test]
    fn version_comes_from_property() {
        let card = sample();
        assert_eq!(card.version(), VCardVersion::V3);
        assert_eq!(card.len(), 4);
        assert!(card.indexer().is_none());
    }

    #[test]
    fn missing_version_is_format_error() {
        let err = VCard::from_properties(vec![prop("FN", &["Nobody"])]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::RfcError::Format(ParseError {
                kind: ParseErrorKind::MissingVersion,
                ..
            })
        ));
    }

    #[test]
    fn contact_summary() {
        let data = sample().contact_data();
        assert_eq!(data.name.as_deref(), Some("John Smith"));
        assert_eq!(data.struct_name.unwrap().given, "John");
        assert_eq!(data.numbers, vec!["79991234567"]);
    }

    #[test]
    fn scan_searches() {
        let card = sample();
        assert!(card.find_by_name("john smith", false, true));
        assert!(!card.find_by_name("john smith", true, true));
        assert!(card.find_by_name("Smi", true, false));
        assert!(card.find_by_name("Smith;John;;;", true, true));
        assert!(card.find_by_phone("79991234567", true, true));
        assert!(card.find_by_phone("123", false, true));
        assert!(card.find_by_phone("+7 (999) 123-45-67", true, false));
        assert!(card.find_by_phone_startswith("7999", true));
        assert!(card.find_by_phone_endswith("4567", true));
        assert!(card.find_by_property("fn", "John Smith", true));
        assert!(card.find_by_value("Smith;John", false));
        assert!(!card.find_by_group("item1", false, true));
    }

    #[test]
    fn get_is_case_insensitive() {
        let card = sample();
        assert!(card.contains("tel"));
        assert_eq!(card.get_all("VERSION").len(), 1);
        assert!(card.get("EMAIL").is_none());
    }
}
