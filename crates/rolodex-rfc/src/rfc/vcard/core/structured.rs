//! Structured contact summaries.

use serde::Serialize;

use super::value::VCardValue;

/// Structured name (N property).
///
/// Components keep their raw text; list-valued components stay comma-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructuredName {
    /// Family names (surnames).
    pub family: String,
    /// Given names (first names).
    pub given: String,
    /// Additional names (middle names).
    pub additional: String,
    /// Honorific prefixes (e.g., "Mr.", "Dr.").
    pub prefixes: String,
    /// Honorific suffixes (e.g., "Jr.", "M.D.").
    pub suffixes: String,
}

impl StructuredName {
    /// Builds a structured name from N value fields. Missing trailing
    /// components are left empty.
    #[must_use]
    pub fn from_values(values: &[VCardValue]) -> Self {
        let field = |i: usize| {
            values
                .get(i)
                .map(|v| v.to_text().into_owned())
                .unwrap_or_default()
        };
        Self {
            family: field(0),
            given: field(1),
            additional: field(2),
            prefixes: field(3),
            suffixes: field(4),
        }
    }

    /// Returns whether every component is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.family.is_empty()
            && self.given.is_empty()
            && self.additional.is_empty()
            && self.prefixes.is_empty()
            && self.suffixes.is_empty()
    }

    /// Formats as a display name (given + family).
    #[must_use]
    pub fn display_name(&self) -> String {
        [self.given.as_str(), self.family.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The main data of a vCard, consumed by format converters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactData {
    /// Formatted name (FN).
    pub name: Option<String>,
    /// Structured name (N).
    pub struct_name: Option<StructuredName>,
    /// Telephone numbers, digits only.
    pub numbers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_name_from_values() {
        let values: Vec<VCardValue> = ["Public", "John", "Quinlan", "Mr.", "Esq."]
            .into_iter()
            .map(VCardValue::from)
            .collect();
        let name = StructuredName::from_values(&values);
        assert_eq!(name.family, "Public");
        assert_eq!(name.suffixes, "Esq.");
        assert_eq!(name.display_name(), "John Public");
    }

    #[test]
    fn structured_name_tolerates_short_values() {
        let name = StructuredName::from_values(&[VCardValue::from("Doe")]);
        assert_eq!(name.family, "Doe");
        assert!(name.given.is_empty());
        assert!(!name.is_empty());
        assert!(StructuredName::default().is_empty());
    }
}
