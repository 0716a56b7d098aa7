//! Step-by-step vCard construction.

use rolodex_core::config::ParserConfig;

use super::parameter::VCardParameter;
use super::property::{ConstructOptions, VCardProperty, names};
use super::value::VCardValue;
use super::vcard::VCard;
use super::version::VCardVersion;
use crate::error::{RfcError, RfcResult};

/// Number of components in a structured name.
const N_COMPONENTS: usize = 5;

/// Builds a [`VCard`] one property at a time.
///
/// A VERSION property is always the first property; every added property is
/// validated against the builder's version unless validation is disabled.
#[derive(Debug, Clone)]
pub struct VCardBuilder {
    version: VCardVersion,
    options: ConstructOptions,
    properties: Vec<VCardProperty>,
}

impl Default for VCardBuilder {
    fn default() -> Self {
        Self::new(VCardVersion::default(), &ParserConfig::default())
    }
}

impl VCardBuilder {
    #[must_use]
    pub fn new(version: VCardVersion, config: &ParserConfig) -> Self {
        let mut builder = Self {
            version,
            options: ConstructOptions::from_config(config),
            properties: Vec::new(),
        };
        builder.push_version();
        builder
    }

    fn push_version(&mut self) {
        self.properties.insert(0, version_property(self.version));
    }

    #[must_use]
    pub const fn version(&self) -> VCardVersion {
        self.version
    }

    /// ## Summary
    /// Adds a property from decoded values.
    ///
    /// ## Errors
    /// Returns [`RfcError::Validation`] if the property breaks its rule.
    pub fn add_property(
        &mut self,
        name: &str,
        values: Vec<VCardValue>,
        params: Vec<VCardParameter>,
        group: Option<&str>,
    ) -> RfcResult<&mut Self> {
        let property = VCardProperty::from_values(
            group.map(str::to_string),
            name,
            params,
            values,
            self.version,
            &self.options,
        )?;
        self.properties.push(property);
        Ok(self)
    }

    /// ## Summary
    /// Adds a property whose values are already escaped and encoded. They are
    /// serialized verbatim.
    ///
    /// ## Errors
    /// Returns [`RfcError::Validation`] if the property breaks its rule.
    pub fn add_raw_property(
        &mut self,
        name: &str,
        values: Vec<String>,
        params: Vec<VCardParameter>,
        group: Option<&str>,
    ) -> RfcResult<&mut Self> {
        let property = VCardProperty::from_raw(
            group.map(str::to_string),
            name,
            params,
            values,
            self.version,
            &self.options,
        )?;
        self.properties.push(property);
        Ok(self)
    }

    /// ## Summary
    /// Sets FN to `name` and N to its space-separated parts, in order, padded
    /// to five components. Parts beyond the fifth stay in the last component.
    ///
    /// ## Errors
    /// Returns [`RfcError::Builder`] if FN or N is already present.
    pub fn set_name(&mut self, name: &str) -> RfcResult<&mut Self> {
        if self
            .properties
            .iter()
            .any(|p| p.is(names::FN) || p.is(names::N))
        {
            return Err(RfcError::Builder(
                "FN and N are already set".to_string(),
            ));
        }

        let mut parts = name.splitn(N_COMPONENTS, ' ').map(VCardValue::from).collect::<Vec<_>>();
        parts.resize(N_COMPONENTS, VCardValue::Text(String::new()));

        self.add_property(names::FN, vec![VCardValue::from(name)], Vec::new(), None)?;
        self.add_property(names::N, parts, Vec::new(), None)
    }

    /// ## Summary
    /// Adds a TEL property.
    ///
    /// ## Errors
    /// Returns [`RfcError::Validation`] if the number is rejected.
    pub fn set_phone(&mut self, number: &str) -> RfcResult<&mut Self> {
        self.add_property(names::TEL, vec![VCardValue::from(number)], Vec::new(), None)
    }

    /// Switches the target version, replacing the VERSION property. Properties
    /// already added keep the version they were validated under.
    pub fn set_version(&mut self, version: VCardVersion) -> &mut Self {
        self.version = version;
        self.properties.retain(|p| !p.is(names::VERSION));
        self.push_version();
        self
    }

    /// ## Summary
    /// Returns the finished document.
    ///
    /// ## Errors
    /// Returns [`RfcError::Builder`] if nothing but VERSION was added.
    pub fn build(&self) -> RfcResult<VCard> {
        if self.properties.iter().all(|p| p.is(names::VERSION)) {
            return Err(RfcError::Builder("empty vCard".to_string()));
        }
        tracing::debug!(count = self.properties.len(), version = %self.version, "Built vCard");
        Ok(VCard::from_parts(self.properties.clone(), self.version))
    }

    /// Removes every property except VERSION.
    pub fn clear(&mut self) -> &mut Self {
        self.properties.clear();
        self.push_version();
        self
    }
}

fn version_property(version: VCardVersion) -> VCardProperty {
    VCardProperty {
        group: None,
        name: names::VERSION.to_string(),
        params: Vec::new(),
        values: vec![VCardValue::from(version.as_str())],
        version,
        decoded: true,
        unescaped: true,
    }
}
