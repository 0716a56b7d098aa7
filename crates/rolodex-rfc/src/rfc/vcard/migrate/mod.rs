//! Version migration.
//!
//! A document moves between versions one adjacent step at a time
//! (2.1 ↔ 3.0 ↔ 4.0). Each step rewrites the properties the target version
//! still defines, drops the rest, and rebuilds everything with validation
//! under the target version.

mod steps;

use rolodex_core::config::ParserConfig;

use self::steps::Draft;
use crate::error::RfcResult;
use crate::rfc::vcard::codec::{UnescapeMode, unescape};
use crate::rfc::vcard::core::{
    ConstructOptions, VCard, VCardParameter, VCardProperty, VCardValue, VCardVersion, names,
};
use crate::rfc::vcard::validate::rules;

/// ## Summary
/// Converts a document to `target`.
///
/// Returns a copy when the document is already at `target`.
///
/// ## Errors
/// Returns [`crate::error::RfcError::Validation`] if a rewritten property
/// breaks a rule of the version it is rebuilt for.
#[tracing::instrument(
    skip(card, config),
    fields(from = %card.version(), to = %target, properties = card.len())
)]
pub fn migrate(card: &VCard, target: VCardVersion, config: &ParserConfig) -> RfcResult<VCard> {
    if card.version() == target {
        tracing::debug!("Versions match, nothing to migrate");
        return Ok(card.clone());
    }

    let options = ConstructOptions::from_config(config);
    let mut version = card.version();
    let mut properties: Vec<VCardProperty> = card.iter().map(collapse_double_escapes).collect();

    while let Some(next) = version.step_towards(target) {
        let Some(step) = steps::step(version, next) else {
            break;
        };
        tracing::trace!(from = %version, to = %next, "Applying migration step");
        properties = apply(step, &properties, next, &options)?;
        version = next;
    }

    tracing::debug!(properties = properties.len(), "Migrated vCard");
    Ok(VCard::from_parts(properties, version))
}

/// ## Summary
/// Converts a document to the version named by `target` (`"2.1"`, `"3.0"`,
/// `"4.0"`).
///
/// ## Errors
/// Returns [`crate::error::RfcError::Core`] for an unknown version string,
/// otherwise as [`migrate`].
pub fn migrate_to(card: &VCard, target: &str, config: &ParserConfig) -> RfcResult<VCard> {
    let target: VCardVersion = target.parse()?;
    migrate(card, target, config)
}

fn collapse_double_escapes(property: &VCardProperty) -> VCardProperty {
    let mut property = property.clone();
    if property.unescaped {
        for value in &mut property.values {
            if let VCardValue::Text(text) = value {
                *text = unescape(text, UnescapeMode::DoubleOnly);
            }
        }
    }
    property
}

fn apply(
    step: steps::Step,
    properties: &[VCardProperty],
    target: VCardVersion,
    options: &ConstructOptions,
) -> RfcResult<Vec<VCardProperty>> {
    let mut out = Vec::with_capacity(properties.len());
    out.push(VCardProperty::from_values(
        None,
        names::VERSION,
        Vec::new(),
        vec![VCardValue::from(target.as_str())],
        target,
        options,
    )?);

    for property in properties {
        if property.is(names::VERSION) {
            continue;
        }
        if !rules::is_defined(&property.name, target) {
            tracing::debug!(property = %property.name, version = %target, "Dropping property");
            continue;
        }
        let Some(mut draft) = step(Draft::from_property(property)) else {
            tracing::debug!(property = %property.name, version = %target, "Property could not be rewritten, dropping");
            continue;
        };
        restrict_types(&mut draft, target);

        let mut rebuilt = VCardProperty::from_values(
            draft.group,
            &draft.name,
            draft.params,
            draft.values,
            target,
            options,
        )?;
        rebuilt.decoded = property.decoded;
        rebuilt.unescaped = property.unescaped;
        out.push(rebuilt);
    }

    Ok(out)
}

/// Removes TYPE values the target vocabulary lacks; `x-` values stay.
fn restrict_types(draft: &mut Draft, target: VCardVersion) {
    let Some(vocab) = rules::type_vocabulary(&draft.name, target) else {
        return;
    };
    let Some(pos) = draft.params.iter().position(|p| p.name == "TYPE") else {
        return;
    };

    let kept: Vec<String> = draft.params[pos]
        .split_values()
        .filter(|v| {
            let lower = v.to_ascii_lowercase();
            lower.starts_with("x-") || vocab.contains(&lower.as_str())
        })
        .map(str::to_string)
        .collect();

    if kept.is_empty() {
        draft.params.remove(pos);
    } else {
        draft.params[pos] = VCardParameter::multi("TYPE", kept);
    }
}
