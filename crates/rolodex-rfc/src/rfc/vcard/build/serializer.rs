//! vCard serialization.

use super::fold::fold_line;
use crate::rfc::vcard::codec::{
    TransferEncoding, encode_base64, encode_quoted_printable, escape, escape_param_value,
};
use crate::rfc::vcard::core::{VCard, VCardParameter, VCardProperty, VCardSet, VCardValue};
use crate::rfc::vcard::parse::Grammar;

/// Serializes every document of a collection, each followed by `\n`.
#[must_use]
pub fn serialize(set: &VCardSet) -> String {
    serialize_with(set, true)
}

/// Serializes a collection. With `encode` off, quoted-printable text is
/// written unencoded; binary values are always written as base64.
#[must_use]
pub fn serialize_with(set: &VCardSet, encode: bool) -> String {
    let mut output = String::new();
    for card in set {
        output.push_str(&serialize_single_with(card, encode));
        output.push('\n');
    }
    output
}

/// Serializes one document from `BEGIN:VCARD` to `END:VCARD`, without a
/// trailing line break.
#[must_use]
pub fn serialize_single(card: &VCard) -> String {
    serialize_single_with(card, true)
}

#[must_use]
pub fn serialize_single_with(card: &VCard, encode: bool) -> String {
    let mut output = String::from("BEGIN:VCARD");
    for property in card {
        output.push('\n');
        output.push_str(&serialize_property_with(property, encode));
    }
    output.push_str("\nEND:VCARD");
    output
}

/// Serializes one property as a folded content line.
#[must_use]
pub fn serialize_property(property: &VCardProperty) -> String {
    serialize_property_with(property, true)
}

#[must_use]
pub fn serialize_property_with(property: &VCardProperty, encode: bool) -> String {
    let mut line = String::new();

    if let Some(group) = &property.group {
        line.push_str(group);
        line.push('.');
    }
    line.push_str(&property.name);

    let grammar = property.version.grammar();
    for param in &property.params {
        serialize_parameter(param, grammar, &mut line);
    }

    line.push(':');
    let quoted = serialize_values(property, encode, &mut line);

    fold_line(&line, quoted)
}

fn serialize_parameter(param: &VCardParameter, grammar: Grammar, output: &mut String) {
    if param.is_bare() {
        output.push(';');
        // 3.0 and 4.0 have no valueless parameters; the token is a TYPE.
        if !grammar.allows_bare_tokens() {
            output.push_str("TYPE=");
        }
        output.push_str(&param.name);
        return;
    }

    if grammar.allows_bare_tokens() {
        serialize_legacy_parameter(param, output);
        return;
    }

    output.push(';');
    output.push_str(&param.name);
    output.push('=');

    for (i, value) in param.values.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }

        let (escaped, needs_quotes) = escape_param_value(value);
        if needs_quotes {
            output.push('"');
            output.push_str(&escaped);
            output.push('"');
        } else {
            output.push_str(&escaped);
        }
    }
}

/// 2.1 has no value lists: every list item is repeated as its own parameter,
/// and TYPE items are written as bare tokens.
fn serialize_legacy_parameter(param: &VCardParameter, output: &mut String) {
    let is_type = param.name.eq_ignore_ascii_case("TYPE");

    for item in param.values.iter().flat_map(|v| v.split(',')).filter(|v| !v.is_empty()) {
        output.push(';');
        if !is_type {
            output.push_str(&param.name);
            output.push('=');
        }
        // `:` and `;` cannot appear unquoted in any grammar.
        if item.contains([':', ';']) {
            output.push('"');
            output.push_str(item);
            output.push('"');
        } else {
            output.push_str(item);
        }
    }
}

/// Writes the `;`-joined value fields. Returns whether they were written as
/// quoted-printable.
fn serialize_values(property: &VCardProperty, encode: bool, output: &mut String) -> bool {
    let encoding = property.encoding();
    let charset = property.charset();
    let mut quoted = !property.decoded && encoding == Some(TransferEncoding::QuotedPrintable);

    for (i, value) in property.values.iter().enumerate() {
        if i > 0 {
            output.push(';');
        }

        match value {
            VCardValue::Binary(bytes) => output.push_str(&encode_base64(bytes)),
            VCardValue::Text(text) if !property.decoded || !property.unescaped => {
                output.push_str(text);
            }
            VCardValue::Text(text) => match encoding {
                Some(TransferEncoding::QuotedPrintable) if encode && !text.is_empty() => {
                    match encode_quoted_printable(text, charset) {
                        Ok(encoded) => {
                            output.push_str(&encoded);
                            quoted = true;
                        }
                        Err(error) => {
                            tracing::warn!(
                                property = %property.name,
                                %error,
                                "Value was not encoded, writing escaped text"
                            );
                            output.push_str(&escape(text));
                        }
                    }
                }
                Some(TransferEncoding::Base64) => output.push_str(text),
                _ => output.push_str(&escape(text)),
            },
        }
    }

    quoted
}
