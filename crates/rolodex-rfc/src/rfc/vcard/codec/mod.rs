//! Value codec: escaping and transfer encodings.

pub mod escape;
pub mod transfer;

pub use escape::{UnescapeMode, decode_carets, escape, escape_param_value, split_unescaped, unescape};
pub use transfer::{
    DecodeError, TransferEncoding, decode_base64, decode_quoted_printable, encode_base64,
    encode_quoted_printable,
};

use crate::rfc::vcard::core::{VCardProperty, VCardValue};

/// Decodes a property's transfer-encoded text values in place.
///
/// Quoted-printable values become text in the declared charset; base64
/// values become [`VCardValue::Binary`]. Empty values are left alone.
/// Decoding is all or nothing: if any value fails, every value keeps its
/// original text and `decoded` is cleared so the serializer writes the whole
/// property back untouched.
pub fn decode_property(property: &mut VCardProperty, warn: bool) {
    let Some(encoding) = property.encoding() else {
        return;
    };
    let charset = property.charset();

    let decoded: Result<Vec<VCardValue>, DecodeError> = property
        .values
        .iter()
        .map(|value| match value {
            VCardValue::Text(text) if !text.is_empty() => match encoding {
                TransferEncoding::QuotedPrintable => {
                    decode_quoted_printable(text, charset).map(VCardValue::Text)
                }
                TransferEncoding::Base64 => decode_base64(text).map(VCardValue::Binary),
            },
            other => Ok(other.clone()),
        })
        .collect();

    match decoded {
        Ok(values) => property.values = values,
        Err(error) => {
            property.decoded = false;
            if warn {
                tracing::warn!(
                    property = %property.name,
                    %error,
                    "Value was not decoded, keeping original text"
                );
            }
        }
    }
}
