//! Transfer encodings: quoted-printable and base64.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;

use crate::rfc::vcard::core::{VCardParameter, VCardVersion, find_param};

/// Transfer encoding declared on a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    QuotedPrintable,
    Base64,
}

impl TransferEncoding {
    /// Reads the encoding from an `ENCODING` parameter or, for 2.1 documents,
    /// a bare `QUOTED-PRINTABLE`, `BASE64` or `B` token. `7BIT` and `8BIT`
    /// mean no transfer encoding.
    #[must_use]
    pub fn from_params(params: &[VCardParameter]) -> Option<Self> {
        if let Some(param) = find_param(params, "ENCODING") {
            return param.first().and_then(Self::from_label);
        }
        params
            .iter()
            .filter(|p| p.is_bare())
            .find_map(|p| Self::from_label(&p.name))
    }

    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("QUOTED-PRINTABLE") {
            Some(Self::QuotedPrintable)
        } else if label.eq_ignore_ascii_case("B") || label.eq_ignore_ascii_case("BASE64") {
            Some(Self::Base64)
        } else {
            None
        }
    }

    /// Returns the `ENCODING` value used by `version`.
    #[must_use]
    pub const fn label(self, version: VCardVersion) -> &'static str {
        match (self, version) {
            (Self::QuotedPrintable, _) => "QUOTED-PRINTABLE",
            (Self::Base64, VCardVersion::V2_1) => "BASE64",
            (Self::Base64, _) => "b",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid quoted-printable escape at byte {0}")]
    InvalidEscape(usize),

    #[error("unknown charset: {0}")]
    UnknownCharset(String),

    #[error("bytes are not valid {0}")]
    Malformed(&'static str),

    #[error("charset {0} cannot encode the text")]
    Unencodable(&'static str),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

fn lookup_charset(charset: Option<&str>) -> Result<&'static Encoding, DecodeError> {
    match charset {
        None => Ok(UTF_8),
        Some(label) => Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| DecodeError::UnknownCharset(label.to_string())),
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// ## Summary
/// Decodes quoted-printable `text` and interprets the bytes in `charset`
/// (UTF-8 when `None`).
///
/// `=XX` becomes one byte; `=` at the end of the text or before CR/LF is a
/// soft line break and is dropped.
///
/// ## Errors
/// Returns [`DecodeError`] for a malformed escape, an unknown charset label,
/// or bytes that are not valid in the charset.
pub fn decode_quoted_printable(text: &str, charset: Option<&str>) -> Result<String, DecodeError> {
    let encoding = lookup_charset(charset)?;
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'=' {
            out.push(b);
            i += 1;
            continue;
        }

        match bytes.get(i + 1..i + 3) {
            _ if i + 1 == bytes.len() => i += 1,
            Some([b'\r', b'\n']) => i += 3,
            _ if matches!(bytes.get(i + 1), Some(b'\r' | b'\n')) => i += 2,
            Some(&[hi, lo]) => {
                let (Some(hi), Some(lo)) = (hex_digit(hi), hex_digit(lo)) else {
                    return Err(DecodeError::InvalidEscape(i));
                };
                out.push((hi << 4) | lo);
                i += 3;
            }
            _ => return Err(DecodeError::InvalidEscape(i)),
        }
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(&out)
        .map(std::borrow::Cow::into_owned)
        .ok_or(DecodeError::Malformed(encoding.name()))
}

/// ## Summary
/// Encodes `text` as quoted-printable in `charset` (UTF-8 when `None`),
/// without soft line breaks.
///
/// Bytes outside printable ASCII are escaped, as are `=`, `;`, `\` and
/// trailing whitespace, so CR and LF come out as `=0D` and `=0A`.
///
/// ## Errors
/// Returns [`DecodeError`] for an unknown charset label or text the charset
/// cannot represent.
pub fn encode_quoted_printable(text: &str, charset: Option<&str>) -> Result<String, DecodeError> {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let encoding = lookup_charset(charset)?;
    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(DecodeError::Unencodable(encoding.name()));
    }

    let trailing_ws = bytes
        .iter()
        .rev()
        .take_while(|b| matches!(b, b' ' | b'\t'))
        .count();
    let plain_end = bytes.len() - trailing_ws;

    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, &b) in bytes.iter().enumerate() {
        let literal = i < plain_end
            && (b == b' ' || b.is_ascii_graphic())
            && !matches!(b, b'=' | b';' | b'\\');
        if literal {
            out.push(char::from(b));
        } else {
            out.push('=');
            out.push(char::from(HEX[usize::from(b >> 4)]));
            out.push(char::from(HEX[usize::from(b & 0x0F)]));
        }
    }

    Ok(out)
}

/// ## Summary
/// Decodes standard base64, ignoring embedded whitespace left over from
/// folding.
///
/// ## Errors
/// Returns [`DecodeError::Base64`] if the text is not valid base64.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

/// Encodes bytes as standard base64.
#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_from_params() {
        assert_eq!(
            TransferEncoding::from_params(&[VCardParameter::encoding("quoted-printable")]),
            Some(TransferEncoding::QuotedPrintable)
        );
        assert_eq!(
            TransferEncoding::from_params(&[VCardParameter::encoding("b")]),
            Some(TransferEncoding::Base64)
        );
        assert_eq!(
            TransferEncoding::from_params(&[VCardParameter::encoding("8BIT")]),
            None
        );
        assert_eq!(
            TransferEncoding::from_params(&[
                VCardParameter::bare("HOME"),
                VCardParameter::bare("BASE64")
            ]),
            Some(TransferEncoding::Base64)
        );
        assert_eq!(TransferEncoding::from_params(&[]), None);
    }

    #[test]
    fn labels_per_version() {
        assert_eq!(TransferEncoding::Base64.label(VCardVersion::V2_1), "BASE64");
        assert_eq!(TransferEncoding::Base64.label(VCardVersion::V3), "b");
        assert_eq!(
            TransferEncoding::QuotedPrintable.label(VCardVersion::V2_1),
            "QUOTED-PRINTABLE"
        );
    }

    #[test]
    fn decode_utf8_quoted_printable() {
        let decoded = decode_quoted_printable("=D0=9F=D1=80=D0=B8=D0=B2=D0=B5=D1=82", None).unwrap();
        assert_eq!(decoded, "Привет");
    }

    #[test]
    fn decode_with_charset() {
        let decoded = decode_quoted_printable("=CF=F0=E8=E2=E5=F2", Some("windows-1251")).unwrap();
        assert_eq!(decoded, "Привет");
    }

    #[test]
    fn decode_soft_breaks() {
        assert_eq!(decode_quoted_printable("ab=\r\ncd=", None).unwrap(), "abcd");
        assert_eq!(decode_quoted_printable("a=\nb", None).unwrap(), "ab");
    }

    #[test]
    fn decode_failures() {
        assert_eq!(
            decode_quoted_printable("bad=ZZ", None),
            Err(DecodeError::InvalidEscape(3))
        );
        assert!(matches!(
            decode_quoted_printable("x", Some("no-such-charset")),
            Err(DecodeError::UnknownCharset(_))
        ));
        assert!(matches!(
            decode_quoted_printable("=FF=FE", None),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn encode_escapes_reserved_bytes() {
        assert_eq!(encode_quoted_printable("a=b;c", None).unwrap(), "a=3Db=3Bc");
        assert_eq!(encode_quoted_printable("line\r\nnext", None).unwrap(), "line=0D=0Anext");
        assert_eq!(encode_quoted_printable("end ", None).unwrap(), "end=20");
        assert_eq!(encode_quoted_printable("Привет", None).unwrap(), "=D0=9F=D1=80=D0=B8=D0=B2=D0=B5=D1=82");
    }

    #[test]
    fn quoted_printable_inverse() {
        for text in ["plain text", "a;b=c\\d", "multi\nline ", "Ünïcödé"] {
            let encoded = encode_quoted_printable(text, None).unwrap();
            assert_eq!(decode_quoted_printable(&encoded, None).unwrap(), text);
        }
    }

    #[test]
    fn base64_ignores_whitespace() {
        assert_eq!(decode_base64("aGVs\n bG8=").unwrap(), b"hello");
        assert_eq!(encode_base64(b"hello"), "aGVsbG8=");
        assert!(decode_base64("!!!").is_err());
    }
}
