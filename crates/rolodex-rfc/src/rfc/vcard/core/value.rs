//! vCard value fields.

use std::borrow::Cow;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// One field of a property value.
///
/// Structured properties (N, ADR) carry several fields; everything else
/// carries one. Base64 payloads are held decoded as [`VCardValue::Binary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VCardValue {
    /// Text, already unescaped and transfer-decoded.
    Text(String),
    /// Decoded base64 payload.
    Binary(Vec<u8>),
}

impl VCardValue {
    /// Returns the value as text if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Binary(_) => None,
        }
    }

    /// Returns the value as bytes if it is a binary value.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Returns a textual form: text as-is, binary as standard base64.
    #[must_use]
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Binary(b) => Cow::Owned(STANDARD.encode(b)),
        }
    }

    /// Returns whether the value is empty text or an empty payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Binary(b) => b.is_empty(),
        }
    }
}

impl From<&str> for VCardValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for VCardValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for VCardValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}
