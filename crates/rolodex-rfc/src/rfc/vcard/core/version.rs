//! vCard version tags.

use std::fmt;
use std::str::FromStr;

use rolodex_core::error::CoreError;
use serde::Serialize;

use crate::rfc::vcard::parse::Grammar;

/// vCard version.
///
/// Ordered oldest to newest so version ranges can be expressed with `..=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub enum VCardVersion {
    /// vCard 2.1 (versit consortium).
    #[serde(rename = "2.1")]
    V2_1,
    /// vCard 3.0 (RFC 2426).
    #[serde(rename = "3.0")]
    V3,
    /// vCard 4.0 (RFC 6350).
    #[default]
    #[serde(rename = "4.0")]
    V4,
}

impl VCardVersion {
    /// All versions, oldest first.
    pub const ALL: [Self; 3] = [Self::V2_1, Self::V3, Self::V4];

    /// Returns the version string as it appears in a VERSION property.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V2_1 => "2.1",
            Self::V3 => "3.0",
            Self::V4 => "4.0",
        }
    }

    /// Parses a VERSION value, ignoring surrounding whitespace.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "2.1" => Some(Self::V2_1),
            "3.0" => Some(Self::V3),
            "4.0" => Some(Self::V4),
            _ => None,
        }
    }

    /// Returns the content-line grammar used for this version.
    #[must_use]
    pub const fn grammar(self) -> Grammar {
        match self {
            Self::V2_1 => Grammar::Legacy,
            Self::V3 | Self::V4 => Grammar::Modern,
        }
    }

    /// Returns the adjacent version one step towards `target`, if any.
    #[must_use]
    pub const fn step_towards(self, target: Self) -> Option<Self> {
        match (self, target) {
            (Self::V2_1, Self::V3 | Self::V4) | (Self::V4, Self::V2_1 | Self::V3) => Some(Self::V3),
            (Self::V3, Self::V4) => Some(Self::V4),
            (Self::V3, Self::V2_1) => Some(Self::V2_1),
            _ => None,
        }
    }
}

impl fmt::Display for VCardVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VCardVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::InvalidInput(format!("unsupported vCard version: {s}")))
    }
}
