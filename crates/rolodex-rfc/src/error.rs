use thiserror::Error;

use crate::rfc::vcard::core::VCardProperty;
use crate::rfc::vcard::parse::ParseError;

/// vCard parsing, validation, and construction errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Format error: {0}")]
    Format(#[from] ParseError),

    #[error("Validation error on {}: {message}", property.name)]
    Validation {
        message: String,
        property: Box<VCardProperty>,
    },

    /// An optional converter was invoked without its backing library.
    #[error("Missing dependencies: {}", .0.join(", "))]
    DependencyMissing(Vec<String>),

    #[error("Builder error: {0}")]
    Builder(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] rolodex_core::error::CoreError),
}

impl RfcError {
    /// Returns the property that failed validation, if this is a validation error.
    #[must_use]
    pub fn property(&self) -> Option<&VCardProperty> {
        match self {
            Self::Validation { property, .. } => Some(property),
            _ => None,
        }
    }
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
