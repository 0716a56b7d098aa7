//! vCard engine (RFC 2426, RFC 6350, versit 2.1).
//!
//! ## Overview
//!
//! Reads contact files exported as vCard 2.1, 3.0, or 4.0, checks every
//! property against the rules of its version, and writes them back with
//! round-trip fidelity or converted to another version.
//!
//! ## Usage
//!
//! ### Parsing
//!
//! ```rust
//! use rolodex_rfc::rfc::vcard::parse;
//!
//! let input = "\
//! BEGIN:VCARD\r\n\
//! VERSION:3.0\r\n\
//! FN:John Smith\r\n\
//! TEL;TYPE=cell:+7 (999) 123-45-67\r\n\
//! END:VCARD\r\n";
//!
//! let cards = parse(input).unwrap();
//! assert_eq!(cards.cards()[0].contact_name().as_deref(), Some("John Smith"));
//! assert_eq!(cards.cards()[0].contact_number(), vec!["79991234567"]);
//! ```
//!
//! ### Migrating and serializing
//!
//! ```rust
//! use rolodex_core::config::ParserConfig;
//! use rolodex_rfc::rfc::vcard::{VCardVersion, migrate, parse_single, serialize_single};
//!
//! let card = parse_single("BEGIN:VCARD\nVERSION:3.0\nFN:Jane\nEND:VCARD\n").unwrap();
//! let upgraded = migrate(&card, VCardVersion::V4, &ParserConfig::default()).unwrap();
//! assert_eq!(serialize_single(&upgraded), "BEGIN:VCARD\nVERSION:4.0\nFN:Jane\nEND:VCARD");
//! ```
//!
//! ## Submodules
//!
//! - [`core`] - Document model (`VCard`, `VCardSet`, `VCardProperty`, builder)
//! - [`parse`] - Line reader, content-line grammar, parsing engine
//! - [`codec`] - Escaping, quoted-printable, base64, charsets
//! - [`validate`] - Per-version property rule table
//! - [`index`] - Search index over a collection
//! - [`migrate`] - Version conversion
//! - [`build`] - Serialization and line folding

pub mod build;
pub mod codec;
pub mod core;
pub mod index;
pub mod migrate;
pub mod parse;
pub mod validate;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use self::build::{serialize, serialize_property, serialize_single};
pub use self::core::{
    CardId, ContactData, StructuredName, VCard, VCardBuilder, VCardParameter, VCardProperty,
    VCardSet, VCardValue, VCardVersion,
};
pub use self::index::{SearchKind, VCardIndexer};
pub use self::migrate::{migrate, migrate_to};
pub use self::parse::{
    ParseError, ParseErrorKind, ParseResult, Parser, parse, parse_property, parse_reader,
    parse_single, parse_with,
};
pub use self::validate::{validate, validate_card};
