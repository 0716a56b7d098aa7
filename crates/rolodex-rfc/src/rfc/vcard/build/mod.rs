//! vCard serialization.
//!
//! ## Usage
//!
//! ```rust
//! use rolodex_core::config::ParserConfig;
//! use rolodex_rfc::rfc::vcard::build::serialize_single;
//! use rolodex_rfc::rfc::vcard::core::{VCardBuilder, VCardVersion};
//!
//! let mut builder = VCardBuilder::new(VCardVersion::V3, &ParserConfig::default());
//! builder.set_name("John Smith").unwrap();
//! let card = builder.build().unwrap();
//!
//! assert!(serialize_single(&card).starts_with("BEGIN:VCARD\nVERSION:3.0\nFN:John Smith"));
//! ```
//!
//! ## Features
//!
//! - Properties written in stored order
//! - Folding at 75 octets (UTF-8 safe), soft breaks for quoted-printable
//! - Text escaping, RFC 6868 caret encoding for 3.0/4.0 parameters
//! - Quoted-printable and base64 re-encoding of decoded values

mod fold;
mod serializer;

pub use fold::fold_line;
pub use serializer::{
    serialize, serialize_property, serialize_property_with, serialize_single,
    serialize_single_with, serialize_with,
};
