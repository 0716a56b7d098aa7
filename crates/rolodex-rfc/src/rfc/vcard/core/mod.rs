//! vCard document model.
//!
//! - [`VCard`] - A document: ordered properties plus its version
//! - [`VCardSet`] - An arena of documents sharing one optional indexer
//! - [`VCardProperty`] - Individual property with parameters and value fields
//! - [`VCardParameter`] - Property parameters
//! - [`VCardValue`] - Text or decoded binary value field
//! - [`VCardBuilder`] - Step-by-step document construction
//!
//! ## Example
//!
//! ```rust
//! use rolodex_core::config::ParserConfig;
//! use rolodex_rfc::rfc::vcard::core::{VCardBuilder, VCardVersion};
//!
//! let mut builder = VCardBuilder::new(VCardVersion::V3, &ParserConfig::default());
//! builder.set_name("John Smith").unwrap();
//! builder.set_phone("12345").unwrap();
//! let card = builder.build().unwrap();
//! assert_eq!(card.contact_name().as_deref(), Some("John Smith"));
//! ```

mod builder;
mod collection;
mod parameter;
mod property;
mod structured;
mod value;
mod vcard;
mod version;

pub use builder::VCardBuilder;
pub use collection::{CardId, VCardSet};
pub use parameter::{VCardParameter, find_param, merge_param};
pub use property::{ConstructOptions, VCardProperty, names};
pub use structured::{ContactData, StructuredName};
pub use value::VCardValue;
pub use vcard::VCard;
pub use version::VCardVersion;
