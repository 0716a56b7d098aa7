//! vCard document engine.
//!
//! Parses, validates, indexes, migrates, and re-serializes vCard 2.1, 3.0 and
//! 4.0 documents. See [`rfc::vcard`] for the entry points.

pub mod error;
pub mod rfc;
