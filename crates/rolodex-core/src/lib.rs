//! Shared building blocks for the rolodex crates: the core error type and the
//! configuration layer that is threaded through parsing and building.

pub mod config;
pub mod error;
