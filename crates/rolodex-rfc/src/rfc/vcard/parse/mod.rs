//! vCard parsing (vCard 2.1, RFC 2426, RFC 6350).
//!
//! ## Usage
//!
//! ```rust
//! use rolodex_rfc::rfc::vcard::parse;
//!
//! let input = "\
//! BEGIN:VCARD\r\n\
//! VERSION:4.0\r\n\
//! FN:John Doe\r\n\
//! EMAIL:john@example.com\r\n\
//! END:VCARD\r\n";
//!
//! let cards = parse::parse(input).unwrap();
//! assert_eq!(cards.cards()[0].contact_name().as_deref(), Some("John Doe"));
//! ```
//!
//! Parsing runs in three stages: the reader unfolds physical lines into
//! logical lines, the lexer splits each logical line into a [`ContentLine`],
//! and the parser drives the BEGIN/VERSION/END state machine that turns
//! content lines into validated properties.

mod error;
mod grammar;
mod lexer;
mod parser;
mod reader;


pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use grammar::{Grammar, is_name_char, is_qsafe_char, is_safe_char, is_value_char};
pub use lexer::{ContentLine, LineToken, parse_line};
pub use parser::{
    Parser, parse, parse_file, parse_property, parse_reader, parse_single, parse_with,
};
pub use reader::{LogicalLine, is_quoted_printable_head, unfold, unfold_lines};
