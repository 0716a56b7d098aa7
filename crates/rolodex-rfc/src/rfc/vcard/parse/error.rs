//! vCard format error types.

use std::fmt;

/// Result type for grammar and structure checks.
pub type ParseResult<T> = Result<T, ParseError>;

/// A grammar or structural violation found while parsing.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Physical line number where the offending logical line began (1-based).
    /// Zero when the error does not come from parsed input.
    pub line: usize,
    /// Additional context or message.
    pub message: String,
    /// The offending text, when there is one.
    pub raw: Option<String>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
            raw: None,
        }
    }

    /// Attaches the offending text.
    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Creates an unexpected token error.
    #[must_use]
    pub fn unexpected(line: usize, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            line,
            format!("expected {expected}, found {found}"),
        )
    }

    /// Creates a malformed line error carrying the line text.
    #[must_use]
    pub fn malformed(line: usize, message: impl Into<String>, raw: &str) -> Self {
        Self::new(ParseErrorKind::MalformedLine, line, message).with_raw(raw)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.kind, self.message)?;
        if let Some(raw) = &self.raw {
            write!(f, " in {raw:?}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input held no content lines at all.
    EmptyInput,
    /// A continuation line appeared before any logical line.
    IllegalContinuation,
    /// A non-blank line does not match the content-line grammar.
    MalformedLine,
    /// Unexpected token or character.
    UnexpectedToken,
    /// BEGIN:VCARD inside an open vCard.
    NestedBegin,
    /// END:VCARD with no open vCard.
    UnmatchedEnd,
    /// A vCard closed without a VERSION property.
    MissingVersion,
    /// A vCard carries more than one VERSION property.
    DuplicateVersion,
    /// Input ended inside an open vCard.
    UnclosedCard,
    /// Unsupported vCard version.
    UnsupportedVersion,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty input"),
            Self::IllegalContinuation => write!(f, "illegal continuation"),
            Self::MalformedLine => write!(f, "malformed line"),
            Self::UnexpectedToken => write!(f, "unexpected token"),
            Self::NestedBegin => write!(f, "nested BEGIN"),
            Self::UnmatchedEnd => write!(f, "unmatched END"),
            Self::MissingVersion => write!(f, "missing VERSION"),
            Self::DuplicateVersion => write!(f, "duplicate VERSION"),
            Self::UnclosedCard => write!(f, "unclosed vCard"),
            Self::UnsupportedVersion => write!(f, "unsupported version"),
        }
    }
}
