//! vCard document parser.

use std::io::Read;
use std::path::Path;

use rolodex_core::config::ParserConfig;

use super::error::{ParseError, ParseErrorKind};
use super::grammar::Grammar;
use super::lexer::{ContentLine, LineToken, parse_line};
use super::reader::unfold_lines;
use crate::error::RfcResult;
use crate::rfc::vcard::core::{
    ConstructOptions, VCard, VCardProperty, VCardSet, VCardVersion, names,
};
use crate::rfc::vcard::index::VCardIndexer;

/// Parser for vCard documents.
///
/// Every document starts out as version 4.0 until its VERSION property is
/// read; properties before VERSION are therefore read with the 3.0/4.0
/// grammar and validated as 4.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    config: ParserConfig,
}

enum State {
    Outside,
    InCard(CardBuffer),
}

struct CardBuffer {
    begin_line: usize,
    version: VCardVersion,
    version_seen: bool,
    properties: Vec<VCardProperty>,
}

impl CardBuffer {
    const fn new(begin_line: usize) -> Self {
        Self {
            begin_line,
            version: VCardVersion::V4,
            version_seen: false,
            properties: Vec::new(),
        }
    }

    fn grammar(&self) -> Grammar {
        self.version.grammar()
    }

    fn push(
        &mut self,
        content: ContentLine,
        line_num: usize,
        options: &ConstructOptions,
    ) -> RfcResult<()> {
        if content.name.eq_ignore_ascii_case(names::VERSION) {
            if self.version_seen {
                return Err(ParseError::new(
                    ParseErrorKind::DuplicateVersion,
                    line_num,
                    "vCard declares VERSION twice",
                )
                .into());
            }
            let raw = content.values.join(";");
            self.version = VCardVersion::parse(&raw).ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::UnsupportedVersion,
                    line_num,
                    format!("unsupported vCard version: {raw}"),
                )
            })?;
            self.version_seen = true;
            tracing::trace!(version = %self.version, line = line_num, "Read VERSION");
        }

        let property = VCardProperty::construct(content, self.version, options).inspect_err(|e| {
            tracing::debug!(line = line_num, error = %e, "Property rejected");
        })?;
        self.properties.push(property);
        Ok(())
    }

    fn finish(self, end_line: usize) -> RfcResult<VCard> {
        if !self.version_seen {
            return Err(ParseError::new(
                ParseErrorKind::MissingVersion,
                end_line,
                format!("vCard opened on line {} has no VERSION", self.begin_line),
            )
            .into());
        }
        Ok(VCard::from_parts(self.properties, self.version))
    }
}

impl Parser {
    #[must_use]
    pub const fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// ## Summary
    /// Parses every vCard in `input` into a new set without an indexer.
    ///
    /// ## Errors
    /// Returns a format error for grammar or structure violations and a
    /// validation error for properties that break their rule.
    pub fn parse(&self, input: &str) -> RfcResult<VCardSet> {
        let mut set = VCardSet::new();
        self.parse_into(input, &mut set)?;
        Ok(set)
    }

    /// ## Summary
    /// Parses every vCard in `input` into a new set that owns an indexer
    /// configured from this parser's settings.
    ///
    /// ## Errors
    /// Same as [`Parser::parse`].
    pub fn parse_indexed(&self, input: &str) -> RfcResult<VCardSet> {
        let mut set = VCardSet::with_indexer(VCardIndexer::from_config(&self.config));
        self.parse_into(input, &mut set)?;
        Ok(set)
    }

    /// ## Summary
    /// Parses every vCard in `input` and appends it to `set`, indexing each
    /// one when the set has an indexer. Returns the number of vCards added.
    ///
    /// Content lines outside BEGIN/END are skipped with a warning. Nothing is
    /// added when an error is returned partway through; cards completed
    /// before the error have already been inserted.
    ///
    /// ## Errors
    /// Returns a format error for grammar or structure violations and a
    /// validation error for properties that break their rule.
    #[tracing::instrument(skip(self, input, set), fields(input_len = input.len()))]
    pub fn parse_into(&self, input: &str, set: &mut VCardSet) -> RfcResult<usize> {
        tracing::debug!("Parsing vCard document");

        let lines = unfold_lines(input, self.config.warn_long_lines)?;
        if lines.is_empty() {
            return Err(ParseError::new(ParseErrorKind::EmptyInput, 0, "no content lines").into());
        }

        let options = ConstructOptions::from_config(&self.config);
        let mut state = State::Outside;
        let mut count = 0;

        for line in &lines {
            let grammar = match &state {
                State::InCard(buffer) => buffer.grammar(),
                State::Outside => Grammar::Modern,
            };
            let Some(token) = parse_line(&line.text, grammar, line.number)? else {
                continue;
            };

            state = match (state, token) {
                (State::Outside, LineToken::Begin { .. }) => {
                    State::InCard(CardBuffer::new(line.number))
                }
                (State::InCard(buffer), LineToken::Begin { .. }) => {
                    return Err(ParseError::new(
                        ParseErrorKind::NestedBegin,
                        line.number,
                        format!("vCard opened on line {} is still open", buffer.begin_line),
                    )
                    .into());
                }
                (State::Outside, LineToken::End { .. }) => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnmatchedEnd,
                        line.number,
                        "END:VCARD without BEGIN:VCARD",
                    )
                    .into());
                }
                (State::InCard(buffer), LineToken::End { .. }) => {
                    let card = buffer.finish(line.number)?;
                    set.insert(card)?;
                    count += 1;
                    State::Outside
                }
                (State::Outside, LineToken::Content(content)) => {
                    tracing::warn!(
                        line = line.number,
                        property = %content.name,
                        "Skipping content line outside of a vCard"
                    );
                    State::Outside
                }
                (State::InCard(mut buffer), LineToken::Content(content)) => {
                    buffer.push(content, line.number, &options)?;
                    State::InCard(buffer)
                }
            };
        }

        if let State::InCard(buffer) = state {
            return Err(ParseError::new(
                ParseErrorKind::UnclosedCard,
                buffer.begin_line,
                "input ended before END:VCARD",
            )
            .into());
        }

        tracing::debug!(count, "Parsed vCards");

        Ok(count)
    }
}

/// ## Summary
/// Parses a vCard document with the default settings.
///
/// ## Errors
/// See [`Parser::parse`].
pub fn parse(input: &str) -> RfcResult<VCardSet> {
    Parser::default().parse(input)
}

/// ## Summary
/// Parses a vCard document with the given settings.
///
/// ## Errors
/// See [`Parser::parse`].
pub fn parse_with(input: &str, config: &ParserConfig) -> RfcResult<VCardSet> {
    Parser::new(*config).parse(input)
}

/// ## Summary
/// Parses a document holding one vCard and returns it. Extra vCards are
/// ignored.
///
/// ## Errors
/// Returns [`ParseErrorKind::EmptyInput`] if the document has no vCard, or
/// any error [`Parser::parse`] returns.
pub fn parse_single(input: &str) -> RfcResult<VCard> {
    parse(input)?.into_vec().into_iter().next().ok_or_else(|| {
        tracing::warn!("No vCard found in document");
        ParseError::new(ParseErrorKind::EmptyInput, 0, "no vCard found in document").into()
    })
}

/// ## Summary
/// Reads a UTF-8 document from `reader` and parses it.
///
/// ## Errors
/// Returns an I/O error if reading fails or the input is not UTF-8, or any
/// error [`Parser::parse`] returns.
#[tracing::instrument(skip(reader, config))]
pub fn parse_reader<R: Read>(mut reader: R, config: &ParserConfig) -> RfcResult<VCardSet> {
    let mut input = String::new();
    let read = reader.read_to_string(&mut input)?;
    tracing::trace!(bytes = read, "Read vCard stream");
    parse_with(&input, config)
}

/// ## Summary
/// Reads and parses the document stored at `path`.
///
/// ## Errors
/// Same as [`parse_reader`].
pub fn parse_file(path: impl AsRef<Path>, config: &ParserConfig) -> RfcResult<VCardSet> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "Reading vCard file");
    parse_reader(std::fs::File::open(path)?, config)
}

/// ## Summary
/// Parses one content line into a property of the given version. Returns
/// `None` for a blank line.
///
/// ## Errors
/// Returns [`ParseErrorKind::UnexpectedToken`] for BEGIN or END lines, a
/// format error for malformed lines, and a validation error when the
/// property breaks its rule.
pub fn parse_property(
    text: &str,
    version: VCardVersion,
    config: &ParserConfig,
) -> RfcResult<Option<VCardProperty>> {
    match parse_line(text, version.grammar(), 1)? {
        None => Ok(None),
        Some(LineToken::Begin { .. } | LineToken::End { .. }) => {
            Err(ParseError::unexpected(1, "property", "BEGIN/END")
                .with_raw(text)
                .into())
        }
        Some(LineToken::Content(content)) => Ok(Some(VCardProperty::construct(
            content,
            version,
            &ConstructOptions::from_config(config),
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RfcError;
    use crate::rfc::vcard::core::VCardValue;

    fn kind_of(err: &RfcError) -> Option<ParseErrorKind> {
        match err {
            RfcError::Format(e) => Some(e.kind),
            _ => None,
        }
    }

    fn line_of(err: &RfcError) -> Option<usize> {
        match err {
            RfcError::Format(e) => Some(e.line),
            _ => None,
        }
    }

    #[test_log::test]
    fn parse_minimal_card() {
        let set = parse("BEGIN:VCARD\r\nVERSION:3.0\r\nFN:John Smith\r\nEND:VCARD\r\n").unwrap();
        assert_eq!(set.len(), 1);
        let card = &set.cards()[0];
        assert_eq!(card.version(), VCardVersion::V3);
        assert_eq!(card.len(), 2);
        assert_eq!(card.contact_name().as_deref(), Some("John Smith"));
    }

    #[test]
    fn parse_multiple_cards() {
        let input = "BEGIN:VCARD\nVERSION:4.0\nFN:A\nEND:VCARD\nBEGIN:VCARD\nVERSION:3.0\nFN:B\nEND:VCARD\n";
        let set = parse(input).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.cards()[1].version(), VCardVersion::V3);
    }

    #[test]
    fn legacy_grammar_after_version() {
        let input = "BEGIN:VCARD\nVERSION:2.1\nTEL;HOME;VOICE:12345\nEND:VCARD";
        let card = parse_single(input).unwrap();
        let tel = card.get("TEL").unwrap();
        assert!(tel.params.iter().all(|p| p.is_bare()));
        assert_eq!(tel.version, VCardVersion::V2_1);
    }

    #[test]
    fn empty_input() {
        let err = parse("\r\n\r\n").unwrap_err();
        assert_eq!(kind_of(&err), Some(ParseErrorKind::EmptyInput));
    }

    #[test]
    fn missing_version() {
        let err = parse("BEGIN:VCARD\nFN:x\nEND:VCARD").unwrap_err();
        assert_eq!(kind_of(&err), Some(ParseErrorKind::MissingVersion));
        assert_eq!(line_of(&err), Some(3));
    }

    #[test]
    fn duplicate_version() {
        let err = parse("BEGIN:VCARD\nVERSION:4.0\nVERSION:3.0\nEND:VCARD").unwrap_err();
        assert_eq!(kind_of(&err), Some(ParseErrorKind::DuplicateVersion));
        assert_eq!(line_of(&err), Some(3));
    }

    #[test]
    fn unsupported_version() {
        let err = parse("BEGIN:VCARD\nVERSION:5.0\nEND:VCARD").unwrap_err();
        assert_eq!(kind_of(&err), Some(ParseErrorKind::UnsupportedVersion));
    }

    #[test]
    fn nested_begin() {
        let err = parse("BEGIN:VCARD\nVERSION:4.0\nBEGIN:VCARD\nEND:VCARD").unwrap_err();
        assert_eq!(kind_of(&err), Some(ParseErrorKind::NestedBegin));
        assert_eq!(line_of(&err), Some(3));
    }

    #[test]
    fn unmatched_end() {
        let err = parse("END:VCARD").unwrap_err();
        assert_eq!(kind_of(&err), Some(ParseErrorKind::UnmatchedEnd));
    }

    #[test]
    fn unclosed_card_reports_begin_line() {
        let err = parse("\nBEGIN:VCARD\nVERSION:4.0\nFN:x\n").unwrap_err();
        assert_eq!(kind_of(&err), Some(ParseErrorKind::UnclosedCard));
        assert_eq!(line_of(&err), Some(2));
    }

    #[test_log::test]
    fn content_outside_card_is_skipped() {
        let set = parse("FN:stray\nBEGIN:VCARD\nVERSION:4.0\nFN:x\nEND:VCARD").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.cards()[0].len(), 2);
    }

    #[test]
    fn validation_error_carries_property() {
        let err = parse("BEGIN:VCARD\nVERSION:4.0\nN:Smith;John\nEND:VCARD").unwrap_err();
        let prop = err.property().unwrap();
        assert_eq!(prop.name, "N");
    }

    #[test]
    fn validation_can_be_disabled() {
        let config = ParserConfig::default().without_validation();
        let set = parse_with("BEGIN:VCARD\nVERSION:4.0\nN:Smith;John\nEND:VCARD", &config).unwrap();
        assert_eq!(set.cards()[0].get("N").unwrap().values.len(), 2);
    }

    #[test]
    fn parse_indexed_attaches_indexer() {
        let set = Parser::default()
            .parse_indexed("BEGIN:VCARD\nVERSION:4.0\nFN:Alice\nEND:VCARD")
            .unwrap();
        let indexer = set.indexer().unwrap();
        assert_eq!(set.cards()[0].indexer(), Some(indexer.id()));
        assert_eq!(indexer.find_by_name("alice", false, true).len(), 1);
    }

    #[test]
    fn parse_into_appends() {
        let parser = Parser::default();
        let mut set = parser.parse("BEGIN:VCARD\nVERSION:4.0\nFN:A\nEND:VCARD").unwrap();
        let added = parser
            .parse_into("BEGIN:VCARD\nVERSION:4.0\nFN:B\nEND:VCARD", &mut set)
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn parse_reader_reads_bytes() {
        let input: &[u8] = b"BEGIN:VCARD\nVERSION:4.0\nFN:Reader\nEND:VCARD";
        let set = parse_reader(input, &ParserConfig::default()).unwrap();
        assert_eq!(set.cards()[0].contact_name().as_deref(), Some("Reader"));
    }

    #[test]
    fn parse_reader_rejects_invalid_utf8() {
        let input: &[u8] = b"BEGIN:VCARD\nFN:\xff\nEND:VCARD";
        let err = parse_reader(input, &ParserConfig::default()).unwrap_err();
        assert!(matches!(err, RfcError::Io(_)));
    }

    #[test]
    fn parse_single_without_cards() {
        let err = parse_single("FN:only stray content").unwrap_err();
        assert_eq!(kind_of(&err), Some(ParseErrorKind::EmptyInput));
    }

    #[test]
    fn parse_property_line() {
        let prop = parse_property("item2.EMAIL;TYPE=work:a@b.c", VCardVersion::V4, &ParserConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(prop.group.as_deref(), Some("item2"));
        assert_eq!(prop.values, vec![VCardValue::from("a@b.c")]);
        assert!(
            parse_property("", VCardVersion::V4, &ParserConfig::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn parse_property_rejects_begin() {
        let err = parse_property("BEGIN:VCARD", VCardVersion::V4, &ParserConfig::default()).unwrap_err();
        assert_eq!(kind_of(&err), Some(ParseErrorKind::UnexpectedToken));
    }
}
