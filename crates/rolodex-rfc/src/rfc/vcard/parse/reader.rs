//! Line reader: merges folded physical lines into logical lines.

use super::error::{ParseError, ParseErrorKind, ParseResult};

/// Longest logical line, in characters, that does not trigger a warning.
const MAX_LOGICAL_CHARS: usize = 75;

/// A logical (unfolded) content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Physical line number (1-based) the logical line began on.
    pub number: usize,
    /// Unfolded text.
    pub text: String,
}

/// ## Summary
/// Unfolds `input` into logical lines without length warnings.
///
/// ## Errors
/// Returns [`ParseErrorKind::IllegalContinuation`] if the input starts with a
/// continuation line.
pub fn unfold(input: &str) -> ParseResult<Vec<LogicalLine>> {
    unfold_lines(input, false)
}

/// ## Summary
/// Unfolds `input` into logical lines.
///
/// Physical lines are split on LF with a trailing CR trimmed. When the
/// previous logical line is a quoted-printable property ending in a soft
/// break `=`, the soft break is removed and the next line appended as-is.
/// Otherwise a line starting with SPACE or TAB continues the previous logical
/// line minus that first character, a line starting with `=` continues it
/// minus the `=`, and a line starting with `;` is appended whole. Blank lines
/// are skipped.
///
/// ## Errors
/// Returns [`ParseErrorKind::IllegalContinuation`] if a continuation line
/// appears before any logical line.
pub fn unfold_lines(input: &str, warn_long_lines: bool) -> ParseResult<Vec<LogicalLine>> {
    let mut lines: Vec<LogicalLine> = Vec::new();

    for (i, physical) in input.split('\n').enumerate() {
        let number = i + 1;
        let physical = physical.strip_suffix('\r').unwrap_or(physical);

        if physical.is_empty() {
            continue;
        }

        if let Some(prev) = lines.last_mut()
            && ends_with_soft_break(&prev.text)
        {
            prev.text.pop();
            prev.text.push_str(physical);
        } else if let Some(rest) = physical.strip_prefix([' ', '\t', '=']) {
            continuation(&mut lines, number, physical)?.push_str(rest);
        } else if physical.starts_with(';') {
            continuation(&mut lines, number, physical)?.push_str(physical);
        } else {
            lines.push(LogicalLine {
                number,
                text: physical.to_string(),
            });
        }
    }

    if warn_long_lines {
        for line in &lines {
            let length = line.text.chars().count();
            if length > MAX_LOGICAL_CHARS {
                tracing::warn!(line = line.number, length, "Logical line exceeds 75 characters");
            }
        }
    }

    tracing::trace!(count = lines.len(), "Unfolded logical lines");

    Ok(lines)
}

fn continuation<'a>(
    lines: &'a mut [LogicalLine],
    number: usize,
    physical: &str,
) -> ParseResult<&'a mut String> {
    lines.last_mut().map(|l| &mut l.text).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::IllegalContinuation,
            number,
            "continuation line before any content line",
        )
        .with_raw(physical)
    })
}

/// Returns whether `text` is a quoted-printable content line ending in a soft break.
fn ends_with_soft_break(text: &str) -> bool {
    text.ends_with('=') && is_quoted_printable_head(text)
}

/// Returns whether the name/parameter part of a content line declares
/// quoted-printable encoding.
#[must_use]
pub fn is_quoted_printable_head(text: &str) -> bool {
    let mut in_quotes = false;
    let end = text
        .char_indices()
        .find(|&(_, c)| {
            if c == '"' {
                in_quotes = !in_quotes;
            }
            c == ':' && !in_quotes
        })
        .map_or(text.len(), |(i, _)| i);

    text[..end].to_ascii_uppercase().contains("QUOTED-PRINTABLE")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        unfold(input).unwrap().into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn unfold_space_and_tab() {
        assert_eq!(texts("FN:John\r\n  Doe\r\n\tJr"), vec!["FN:John DoeJr"]);
    }

    #[test]
    fn unfold_skips_blank_lines() {
        assert_eq!(texts("LINE1\n\n\r\nLINE2\n"), vec!["LINE1", "LINE2"]);
    }

    #[test]
    fn unfold_equals_continuation() {
        assert_eq!(
            texts("NOTE;ENCODING=QUOTED-PRINTABLE:abc=\n=3Ddef"),
            vec!["NOTE;ENCODING=QUOTED-PRINTABLE:abc=3Ddef"]
        );
    }

    #[test]
    fn unfold_semicolon_continuation() {
        assert_eq!(texts("N:Doe\n;John;;;"), vec!["N:Doe;John;;;"]);
    }

    #[test]
    fn unfold_quoted_printable_soft_break() {
        let input = "NOTE;ENCODING=QUOTED-PRINTABLE:=D0=9F=D1=80=\nabc\nFN:x";
        assert_eq!(
            texts(input),
            vec!["NOTE;ENCODING=QUOTED-PRINTABLE:=D0=9F=D1=80abc", "FN:x"]
        );
    }

    #[test]
    fn soft_break_keeps_leading_escape() {
        let input = "FN;ENCODING=QUOTED-PRINTABLE:=D0=98=\n=D0=B2";
        assert_eq!(texts(input), vec!["FN;ENCODING=QUOTED-PRINTABLE:=D0=98=D0=B2"]);
    }

    #[test]
    fn unfold_keeps_trailing_equals_outside_quoted_printable() {
        assert_eq!(texts("NOTE:a=\nFN:x"), vec!["NOTE:a=", "FN:x"]);
    }

    #[test]
    fn unfold_records_start_line() {
        let lines = unfold("BEGIN:VCARD\n\nFN:a\n b\nEND:VCARD").unwrap();
        assert_eq!(lines[1].number, 3);
        assert_eq!(lines[1].text, "FN:ab");
        assert_eq!(lines[2].number, 5);
    }

    #[test]
    fn leading_continuation_is_rejected() {
        let err = unfold(" FN:John").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::IllegalContinuation);
        assert_eq!(err.line, 1);
        assert_eq!(err.raw.as_deref(), Some(" FN:John"));
    }

    #[test_log::test]
    fn long_lines_only_warn() {
        let long = format!("NOTE:{}", "x".repeat(100));
        let lines = unfold_lines(&long, true).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn quoted_printable_head_detection() {
        assert!(is_quoted_printable_head("NOTE;ENCODING=quoted-printable:x"));
        assert!(is_quoted_printable_head("NOTE;QUOTED-PRINTABLE:x"));
        assert!(!is_quoted_printable_head("NOTE:QUOTED-PRINTABLE"));
        assert!(!is_quoted_printable_head("X-A;P=\"a:b\":QUOTED-PRINTABLE"));
    }
}
