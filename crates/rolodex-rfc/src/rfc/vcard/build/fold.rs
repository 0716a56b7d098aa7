//! Line folding.

/// Maximum octets per physical line, line break excluded.
const MAX_LINE_OCTETS: usize = 75;

/// ## Summary
/// Folds a logical line into physical lines of at most 75 octets joined by
/// `\n`.
///
/// Plain lines continue with a leading space and never split a UTF-8
/// sequence. Quoted-printable lines end every physical line but the last with
/// a soft break `=` and never split an `=XX` escape. A name and parameter list
/// too long for one line folds with space continuations before the first soft
/// break.
#[must_use]
pub fn fold_line(line: &str, quoted: bool) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }
    if quoted {
        fold_quoted(line)
    } else {
        fold_plain(line)
    }
}

fn fold_plain(line: &str) -> String {
    let mut result = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS) * 2);
    let mut pos = 0;

    while pos < line.len() {
        let max_len = if pos == 0 {
            MAX_LINE_OCTETS
        } else {
            MAX_LINE_OCTETS - 1
        };

        let mut end = (pos + max_len).min(line.len());
        while end > pos && !line.is_char_boundary(end) {
            end -= 1;
        }

        if pos > 0 {
            result.push_str("\n ");
        }
        result.push_str(&line[pos..end]);
        pos = end;
    }

    result
}

fn fold_quoted(line: &str) -> String {
    let bytes = line.as_bytes();
    let head_end = value_start(line);

    let mut result = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS) * 2);
    let mut pos = 0;

    while pos < bytes.len() {
        // Name and parameters continue with a leading space; soft breaks
        // start once the colon is on the line.
        let prefix = if pos > 0 && pos < head_end { " " } else { "" };
        let budget = MAX_LINE_OCTETS - prefix.len();

        if bytes.len() - pos <= budget {
            result.push_str(prefix);
            result.push_str(&line[pos..]);
            break;
        }

        let soft = pos + budget - 1 > head_end;
        let mut end = if soft {
            let mut end = pos + budget - 1;
            if bytes[end - 1] == b'=' && end > head_end {
                end -= 1;
            } else if bytes[end - 2] == b'=' && end - 1 > head_end {
                end -= 2;
            }
            end
        } else {
            (pos + budget).min(head_end - 1)
        };
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        if !soft {
            // A head line ending in `=` would read back as a soft break.
            while end > pos + 1 && bytes[end - 1] == b'=' {
                end -= 1;
            }
        }
        if end <= pos {
            end = pos + 1;
            while !line.is_char_boundary(end) {
                end += 1;
            }
        }

        result.push_str(prefix);
        result.push_str(&line[pos..end]);
        result.push_str(if soft { "=\n" } else { "\n" });
        pos = end;
    }

    result
}

/// Byte offset just past the first unquoted `:`, or the line length.
fn value_start(line: &str) -> usize {
    let mut in_quotes = false;
    line.char_indices()
        .find(|&(_, c)| {
            if c == '"' {
                in_quotes = !in_quotes;
            }
            c == ':' && !in_quotes
        })
        .map_or(line.len(), |(i, _)| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::vcard::parse::unfold;

    fn physical(folded: &str) -> Vec<&str> {
        folded.split('\n').collect()
    }

    fn unfolded(folded: &str) -> String {
        let lines = unfold(folded).unwrap();
        assert_eq!(lines.len(), 1);
        lines[0].text.clone()
    }

    #[test]
    fn short_line_unchanged() {
        assert_eq!(fold_line("FN:John", false), "FN:John");
    }

    #[test]
    fn plain_fold_limits_octets() {
        let line = format!("NOTE:{}", "x".repeat(200));
        let folded = fold_line(&line, false);
        for (i, part) in physical(&folded).iter().enumerate() {
            assert!(part.len() <= 75, "line {i} has {} octets", part.len());
            if i > 0 {
                assert!(part.starts_with(' '));
            }
        }
        assert_eq!(unfolded(&folded), line);
    }

    #[test]
    fn plain_fold_respects_utf8() {
        let line = format!("FN:{}", "日本語".repeat(30));
        let folded = fold_line(&line, false);
        for part in physical(&folded) {
            assert!(part.len() <= 75);
        }
        assert_eq!(unfolded(&folded), line);
    }

    #[test]
    fn quoted_fold_uses_soft_breaks() {
        let line = format!("NOTE;ENCODING=QUOTED-PRINTABLE:{}", "=D0=98".repeat(40));
        let folded = fold_line(&line, true);
        let parts = physical(&folded);
        assert!(parts.len() > 1);
        for part in &parts[..parts.len() - 1] {
            assert!(part.len() <= 75);
            assert!(part.ends_with('='));
        }
        assert_eq!(unfolded(&folded), line);
    }

    #[test]
    fn quoted_fold_caps_long_head() {
        let head = format!("X-LONG;X-PARAM={};ENCODING=QUOTED-PRINTABLE:", "p".repeat(80));
        let line = format!("{head}{}", "=41".repeat(30));
        let folded = fold_line(&line, true);
        for part in physical(&folded) {
            assert!(part.len() <= 75, "{part:?} has {} octets", part.len());
        }
        assert_eq!(unfolded(&folded), line);
    }

    #[test]
    fn quoted_fold_caps_long_group() {
        let line = format!(
            "{}.NOTE;ENCODING=QUOTED-PRINTABLE;CHARSET=UTF-8;LANGUAGE=en:caf=C3=A9 {}",
            "g".repeat(40),
            "text ".repeat(20)
        );
        let folded = fold_line(&line, true);
        let parts = physical(&folded);
        assert!(parts[1].starts_with(' '));
        for part in &parts {
            assert!(part.len() <= 75, "{part:?} has {} octets", part.len());
        }
        assert_eq!(unfolded(&folded), line);
    }

    #[test]
    fn quoted_head_lines_never_end_in_equals() {
        // Splitting right after `ENCODING=` must not leave a soft break.
        let name = format!("X-{}", "A".repeat(63));
        let line = format!("{name};ENCODING=QUOTED-PRINTABLE;X-P={}:{}", "q".repeat(70), "=42".repeat(30));
        assert_eq!(line.find('=').map(|i| i + 1), Some(75));
        let folded = fold_line(&line, true);
        let parts = physical(&folded);
        assert!(!parts[0].ends_with('='));
        for part in &parts {
            assert!(part.len() <= 75);
        }
        assert_eq!(unfolded(&folded), line);
    }
}
