//! vCard text escaping.

/// Escapes a text value for serialization.
///
/// Escapes backslash, semicolon, comma, colon, CR and LF.
#[must_use]
pub fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            ';' | ',' | ':' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// How [`unescape`] treats backslash sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnescapeMode {
    /// Reduce `\n`, `\N`, `\r`, `\t` to control characters and `\X` to `X`.
    Full,
    /// Only collapse doubled escapes `\\n` and `\\r` to `\n` and `\r`.
    DoubleOnly,
}

/// Reverses [`escape`]. A trailing lone backslash is kept.
#[must_use]
pub fn unescape(s: &str, mode: UnescapeMode) -> String {
    match mode {
        UnescapeMode::DoubleOnly => s.replace("\\\\n", "\\n").replace("\\\\r", "\\r"),
        UnescapeMode::Full => {
            if !s.contains('\\') {
                return s.to_string();
            }

            let mut result = String::with_capacity(s.len());
            let mut chars = s.chars();
            while let Some(c) = chars.next() {
                if c != '\\' {
                    result.push(c);
                    continue;
                }
                match chars.next() {
                    Some('n' | 'N') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some(other) => result.push(other),
                    None => result.push('\\'),
                }
            }
            result
        }
    }
}

/// Splits `s` on every `sep` not preceded by a backslash. Escapes are left
/// in the returned pieces.
#[must_use]
pub fn split_unescaped(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);

    parts
}

/// Escapes a parameter value with RFC 6868 caret encoding.
///
/// Returns `(value, needs_quotes)`.
#[must_use]
pub fn escape_param_value(s: &str) -> (String, bool) {
    let mut result = String::with_capacity(s.len());
    let mut needs_quotes = false;

    for c in s.chars() {
        match c {
            '^' => result.push_str("^^"),
            '\n' => result.push_str("^n"),
            '"' => result.push_str("^'"),
            ':' | ';' | ',' => {
                result.push(c);
                needs_quotes = true;
            }
            _ if c.is_control() && c != '\t' => {}
            _ => result.push(c),
        }
    }

    (result, needs_quotes)
}

/// Decodes RFC 6868 caret escapes: `^n`, `^'` and `^^`. Any other caret is
/// kept as-is.
#[must_use]
pub fn decode_carets(s: &str) -> String {
    if !s.contains('^') {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '^' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some('n' | 'N') => {
                chars.next();
                result.push('\n');
            }
            Some('\'') => {
                chars.next();
                result.push('"');
            }
            Some('^') => {
                chars.next();
                result.push('^');
            }
            _ => result.push('^'),
        }
    }
    result
}
