//! Content-line lexer.
//!
//! Splits one logical line into group, name, parameters and value fields:
//! `[group.]name[;param[=value]]*:value[;value]*`.

use super::error::{ParseError, ParseResult};
use super::grammar::{Grammar, is_name_char, is_qsafe_char, is_safe_char, is_value_char};
use crate::rfc::vcard::codec::escape::{UnescapeMode, decode_carets, split_unescaped, unescape};
use crate::rfc::vcard::core::{VCardParameter, merge_param};

/// A parsed content line before value interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property group (e.g., "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Property name, original case.
    pub name: String,
    /// Parameters, repeated keys merged.
    pub params: Vec<VCardParameter>,
    /// Value fields split on unescaped `;` and unescaped.
    pub values: Vec<String>,
}

/// One classified logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken {
    Begin { group: Option<String> },
    End { group: Option<String> },
    Content(ContentLine),
}

/// ## Summary
/// Parses a single logical line.
///
/// Returns `None` for a blank line. `BEGIN` and `END` lines must name
/// `VCARD` and carry no parameters.
///
/// ## Errors
/// Returns [`super::ParseErrorKind::MalformedLine`] when the line does not
/// match the content-line grammar, and
/// [`super::ParseErrorKind::UnexpectedToken`] when BEGIN or END names
/// anything but `VCARD`.
pub fn parse_line(text: &str, grammar: Grammar, line_num: usize) -> ParseResult<Option<LineToken>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let colon_pos = find_value_separator(text)
        .ok_or_else(|| ParseError::malformed(line_num, "missing colon separator", text))?;
    let (head, value) = text.split_at(colon_pos);
    let value = &value[1..];

    let (group, head) = parse_group(head);
    let (name, params_str) = match head.split_once(';') {
        Some((name, params)) => (name, Some(params)),
        None => (head, None),
    };

    if name.is_empty() || !name.chars().all(is_name_char) {
        return Err(ParseError::malformed(
            line_num,
            format!("invalid property name: {name:?}"),
            text,
        ));
    }

    let group = group.map(str::to_string);
    let is_begin = name.eq_ignore_ascii_case("BEGIN");
    if is_begin || name.eq_ignore_ascii_case("END") {
        if params_str.is_some() {
            return Err(ParseError::malformed(
                line_num,
                format!("{name} takes no parameters"),
                text,
            ));
        }
        if !value.trim().eq_ignore_ascii_case("VCARD") {
            return Err(ParseError::unexpected(line_num, "VCARD", value).with_raw(text));
        }
        return Ok(Some(if is_begin {
            LineToken::Begin { group }
        } else {
            LineToken::End { group }
        }));
    }

    let params = match params_str {
        Some(s) => parse_parameters(s, grammar, line_num, text)?,
        None => Vec::new(),
    };

    if let Some(bad) = value.chars().find(|&c| !is_value_char(c)) {
        return Err(ParseError::malformed(
            line_num,
            format!("control character {bad:?} in value"),
            text,
        ));
    }

    let values = split_unescaped(value, ';')
        .into_iter()
        .map(|v| unescape(v, UnescapeMode::Full))
        .collect();

    Ok(Some(LineToken::Content(ContentLine {
        group,
        name: name.to_string(),
        params,
        values,
    })))
}

/// Finds the colon that separates name/params from value, skipping quoted
/// parameter values.
fn find_value_separator(line: &str) -> Option<usize> {
    let mut in_quotes = false;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(i),
            _ => {}
        }
    }

    None
}

/// Splits an optional `group.` prefix off the name.
fn parse_group(head: &str) -> (Option<&str>, &str) {
    let name_end = head.find(';').unwrap_or(head.len());
    if let Some(dot_pos) = head[..name_end].find('.') {
        let group = &head[..dot_pos];
        if !group.is_empty() && group.chars().all(is_name_char) {
            return (Some(group), &head[dot_pos + 1..]);
        }
    }
    (None, head)
}

/// Byte cursor over the parameter section.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
        let rest = &self.src[self.pos..];
        let len = rest.find(|c: char| !f(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn is_done(&self) -> bool {
        self.pos >= self.src.len()
    }
}

fn parse_parameters(
    s: &str,
    grammar: Grammar,
    line_num: usize,
    raw: &str,
) -> ParseResult<Vec<VCardParameter>> {
    let mut params = Vec::new();
    let mut cursor = Cursor::new(s);

    loop {
        let param = match grammar {
            Grammar::Legacy => parse_legacy_parameter(&mut cursor, line_num, raw)?,
            Grammar::Modern => parse_modern_parameter(&mut cursor, line_num, raw)?,
        };
        merge_param(&mut params, param);

        if cursor.is_done() {
            break;
        }
        if !cursor.eat(';') {
            return Err(ParseError::malformed(
                line_num,
                "expected ';' between parameters",
                raw,
            ));
        }
    }

    Ok(params)
}

fn parse_param_name<'a>(cursor: &mut Cursor<'a>, line_num: usize, raw: &str) -> ParseResult<&'a str> {
    let name = cursor.take_while(is_name_char);
    if name.is_empty() {
        return Err(ParseError::malformed(line_num, "empty parameter name", raw));
    }
    Ok(name)
}

fn parse_quoted(cursor: &mut Cursor<'_>, line_num: usize, raw: &str) -> ParseResult<String> {
    let value = cursor.take_while(is_qsafe_char);
    if !cursor.eat('"') {
        return Err(ParseError::malformed(
            line_num,
            "unterminated quoted parameter value",
            raw,
        ));
    }
    Ok(value.to_string())
}

/// 2.1 parameter: `name=value` or a bare `name` token. Commas stay in the
/// value and carets are literal.
fn parse_legacy_parameter(
    cursor: &mut Cursor<'_>,
    line_num: usize,
    raw: &str,
) -> ParseResult<VCardParameter> {
    let name = parse_param_name(cursor, line_num, raw)?;
    if !cursor.eat('=') {
        return Ok(VCardParameter::bare(name));
    }

    let value = if cursor.eat('"') {
        parse_quoted(cursor, line_num, raw)?
    } else {
        let value = cursor.take_while(|c| c != ';');
        if value.chars().any(|c| !is_qsafe_char(c) && c != '"') {
            return Err(ParseError::malformed(
                line_num,
                format!("invalid character in parameter {name}"),
                raw,
            ));
        }
        value.to_string()
    };

    Ok(VCardParameter::new(name, value))
}

/// 3.0/4.0 parameter: `name=value[,value]*`, values optionally quoted and
/// caret-escaped.
fn parse_modern_parameter(
    cursor: &mut Cursor<'_>,
    line_num: usize,
    raw: &str,
) -> ParseResult<VCardParameter> {
    let name = parse_param_name(cursor, line_num, raw)?;
    if !cursor.eat('=') {
        return Err(ParseError::malformed(
            line_num,
            format!("parameter {name} has no value"),
            raw,
        ));
    }

    let mut values = Vec::new();
    loop {
        let value = if cursor.eat('"') {
            parse_quoted(cursor, line_num, raw)?
        } else {
            cursor.take_while(is_safe_char).to_string()
        };
        values.push(decode_carets(&value));

        if !cursor.eat(',') {
            break;
        }
    }

    if !cursor.is_done() && cursor.peek() != Some(';') {
        return Err(ParseError::malformed(
            line_num,
            format!("invalid character in parameter {name}"),
            raw,
        ));
    }

    Ok(VCardParameter::multi(name, values))
}
