//! Character classes of the vCard content-line grammar.

/// Parameter syntax in effect for a content line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// vCard 2.1: bare-token parameters (`TEL;HOME;VOICE:`), no caret escapes.
    Legacy,
    /// vCard 3.0 and 4.0: `key=value` only, comma-joined multi-values,
    /// quoted values, RFC 6868 caret escapes.
    Modern,
}

impl Grammar {
    #[must_use]
    pub const fn allows_bare_tokens(self) -> bool {
        matches!(self, Self::Legacy)
    }

    #[must_use]
    pub const fn splits_param_commas(self) -> bool {
        matches!(self, Self::Modern)
    }
}

/// Group and name characters: alphanumerics, `-`, and `_`.
#[must_use]
pub fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Whitespace allowed inside values: space and horizontal tab.
#[must_use]
pub const fn is_wsp(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Any character allowed in a quoted parameter value.
#[must_use]
pub fn is_qsafe_char(c: char) -> bool {
    (is_wsp(c) || !c.is_control()) && c != '"'
}

/// Any character allowed in an unquoted parameter value.
#[must_use]
pub fn is_safe_char(c: char) -> bool {
    is_qsafe_char(c) && !matches!(c, ';' | ':' | ',')
}

/// Any character allowed in a property value.
#[must_use]
pub fn is_value_char(c: char) -> bool {
    is_wsp(c) || !c.is_control()
}
