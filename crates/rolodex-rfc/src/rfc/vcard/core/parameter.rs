//! vCard parameter types.

/// A vCard parameter.
///
/// Parameters can have multiple values (e.g., TYPE=home,work). An empty value
/// list is a 2.1 bare token such as `HOME` or `QUOTED-PRINTABLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCardParameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    /// Parameter values, original case, quotes removed.
    pub values: Vec<String>,
}

impl VCardParameter {
    /// Creates a new parameter with a single value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// Creates a parameter with multiple values.
    #[must_use]
    pub fn multi(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Creates a valueless parameter (2.1 bare token).
    #[must_use]
    pub fn bare(name: impl Into<String>) -> Self {
        Self::multi(name, Vec::new())
    }

    /// Returns whether this is a bare token.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the values joined with `,`, or `None` for a bare token.
    #[must_use]
    pub fn value(&self) -> Option<String> {
        (!self.values.is_empty()).then(|| self.values.join(","))
    }

    /// Returns the first value, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Returns every value, with comma-joined legacy values split apart.
    pub fn split_values(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Returns whether the parameter has the specified value (case-insensitive).
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.split_values().any(|v| v.eq_ignore_ascii_case(value))
    }

    /// Creates a TYPE parameter.
    #[must_use]
    pub fn type_param(value: impl Into<String>) -> Self {
        Self::new("TYPE", value)
    }

    /// Creates a PREF parameter with priority (1-100).
    #[must_use]
    pub fn pref(priority: u8) -> Self {
        Self::new("PREF", priority.to_string())
    }

    /// Creates a VALUE parameter specifying the value type.
    #[must_use]
    pub fn value_type(type_name: impl Into<String>) -> Self {
        Self::new("VALUE", type_name)
    }

    /// Creates an ENCODING parameter.
    #[must_use]
    pub fn encoding(name: impl Into<String>) -> Self {
        Self::new("ENCODING", name)
    }

    /// Creates a CHARSET parameter.
    #[must_use]
    pub fn charset(label: impl Into<String>) -> Self {
        Self::new("CHARSET", label)
    }
}

/// Adds `param` to `params`, merging repeated keys into the first occurrence.
///
/// Values of a repeated key are appended in order, so `TYPE=home;TYPE=work`
/// and `TYPE=home,work` produce the same parameter list.
pub fn merge_param(params: &mut Vec<VCardParameter>, param: VCardParameter) {
    if let Some(existing) = params.iter_mut().find(|p| p.name == param.name) {
        existing.values.extend(param.values);
    } else {
        params.push(param);
    }
}

/// Finds a parameter by name (case-insensitive).
#[must_use]
pub fn find_param<'a>(params: &'a [VCardParameter], name: &str) -> Option<&'a VCardParameter> {
    params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
