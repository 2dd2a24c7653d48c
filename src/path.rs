//! Textual XPath expressions and the camelCase node-name transform.

use std::fmt;

/// An immutable, textual XPath expression.
///
/// This is a pure string-level abstraction: no parsing or validation happens
/// here, matching the string-expression contract of the underlying XPath
/// engine. Malformed fragments surface only when the expression is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XPath {
    text: String,
}

impl XPath {
    pub fn new(text: impl Into<String>) -> Self {
        XPath { text: text.into() }
    }

    /// The expression text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns a new expression extended with a `/` separator and `suffix`.
    pub fn join(&self, suffix: &str) -> XPath {
        XPath {
            text: format!("{}/{}", self.text, suffix),
        }
    }

    /// Returns a new expression with every node name normalized to camelCase.
    ///
    /// The expression is split on `/`; empty segments (the leading slash of
    /// an absolute path, or the doubled slash of a descendant axis) pass
    /// through unchanged. A namespace prefix before the first `:` is kept
    /// verbatim, and a leading `@` attribute marker is preserved.
    pub fn to_camel_case(&self) -> XPath {
        let segments: Vec<String> = self.text.split('/').map(camel_case_segment).collect();
        XPath {
            text: segments.join("/"),
        }
    }
}

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl From<&str> for XPath {
    fn from(text: &str) -> Self {
        XPath::new(text)
    }
}

impl From<String> for XPath {
    fn from(text: String) -> Self {
        XPath::new(text)
    }
}

fn camel_case_segment(segment: &str) -> String {
    if segment.is_empty() {
        return String::new();
    }
    if let Some((prefix, name)) = segment.split_once(':') {
        return format!("{}:{}", prefix, camel_case(name));
    }
    match segment.strip_prefix('@') {
        Some(name) => format!("@{}", camel_case(name)),
        None => camel_case(segment),
    }
}

/// camelCases a single node name: the input is lowercased, the letter after
/// each of {whitespace, `_`, `-`, `.`} is uppercased, those delimiters are
/// stripped, and the very first character is forced back to lowercase.
fn camel_case(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(text.len());
    let mut upper_next = false;
    for c in text.to_lowercase().chars() {
        if c.is_whitespace() || matches!(c, '_' | '-' | '.') {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    let mut chars = out.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => out,
    }
}
