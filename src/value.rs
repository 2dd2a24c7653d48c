//! Scalars extracted from XPath evaluation results and their coercion to
//! requested Rust types.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use sxd_xpath::Value;

use crate::error::XmlError;

/// A scalar produced by an XPath evaluation, after node-set resolution.
///
/// Mirrors the non-node arms of the engine's variant result; node-sets are
/// resolved to node string values at extraction time and never reach callers.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl XmlValue {
    /// The lexical form of the value, as XPath `string()` renders it.
    pub fn lexical(&self) -> String {
        match self {
            XmlValue::String(s) => s.clone(),
            XmlValue::Number(n) => n.to_string(),
            XmlValue::Boolean(b) => b.to_string(),
        }
    }
}

/// Resolves an evaluation result to a single scalar.
///
/// A node-set resolves to the string value of its first node in document
/// order (an attribute node yields its value), or `None` when empty. Scalar
/// results pass through unchanged.
pub(crate) fn extract_scalar(value: &Value<'_>) -> Option<XmlValue> {
    match value {
        Value::Nodeset(nodes) => nodes
            .document_order_first()
            .map(|node| XmlValue::String(node.string_value())),
        Value::String(s) => Some(XmlValue::String(s.clone())),
        Value::Number(n) => Some(XmlValue::Number(*n)),
        Value::Boolean(b) => Some(XmlValue::Boolean(*b)),
    }
}

/// Resolves an evaluation result to the full sequence of scalars.
///
/// Node-sets map every node to its string value, preserving document order.
/// A scalar result becomes a one-element sequence, so a multi-value entry
/// point used against a scalar-producing expression still behaves sensibly.
pub(crate) fn extract_sequence(value: &Value<'_>) -> Vec<XmlValue> {
    match value {
        Value::Nodeset(nodes) => nodes
            .document_order()
            .iter()
            .map(|node| XmlValue::String(node.string_value()))
            .collect(),
        other => extract_scalar(other).into_iter().collect(),
    }
}

/// Conversion from an extracted scalar to a concrete Rust type.
///
/// A present but unconvertible value is always an error; "no value present"
/// is handled before coercion and never reaches these implementations.
pub trait FromXml: Sized {
    fn from_xml(value: &XmlValue) -> Result<Self, XmlError>;
}

fn conversion_error(value: &XmlValue, target: &'static str, message: &str) -> XmlError {
    XmlError::Conversion {
        value: value.lexical(),
        target,
        message: message.to_string(),
    }
}

impl FromXml for String {
    fn from_xml(value: &XmlValue) -> Result<Self, XmlError> {
        Ok(value.lexical())
    }
}

impl FromXml for bool {
    fn from_xml(value: &XmlValue) -> Result<Self, XmlError> {
        match value {
            XmlValue::Boolean(b) => Ok(*b),
            // XPath 1.0 truthiness for numeric results.
            XmlValue::Number(n) => Ok(*n != 0.0 && !n.is_nan()),
            XmlValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(conversion_error(value, "bool", "expected true/false or 1/0")),
            },
        }
    }
}

macro_rules! impl_from_xml_for_int {
    ($($ty:ty),* $(,)?) => {$(
        impl FromXml for $ty {
            fn from_xml(value: &XmlValue) -> Result<Self, XmlError> {
                match value {
                    XmlValue::String(s) => s.trim().parse::<$ty>().map_err(|e| {
                        conversion_error(value, stringify!($ty), &e.to_string())
                    }),
                    XmlValue::Number(n) => {
                        if !n.is_finite() || n.fract() != 0.0 {
                            return Err(conversion_error(
                                value,
                                stringify!($ty),
                                "not an integral number",
                            ));
                        }
                        if *n < <$ty>::MIN as f64 || *n > <$ty>::MAX as f64 {
                            return Err(conversion_error(value, stringify!($ty), "out of range"));
                        }
                        Ok(*n as $ty)
                    }
                    XmlValue::Boolean(b) => Ok(if *b { 1 } else { 0 }),
                }
            }
        }
    )*};
}

impl_from_xml_for_int!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! impl_from_xml_for_float {
    ($($ty:ty),* $(,)?) => {$(
        impl FromXml for $ty {
            fn from_xml(value: &XmlValue) -> Result<Self, XmlError> {
                match value {
                    XmlValue::String(s) => s.trim().parse::<$ty>().map_err(|e| {
                        conversion_error(value, stringify!($ty), &e.to_string())
                    }),
                    XmlValue::Number(n) => Ok(*n as $ty),
                    XmlValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
                }
            }
        }
    )*};
}

impl_from_xml_for_float!(f32, f64);

impl FromXml for NaiveDate {
    fn from_xml(value: &XmlValue) -> Result<Self, XmlError> {
        let XmlValue::String(s) = value else {
            return Err(conversion_error(value, "NaiveDate", "expected date text"));
        };
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| conversion_error(value, "NaiveDate", &e.to_string()))
    }
}

impl FromXml for NaiveDateTime {
    fn from_xml(value: &XmlValue) -> Result<Self, XmlError> {
        let XmlValue::String(s) = value else {
            return Err(conversion_error(
                value,
                "NaiveDateTime",
                "expected date-time text",
            ));
        };
        let text = s.trim();
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
            .map_err(|e| conversion_error(value, "NaiveDateTime", &e.to_string()))
    }
}

impl FromXml for DateTime<FixedOffset> {
    fn from_xml(value: &XmlValue) -> Result<Self, XmlError> {
        let XmlValue::String(s) = value else {
            return Err(conversion_error(
                value,
                "DateTime<FixedOffset>",
                "expected RFC 3339 text",
            ));
        };
        DateTime::parse_from_rfc3339(s.trim())
            .map_err(|e| conversion_error(value, "DateTime<FixedOffset>", &e.to_string()))
    }
}
