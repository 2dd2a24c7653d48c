//! # xmlquery
//!
//! A typed convenience layer over an XML DOM and XPath 1.0 engine.
//!
//! The crate wraps `sxd-document`/`sxd-xpath` behind three small surfaces:
//! building [`XPath`] expressions (including a camelCase-normalizing
//! transform over node names), evaluating them with type coercion and
//! fallback semantics, and mutating a document through XPath-addressed
//! insert and attribute operations.
//!
//! ## Quick start
//!
//! ```
//! use xmlquery::{AttributeRef, Evaluate, XPath, XmlDocument};
//!
//! # fn main() -> Result<(), xmlquery::XmlError> {
//! let doc = XmlDocument::parse(r#"<root><item name="x">5</item></root>"#)?;
//!
//! let value: Option<i32> = doc.evaluate(&XPath::new("/root/item"))?;
//! assert_eq!(value, Some(5));
//!
//! let name = doc.attribute_value(&AttributeRef::new(&XPath::new("/root/item"), "name"))?;
//! assert_eq!(name.as_deref(), Some("x"));
//!
//! let missing = doc.evaluate_or(&XPath::new("/root/missing"), -1)?;
//! assert_eq!(missing, -1);
//! # Ok(())
//! # }
//! ```
//!
//! A fallback only covers "no value present": a value that exists but cannot
//! be converted to the requested type is always an error.

pub mod attribute;
pub mod document;
pub mod error;
pub mod path;
pub mod value;

pub use attribute::AttributeRef;
pub use document::{Evaluate, NamespaceBinding, XmlDocument};
pub use error::XmlError;
pub use path::XPath;
pub use value::{FromXml, XmlValue};
