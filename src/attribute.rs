//! References to attributes of XPath-addressed nodes.

use crate::path::XPath;

/// An attribute of an XPath-addressed node.
///
/// The node path is captured by value at construction time, so transforming
/// the source expression afterwards does not affect an already-built
/// reference. The attribute name is expected to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeRef {
    node_path: String,
    name: String,
}

impl AttributeRef {
    pub fn new(node: &XPath, name: impl Into<String>) -> Self {
        AttributeRef {
            node_path: node.as_str().to_string(),
            name: name.into(),
        }
    }

    /// The XPath text of the node carrying the attribute.
    pub fn node_path(&self) -> &str {
        &self.node_path
    }

    /// The attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders this reference as an XPath expression targeting the attribute.
    pub fn to_xpath(&self) -> XPath {
        XPath::new(format!("{}/@{}", self.node_path, self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_xpath() {
        let attr = AttributeRef::new(&XPath::new("/a/b"), "id");
        assert_eq!(attr.to_xpath().as_str(), "/a/b/@id");
    }

    #[test]
    fn test_node_path_is_a_snapshot() {
        let path = XPath::new("/Root/My_Node");
        let attr = AttributeRef::new(&path, "id");
        let _ = path.to_camel_case();
        assert_eq!(attr.node_path(), "/Root/My_Node");
        assert_eq!(attr.to_xpath().as_str(), "/Root/My_Node/@id");
    }
}
