//! Document loading, typed XPath evaluation and XPath-addressed mutation.

use log::debug;
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Document, Element};
use sxd_document::{Package, QName, parser, writer};
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};

use crate::attribute::AttributeRef;
use crate::error::XmlError;
use crate::path::XPath;
use crate::value::{self, FromXml};

/// A prefix-to-URI mapping registered for XPath evaluation.
///
/// Bindings are injected at construction time and stay immutable for the
/// document's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    prefix: String,
    uri: String,
}

impl NamespaceBinding {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        NamespaceBinding {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Typed XPath evaluation against a loaded document.
pub trait Evaluate {
    /// Evaluates `path` and coerces the result to `T`.
    ///
    /// Returns `Ok(None)` when the expression matches nothing. A present but
    /// unconvertible value is an error, never `None`.
    fn evaluate<T: FromXml>(&self, path: &XPath) -> Result<Option<T>, XmlError>;

    /// Evaluates `path` and coerces every matched value to `T` independently,
    /// preserving document order. The first conversion failure aborts the
    /// whole call.
    fn evaluate_many<T: FromXml>(&self, path: &XPath) -> Result<Vec<T>, XmlError>;

    /// Like [`evaluate`](Evaluate::evaluate), substituting `fallback` when no
    /// value is present. A fallback only covers "value absent": conversion
    /// failures still propagate.
    fn evaluate_or<T: FromXml>(&self, path: &XPath, fallback: T) -> Result<T, XmlError> {
        Ok(self.evaluate(path)?.unwrap_or(fallback))
    }

    /// Like [`evaluate_or`](Evaluate::evaluate_or) with `T::default()` as the
    /// fallback.
    fn evaluate_or_default<T: FromXml + Default>(&self, path: &XPath) -> Result<T, XmlError> {
        Ok(self.evaluate(path)?.unwrap_or_default())
    }
}

/// An XML document with a fixed set of namespace bindings.
///
/// Wraps the host DOM and XPath engine behind typed evaluation and
/// XPath-addressed mutation. Mutation takes `&mut self`; the underlying DOM
/// carries no synchronization, so single-writer discipline is enforced by
/// the borrow checker rather than locks.
pub struct XmlDocument {
    package: Package,
    namespaces: Vec<NamespaceBinding>,
}

impl XmlDocument {
    /// Parses a document with no namespace bindings.
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        Self::parse_with_namespaces(xml, Vec::new())
    }

    /// Parses a document and registers `namespaces` for its lifetime.
    pub fn parse_with_namespaces(
        xml: &str,
        namespaces: Vec<NamespaceBinding>,
    ) -> Result<Self, XmlError> {
        let package = parser::parse(xml).map_err(|e| XmlError::Parse(e.to_string()))?;
        Ok(XmlDocument {
            package,
            namespaces,
        })
    }

    /// The registered namespace bindings.
    pub fn namespaces(&self) -> &[NamespaceBinding] {
        &self.namespaces
    }

    /// The local name of the document element.
    pub fn root_name(&self) -> Option<String> {
        let document = self.package.as_document();
        document
            .root()
            .children()
            .into_iter()
            .find_map(|child| match child {
                ChildOfRoot::Element(element) => Some(element.name().local_part().to_string()),
                _ => None,
            })
    }

    /// Serializes the document to UTF-8 XML text.
    pub fn xml(&self) -> Result<String, XmlError> {
        let document = self.package.as_document();
        let mut buffer = Vec::new();
        writer::format_document(&document, &mut buffer)
            .map_err(|e| XmlError::Serialize(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| XmlError::Serialize(e.to_string()))
    }

    /// String-typed evaluation shorthand.
    pub fn value_of(&self, path: &XPath) -> Result<Option<String>, XmlError> {
        self.evaluate(path)
    }

    /// Evaluates the attribute addressed by `attribute` as a string.
    pub fn attribute_value(&self, attribute: &AttributeRef) -> Result<Option<String>, XmlError> {
        self.evaluate(&attribute.to_xpath())
    }

    /// Appends every top-level node of `fragment` as children of the first
    /// node located by any of `candidates`.
    ///
    /// Candidates are tried in order and the first one that resolves to a
    /// node wins; when none resolve the call is a no-op. The fragment may
    /// use any of the registered namespace prefixes.
    pub fn append_children(
        &mut self,
        fragment: &str,
        candidates: &[XPath],
    ) -> Result<(), XmlError> {
        let source = self.parse_fragment(fragment)?;
        let Some(node) = self.locate_first_of(candidates)? else {
            debug!("append_children: no candidate expression matched, skipping");
            return Ok(());
        };
        let Node::Element(parent) = node else {
            debug!("append_children: located node is not an element, skipping");
            return Ok(());
        };
        let document = self.package.as_document();
        let source_document = source.as_document();
        for child in fragment_children(&source_document) {
            if let Some(imported) = import_child(&document, child) {
                parent.append_child(imported);
            }
        }
        Ok(())
    }

    /// Inserts the first element of `fragment` as the preceding sibling of
    /// the first node located by any of `candidates`. No-op when none match.
    pub fn insert_before(&mut self, fragment: &str, candidates: &[XPath]) -> Result<(), XmlError> {
        self.insert_sibling(fragment, candidates, SiblingPosition::Before)
    }

    /// Inserts the first element of `fragment` as the following sibling of
    /// the last node matched by the first resolving candidate. No-op when
    /// none match.
    pub fn insert_after(&mut self, fragment: &str, candidates: &[XPath]) -> Result<(), XmlError> {
        self.insert_sibling(fragment, candidates, SiblingPosition::After)
    }

    /// Replaces the content of the first node matched by `path` with `value`.
    ///
    /// An element target has all its children replaced by a single text
    /// node; an attribute target has its value rewritten. No-op when the
    /// expression matches nothing.
    pub fn set_node_text(&mut self, path: &XPath, value: &str) -> Result<(), XmlError> {
        let Some(node) = self.locate_all(path)?.into_iter().next() else {
            debug!("set_node_text: '{}' matched nothing, skipping", path);
            return Ok(());
        };
        let document = self.package.as_document();
        match node {
            Node::Element(element) => {
                for child in element.children() {
                    remove_child(child);
                }
                element.append_child(document.create_text(value));
            }
            Node::Attribute(attribute) => {
                if let Some(parent) = attribute.parent() {
                    set_named_attribute(parent, attribute.name(), value);
                }
            }
            Node::Text(text) => text.set_text(value),
            _ => debug!("set_node_text: unsupported node kind for '{}'", path),
        }
        Ok(())
    }

    /// Creates or overwrites the referenced attribute on the first node
    /// matched by the reference's node path.
    ///
    /// A node path that matches nothing is a no-op rather than an error.
    pub fn set_attribute(&mut self, attribute: &AttributeRef, value: &str) -> Result<(), XmlError> {
        let Some(element) = self.locate_element(attribute.node_path())? else {
            debug!(
                "set_attribute: node '{}' not found, skipping",
                attribute.node_path()
            );
            return Ok(());
        };
        element.set_attribute_value(attribute.name(), value);
        Ok(())
    }

    /// Updates the referenced attribute only where it already exists; a
    /// missing attribute or node is a no-op. Asymmetric with
    /// [`set_attribute`](XmlDocument::set_attribute), which creates the
    /// attribute on demand.
    pub fn update_attribute(
        &mut self,
        attribute: &AttributeRef,
        value: &str,
    ) -> Result<(), XmlError> {
        let Some(element) = self.locate_element(attribute.node_path())? else {
            debug!(
                "update_attribute: node '{}' not found, skipping",
                attribute.node_path()
            );
            return Ok(());
        };
        if element.attribute(attribute.name()).is_some() {
            element.set_attribute_value(attribute.name(), value);
        } else {
            debug!(
                "update_attribute: attribute '{}' not present on '{}', skipping",
                attribute.name(),
                attribute.node_path()
            );
        }
        Ok(())
    }

    fn raw_evaluate(&self, path: &XPath) -> Result<Value<'_>, XmlError> {
        debug!("evaluating XPath '{}'", path);
        let factory = Factory::new();
        let compiled = factory
            .build(path.as_str())
            .map_err(|e| XmlError::InvalidExpression {
                expression: path.as_str().to_string(),
                message: e.to_string(),
            })?
            .ok_or_else(|| XmlError::InvalidExpression {
                expression: path.as_str().to_string(),
                message: "empty expression".to_string(),
            })?;
        let mut context = Context::new();
        for binding in &self.namespaces {
            context.set_namespace(binding.prefix(), binding.uri());
        }
        let document = self.package.as_document();
        compiled
            .evaluate(&context, document.root())
            .map_err(|e| XmlError::Evaluation {
                expression: path.as_str().to_string(),
                message: e.to_string(),
            })
    }

    /// All nodes matched by `path` in document order; a non-node-set result
    /// counts as "no match".
    fn locate_all(&self, path: &XPath) -> Result<Vec<Node<'_>>, XmlError> {
        match self.raw_evaluate(path)? {
            Value::Nodeset(nodes) => Ok(nodes.document_order()),
            _ => Ok(Vec::new()),
        }
    }

    fn locate_first_of(&self, candidates: &[XPath]) -> Result<Option<Node<'_>>, XmlError> {
        for candidate in candidates {
            if let Some(node) = self.locate_all(candidate)?.into_iter().next() {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    fn locate_last_of(&self, candidates: &[XPath]) -> Result<Option<Node<'_>>, XmlError> {
        for candidate in candidates {
            let mut nodes = self.locate_all(candidate)?;
            if let Some(node) = nodes.pop() {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    fn locate_element(&self, path_text: &str) -> Result<Option<Element<'_>>, XmlError> {
        let nodes = self.locate_all(&XPath::new(path_text))?;
        Ok(nodes.into_iter().find_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        }))
    }

    fn insert_sibling(
        &mut self,
        fragment: &str,
        candidates: &[XPath],
        position: SiblingPosition,
    ) -> Result<(), XmlError> {
        let source = self.parse_fragment(fragment)?;
        let target = match position {
            SiblingPosition::Before => self.locate_first_of(candidates)?,
            SiblingPosition::After => self.locate_last_of(candidates)?,
        };
        let Some(Node::Element(anchor)) = target else {
            debug!("insert_sibling: no element target located, skipping");
            return Ok(());
        };
        let source_document = source.as_document();
        let Some(new_element) = first_fragment_element(&source_document) else {
            debug!("insert_sibling: fragment contains no element, skipping");
            return Ok(());
        };
        let document = self.package.as_document();
        let imported = import_element(&document, new_element);
        insert_adjacent(anchor, imported, position);
        Ok(())
    }

    /// Wraps a fragment in a dummy root that declares every registered
    /// namespace, so the fragment can use the same prefixes as expressions.
    fn parse_fragment(&self, fragment: &str) -> Result<Package, XmlError> {
        let declarations: String = self
            .namespaces
            .iter()
            .map(|b| format!(" xmlns:{}=\"{}\"", b.prefix(), b.uri()))
            .collect();
        let wrapped = format!("<fragment{declarations}>{fragment}</fragment>");
        parser::parse(&wrapped).map_err(|e| XmlError::Parse(e.to_string()))
    }
}

impl Evaluate for XmlDocument {
    fn evaluate<T: FromXml>(&self, path: &XPath) -> Result<Option<T>, XmlError> {
        let result = self.raw_evaluate(path)?;
        match value::extract_scalar(&result) {
            Some(scalar) => Ok(Some(T::from_xml(&scalar)?)),
            None => Ok(None),
        }
    }

    fn evaluate_many<T: FromXml>(&self, path: &XPath) -> Result<Vec<T>, XmlError> {
        let result = self.raw_evaluate(path)?;
        value::extract_sequence(&result)
            .iter()
            .map(T::from_xml)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SiblingPosition {
    Before,
    After,
}

/// The top-level children of a parsed fragment (the children of its dummy
/// root element).
fn fragment_children<'d>(document: &Document<'d>) -> Vec<ChildOfElement<'d>> {
    document
        .root()
        .children()
        .into_iter()
        .find_map(|child| match child {
            ChildOfRoot::Element(element) => Some(element.children()),
            _ => None,
        })
        .unwrap_or_default()
}

fn first_fragment_element<'d>(document: &Document<'d>) -> Option<Element<'d>> {
    fragment_children(document)
        .into_iter()
        .find_map(|child| match child {
            ChildOfElement::Element(element) => Some(element),
            _ => None,
        })
}

/// Deep-copies a foreign node into `target`'s document. Nodes cannot move
/// across packages, so importing is a recursive re-creation.
/// Whitespace-only text between fragment nodes is dropped.
fn import_child<'a, 'd>(
    target: &Document<'d>,
    child: ChildOfElement<'a>,
) -> Option<ChildOfElement<'d>> {
    match child {
        ChildOfElement::Element(element) => Some(import_element(target, element).into()),
        ChildOfElement::Text(text) => {
            if text.text().trim().is_empty() {
                None
            } else {
                Some(target.create_text(text.text()).into())
            }
        }
        ChildOfElement::Comment(comment) => Some(target.create_comment(comment.text()).into()),
        ChildOfElement::ProcessingInstruction(pi) => Some(
            target
                .create_processing_instruction(pi.target(), pi.value())
                .into(),
        ),
    }
}

fn import_element<'a, 'd>(target: &Document<'d>, source: Element<'a>) -> Element<'d> {
    let element = create_named_element(target, source.name());
    for attribute in source.attributes() {
        set_named_attribute(element, attribute.name(), attribute.value());
    }
    for child in source.children() {
        if let Some(imported) = import_child(target, child) {
            element.append_child(imported);
        }
    }
    element
}

fn create_named_element<'a, 'd>(target: &Document<'d>, name: QName<'a>) -> Element<'d> {
    match name.namespace_uri() {
        Some(uri) => target.create_element((uri, name.local_part())),
        None => target.create_element(name.local_part()),
    }
}

fn set_named_attribute(element: Element<'_>, name: QName<'_>, value: &str) {
    match name.namespace_uri() {
        Some(uri) => element.set_attribute_value((uri, name.local_part()), value),
        None => element.set_attribute_value(name.local_part(), value),
    };
}

/// Splices `new_element` next to `anchor` by rebuilding the parent's child
/// list in order. The DOM only appends, so ordered insertion re-appends the
/// existing children around the new node.
fn insert_adjacent<'d>(anchor: Element<'d>, new_element: Element<'d>, position: SiblingPosition) {
    use sxd_document::dom::ParentOfChild;

    let Some(parent) = anchor.parent() else {
        return;
    };
    match parent {
        ParentOfChild::Element(parent) => {
            let children = parent.children();
            for child in &children {
                remove_child(*child);
            }
            for child in children {
                if position == SiblingPosition::Before && is_anchor(child, anchor) {
                    parent.append_child(new_element);
                }
                parent.append_child(child);
                if position == SiblingPosition::After && is_anchor(child, anchor) {
                    parent.append_child(new_element);
                }
            }
        }
        // A sibling of the document element would be a second document
        // element, which the DOM rejects.
        ParentOfChild::Root(_) => {
            debug!("insert_sibling: target is the document element, skipping");
        }
    }
}

fn is_anchor(child: ChildOfElement<'_>, anchor: Element<'_>) -> bool {
    matches!(child, ChildOfElement::Element(e) if e == anchor)
}

fn remove_child(child: ChildOfElement<'_>) {
    match child {
        ChildOfElement::Element(e) => e.remove_from_parent(),
        ChildOfElement::Text(t) => t.remove_from_parent(),
        ChildOfElement::Comment(c) => c.remove_from_parent(),
        ChildOfElement::ProcessingInstruction(p) => p.remove_from_parent(),
    }
}
