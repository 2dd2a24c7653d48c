//! End-to-end tests for the XPath-addressed mutation operations.

use xmlquery::{AttributeRef, Evaluate, NamespaceBinding, XPath, XmlDocument};

fn items(doc: &XmlDocument, path: &str) -> Vec<i32> {
    doc.evaluate_many(&XPath::new(path)).unwrap()
}

#[test]
fn append_children_appends_every_fragment_node() {
    let mut doc = XmlDocument::parse("<root><items><item>1</item></items></root>").unwrap();
    doc.append_children("<item>2</item><item>3</item>", &[XPath::new("/root/items")])
        .unwrap();
    assert_eq!(items(&doc, "/root/items/item"), vec![1, 2, 3]);
}

#[test]
fn append_children_uses_first_resolving_candidate() {
    let mut doc = XmlDocument::parse("<root><a/><b/></root>").unwrap();
    doc.append_children(
        "<item>9</item>",
        &[
            XPath::new("/root/missing"),
            XPath::new("/root/b"),
            XPath::new("/root/a"),
        ],
    )
    .unwrap();
    assert_eq!(items(&doc, "/root/b/item"), vec![9]);
    assert_eq!(items(&doc, "/root/a/item"), Vec::<i32>::new());
}

#[test]
fn append_children_is_a_noop_without_a_match() {
    let mut doc = XmlDocument::parse("<root><a/></root>").unwrap();
    doc.append_children("<item>9</item>", &[XPath::new("/root/missing")])
        .unwrap();
    assert_eq!(items(&doc, "//item"), Vec::<i32>::new());
}

#[test]
fn insert_before_places_node_ahead_of_first_match() {
    let mut doc = XmlDocument::parse("<root><n>1</n><n>3</n></root>").unwrap();
    doc.insert_before("<n>2</n>", &[XPath::new("/root/n[2]")])
        .unwrap();
    assert_eq!(items(&doc, "/root/n"), vec![1, 2, 3]);
}

#[test]
fn insert_after_places_node_behind_last_match() {
    let mut doc = XmlDocument::parse("<root><n>1</n><n>2</n></root>").unwrap();
    doc.insert_after("<n>3</n>", &[XPath::new("/root/n")]).unwrap();
    assert_eq!(items(&doc, "/root/n"), vec![1, 2, 3]);
}

#[test]
fn insert_sibling_is_a_noop_without_a_match() {
    let mut doc = XmlDocument::parse("<root><n>1</n></root>").unwrap();
    doc.insert_before("<n>0</n>", &[XPath::new("/root/zzz")])
        .unwrap();
    doc.insert_after("<n>2</n>", &[XPath::new("/root/zzz")])
        .unwrap();
    assert_eq!(items(&doc, "/root/n"), vec![1]);
}

#[test]
fn set_node_text_replaces_content() {
    let mut doc = XmlDocument::parse("<root><item>old</item></root>").unwrap();
    doc.set_node_text(&XPath::new("/root/item"), "new").unwrap();
    assert_eq!(
        doc.value_of(&XPath::new("/root/item")).unwrap().as_deref(),
        Some("new")
    );
}

#[test]
fn set_node_text_on_attribute_target() {
    let mut doc = XmlDocument::parse(r#"<root><item id="a">1</item></root>"#).unwrap();
    doc.set_node_text(&XPath::new("/root/item/@id"), "b").unwrap();
    let attr = AttributeRef::new(&XPath::new("/root/item"), "id");
    assert_eq!(doc.attribute_value(&attr).unwrap().as_deref(), Some("b"));
}

#[test]
fn set_node_text_is_a_noop_without_a_match() {
    let mut doc = XmlDocument::parse("<root><item>1</item></root>").unwrap();
    doc.set_node_text(&XPath::new("/root/none"), "x").unwrap();
    assert_eq!(
        doc.value_of(&XPath::new("/root/item")).unwrap().as_deref(),
        Some("1")
    );
}

#[test]
fn set_attribute_creates_and_overwrites() {
    let mut doc = XmlDocument::parse("<root><item/></root>").unwrap();
    let attr = AttributeRef::new(&XPath::new("/root/item"), "id");

    doc.set_attribute(&attr, "first").unwrap();
    assert_eq!(doc.attribute_value(&attr).unwrap().as_deref(), Some("first"));

    doc.set_attribute(&attr, "second").unwrap();
    assert_eq!(doc.attribute_value(&attr).unwrap().as_deref(), Some("second"));
}

#[test]
fn set_attribute_is_a_noop_when_node_is_missing() {
    let mut doc = XmlDocument::parse("<root/>").unwrap();
    let attr = AttributeRef::new(&XPath::new("/root/item"), "id");
    doc.set_attribute(&attr, "v").unwrap();
    assert_eq!(doc.attribute_value(&attr).unwrap(), None);
}

#[test]
fn update_attribute_never_creates() {
    let mut doc = XmlDocument::parse(r#"<root><item id="a"/><bare/></root>"#).unwrap();

    let existing = AttributeRef::new(&XPath::new("/root/item"), "id");
    doc.update_attribute(&existing, "b").unwrap();
    assert_eq!(doc.attribute_value(&existing).unwrap().as_deref(), Some("b"));

    let absent = AttributeRef::new(&XPath::new("/root/bare"), "id");
    doc.update_attribute(&absent, "v").unwrap();
    assert_eq!(doc.attribute_value(&absent).unwrap(), None);

    let missing_node = AttributeRef::new(&XPath::new("/root/none"), "id");
    doc.update_attribute(&missing_node, "v").unwrap();
    assert_eq!(doc.attribute_value(&missing_node).unwrap(), None);
}

#[test]
fn mutated_document_survives_serialization() {
    let mut doc = XmlDocument::parse("<root><items><item>1</item></items></root>").unwrap();
    doc.append_children("<item>2</item>", &[XPath::new("/root/items")])
        .unwrap();
    doc.set_attribute(&AttributeRef::new(&XPath::new("/root/items"), "count"), "2")
        .unwrap();

    let reparsed = XmlDocument::parse(&doc.xml().unwrap()).unwrap();
    assert_eq!(items(&reparsed, "/root/items/item"), vec![1, 2]);
    let count = AttributeRef::new(&XPath::new("/root/items"), "count");
    assert_eq!(
        reparsed.attribute_value(&count).unwrap().as_deref(),
        Some("2")
    );
}

#[test]
fn fragment_may_use_registered_namespace_prefixes() {
    let mut doc = XmlDocument::parse_with_namespaces(
        r#"<root xmlns:a="urn:example"><a:items/></root>"#,
        vec![NamespaceBinding::new("a", "urn:example")],
    )
    .unwrap();
    doc.append_children("<a:item>4</a:item>", &[XPath::new("/root/a:items")])
        .unwrap();
    assert_eq!(items(&doc, "/root/a:items/a:item"), vec![4]);
}

#[test]
fn bad_fragment_is_a_parse_error() {
    let mut doc = XmlDocument::parse("<root/>").unwrap();
    let result = doc.append_children("<unclosed>", &[XPath::new("/root")]);
    assert!(result.is_err());
}
