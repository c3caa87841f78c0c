//! Basic tests for xot-adapter

use xml_tree_traits::tree::{MutableXmlTree, NodeType, QName, XmlTree};
use xot_adapter::XotTree;

#[test]
fn test_parse_xml() {
    let mut tree = XotTree::new();
    let doc = tree.parse_xml("<root><item>test</item></root>").unwrap();

    // Get document element
    let root = tree.document_element(&doc).unwrap();
    assert_eq!(tree.element_name(&root), Some(QName::local("root")));

    // Get children
    let children = tree.children(&root);
    assert_eq!(children.len(), 1);
    assert_eq!(tree.element_name(&children[0]), Some(QName::local("item")));
    assert_eq!(tree.node_type(&children[0]), NodeType::Element);
}

#[test]
fn test_namespaced_names() {
    let mut tree = XotTree::new();
    let root = tree
        .parse_root(r#"<x:a xmlns:x="http://x" x:id="7"><b/></x:a>"#)
        .unwrap();

    assert_eq!(
        tree.element_name(&root),
        Some(QName::with_namespace("http://x", "a"))
    );
    assert_eq!(
        tree.attribute(&root, &QName::with_namespace("http://x", "id")),
        Some("7".to_string())
    );
    let child = tree.children(&root)[0];
    assert_eq!(tree.element_name(&child), Some(QName::local("b")));
}

#[test]
fn test_text_is_leading_text_only() {
    let mut tree = XotTree::new();
    let root = tree.parse_root("<b>B1<c><d>aap</d></c>tail</b>").unwrap();

    assert_eq!(tree.text(&root), Some("B1".to_string()));
    assert_eq!(tree.string_value(&root), "B1aaptail");

    let empty = tree.parse_root("<b><c/></b>").unwrap();
    assert_eq!(tree.text(&empty), None);
}

#[test]
fn test_build_document() {
    let mut tree = XotTree::new();
    let (_, root) = tree
        .create_document(
            &QName::with_namespace("http://a", "z"),
            &[(Some("a".to_string()), "http://a".to_string())],
        )
        .unwrap();
    let child = tree.append_element(&root, &QName::local("y")).unwrap();
    tree.set_attribute(&child, &QName::local("lang"), "nl").unwrap();
    tree.set_text(&child, "aap").unwrap();
    tree.set_text(&child, "noot").unwrap();

    assert_eq!(
        tree.serialize(&root).unwrap(),
        r#"<a:z xmlns:a="http://a"><y lang="nl">noot</y></a:z>"#
    );
}

#[test]
fn test_set_text_keeps_children() {
    let mut tree = XotTree::new();
    let (_, root) = tree.create_document(&QName::local("z"), &[]).unwrap();
    tree.append_element(&root, &QName::local("w")).unwrap();
    tree.set_text(&root, "lead").unwrap();

    assert_eq!(tree.serialize(&root).unwrap(), "<z>lead<w/></z>");
}

#[test]
fn test_append_child_moves_parsed_nodes() {
    let mut tree = XotTree::new();
    let (_, root) = tree.create_document(&QName::local("z"), &[]).unwrap();
    let wrapper = tree.parse_root("<wrapper><s>source</s><p>x</p></wrapper>").unwrap();
    for child in tree.children(&wrapper) {
        tree.append_child(&root, &child).unwrap();
    }

    assert!(tree.children(&wrapper).is_empty());
    assert_eq!(
        tree.serialize(&root).unwrap(),
        "<z><s>source</s><p>x</p></z>"
    );
}

#[test]
fn test_serialize_pretty() {
    let mut tree = XotTree::new();
    let root = tree.parse_root("<root><item>test</item></root>").unwrap();

    let serialized = tree.serialize_pretty(&root).unwrap();
    assert!(serialized.contains("root"));
    assert!(serialized.contains("<item>test</item>"));
}

#[test]
fn test_remove_drops_node() {
    let mut tree = XotTree::new();
    let root = tree.parse_root("<p>\n  <q>x</q>\n</p>").unwrap();
    let blank: Vec<_> = tree
        .children(&root)
        .into_iter()
        .filter(|child| tree.node_type(child) == NodeType::Text)
        .collect();
    assert_eq!(blank.len(), 2);
    for node in &blank {
        tree.remove(node).unwrap();
    }

    assert_eq!(tree.serialize(&root).unwrap(), "<p><q>x</q></p>");
}
