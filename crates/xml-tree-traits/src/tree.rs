//! XML tree abstraction traits

use crate::error::Result;
use std::fmt::{self, Debug};

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Document node
    Document,
    /// Element node
    Element,
    /// Attribute node
    Attribute,
    /// Text node
    Text,
    /// Comment node
    Comment,
    /// Processing instruction node
    ProcessingInstruction,
    /// Namespace node
    Namespace,
}

/// Namespace-qualified name of an element or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI, `None` for names in no namespace
    pub namespace: Option<String>,
    /// Local part of the name
    pub local: String,
}

impl QName {
    /// A name in no namespace.
    pub fn local<S: Into<String>>(local: S) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// A name in the given namespace. An empty URI means no namespace.
    pub fn with_namespace<N: Into<String>, S: Into<String>>(namespace: N, local: S) -> Self {
        let namespace = namespace.into();
        Self {
            namespace: (!namespace.is_empty()).then_some(namespace),
            local: local.into(),
        }
    }

    /// Namespace URI as a string slice, `""` when there is none.
    pub fn namespace_str(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }
}

impl fmt::Display for QName {
    /// Clark notation: `{uri}local`, or just `local` without namespace.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Read access to an XML tree.
///
/// This trait abstracts over different XML tree representations. Node
/// handles are cheap copies; all data is read through the tree.
pub trait XmlTree {
    /// Type representing a node handle in this tree
    type Node: Copy + Eq + Debug;

    /// Type representing a document handle in this tree
    type Document: Copy + Debug;

    /// Parse XML from a string and return a document handle
    fn parse_xml(&mut self, xml: &str) -> Result<Self::Document>;

    /// Get the document element (root element) of a document
    fn document_element(&self, doc: &Self::Document) -> Result<Self::Node>;

    /// Get the parent of a node, if it has one
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Get all children of a node, attributes excluded
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Get the type of a node
    fn node_type(&self, node: &Self::Node) -> NodeType;

    /// Get the qualified name of an element node
    fn element_name(&self, node: &Self::Node) -> Option<QName>;

    /// Get all attributes of an element node
    fn attributes(&self, node: &Self::Node) -> Vec<(QName, String)>;

    /// Get a single attribute value
    fn attribute(&self, node: &Self::Node, name: &QName) -> Option<String> {
        self.attributes(node)
            .into_iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value)
    }

    /// Text of a text node, or the text preceding the first child of an
    /// element. `None` when there is no such text.
    fn text(&self, node: &Self::Node) -> Option<String>;

    /// Concatenated text of all descendant text nodes
    fn string_value(&self, node: &Self::Node) -> String;

    /// Serialize a node to a compact XML string
    fn serialize(&self, node: &Self::Node) -> Result<String>;

    /// Serialize a node to an indented XML string
    fn serialize_pretty(&self, node: &Self::Node) -> Result<String>;

    /// Check whether a node is an element
    fn is_element(&self, node: &Self::Node) -> bool {
        self.node_type(node) == NodeType::Element
    }
}

/// Trees that can be built and modified in place.
pub trait MutableXmlTree: XmlTree {
    /// Create a new document with a root element carrying the given
    /// namespace declarations (`None` prefix for the default namespace).
    fn create_document(
        &mut self,
        root: &QName,
        declarations: &[(Option<String>, String)],
    ) -> Result<(Self::Document, Self::Node)>;

    /// Create a new element and append it as last child of `parent`
    fn append_element(&mut self, parent: &Self::Node, name: &QName) -> Result<Self::Node>;

    /// Append `child` as last child of `parent`, detaching it from its
    /// current position first
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<()>;

    /// Set an attribute on an element, replacing any previous value
    fn set_attribute(&mut self, element: &Self::Node, name: &QName, value: &str) -> Result<()>;

    /// Replace the text preceding the first child of an element
    fn set_text(&mut self, element: &Self::Node, text: &str) -> Result<()>;

    /// Detach a node and drop it together with its descendants
    fn remove(&mut self, node: &Self::Node) -> Result<()>;
}
