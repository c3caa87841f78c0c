//! XmlTree implementation for xot

use std::borrow::Borrow;

use xml_tree_traits::{
    error::{Error, Result},
    tree::{MutableXmlTree, NodeType, QName, XmlTree},
};
use xot::output::{xml::Parameters, Indentation};
use xot::{NameId, Node, Xot};

/// Wrapper around Xot that implements the tree traits
pub struct XotTree {
    pub(crate) xot: Xot,
}

impl XotTree {
    /// Create a new XotTree
    pub fn new() -> Self {
        Self { xot: Xot::new() }
    }

    /// Parse a document and return its root element
    pub fn parse_root(&mut self, xml: &str) -> Result<Node> {
        let doc = self.parse_xml(xml)?;
        self.document_element(&doc)
    }

    /// Get a reference to the underlying Xot
    pub fn xot(&self) -> &Xot {
        &self.xot
    }

    /// Get a mutable reference to the underlying Xot
    pub fn xot_mut(&mut self) -> &mut Xot {
        &mut self.xot
    }

    fn qname(&self, name: impl Borrow<NameId>) -> QName {
        let (local, namespace) = self.xot.name_ns_str(*name.borrow());
        QName::with_namespace(namespace, local)
    }

    fn name_id(&mut self, name: &QName) -> NameId {
        match &name.namespace {
            Some(uri) => {
                let ns = self.xot.add_namespace(uri);
                self.xot.add_name_ns(&name.local, ns)
            }
            None => self.xot.add_name(&name.local),
        }
    }

    fn is_text_node(&self, node: Node) -> bool {
        matches!(self.xot.value(node), xot::Value::Text(_))
    }
}

impl Default for XotTree {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlTree for XotTree {
    type Node = Node;
    type Document = Node; // In xot, document is also a Node

    fn parse_xml(&mut self, xml: &str) -> Result<Self::Document> {
        self.xot
            .parse(xml)
            .map_err(|e| Error::xml_parse(e.to_string()))
    }

    fn document_element(&self, doc: &Self::Document) -> Result<Self::Node> {
        self.xot
            .children(*doc)
            .find(|child| self.xot.element(*child).is_some())
            .ok_or_else(|| Error::NodeAccess("Document has no root element".to_string()))
    }

    fn parent(&self, node: &Self::Node) -> Option<Self::Node> {
        self.xot.parent(*node)
    }

    fn children(&self, node: &Self::Node) -> Vec<Self::Node> {
        self.xot.children(*node).collect()
    }

    fn node_type(&self, node: &Self::Node) -> NodeType {
        match self.xot.value(*node) {
            xot::Value::Document => NodeType::Document,
            xot::Value::Element(_) => NodeType::Element,
            xot::Value::Text(_) => NodeType::Text,
            xot::Value::Comment(_) => NodeType::Comment,
            xot::Value::ProcessingInstruction(_) => NodeType::ProcessingInstruction,
            xot::Value::Attribute(_) => NodeType::Attribute,
            xot::Value::Namespace(_) => NodeType::Namespace,
        }
    }

    fn element_name(&self, node: &Self::Node) -> Option<QName> {
        self.xot
            .element(*node)
            .map(|element| self.qname(element.name()))
    }

    fn attributes(&self, node: &Self::Node) -> Vec<(QName, String)> {
        if self.xot.element(*node).is_none() {
            return Vec::new();
        }
        self.xot
            .attributes(*node)
            .iter()
            .map(|(name, value)| (self.qname(name), value.to_string()))
            .collect()
    }

    fn text(&self, node: &Self::Node) -> Option<String> {
        match self.xot.value(*node) {
            xot::Value::Text(text) => Some(text.get().to_string()),
            xot::Value::Element(_) => {
                // lxml-style `.text`: only the text before the first child
                let first = self.xot.first_child(*node)?;
                match self.xot.value(first) {
                    xot::Value::Text(text) => Some(text.get().to_string()),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn string_value(&self, node: &Self::Node) -> String {
        self.xot
            .descendants(*node)
            .filter_map(|descendant| match self.xot.value(descendant) {
                xot::Value::Text(text) => Some(text.get()),
                _ => None,
            })
            .collect()
    }

    fn serialize(&self, node: &Self::Node) -> Result<String> {
        self.xot
            .to_string(*node)
            .map_err(|e| Error::Serialize(e.to_string()))
    }

    fn serialize_pretty(&self, node: &Self::Node) -> Result<String> {
        let parameters = Parameters {
            indentation: Some(Indentation::default()),
            ..Default::default()
        };
        self.xot
            .serialize_xml_string(parameters, *node)
            .map_err(|e| Error::Serialize(e.to_string()))
    }
}

impl MutableXmlTree for XotTree {
    fn create_document(
        &mut self,
        root: &QName,
        declarations: &[(Option<String>, String)],
    ) -> Result<(Self::Document, Self::Node)> {
        let name = self.name_id(root);
        let element = self.xot.new_element(name);
        for (prefix, uri) in declarations {
            let prefix = match prefix {
                Some(prefix) => self.xot.add_prefix(prefix),
                None => self.xot.empty_prefix(),
            };
            let namespace = self.xot.add_namespace(uri);
            self.xot.namespaces_mut(element).insert(prefix, namespace);
        }
        let doc = self
            .xot
            .new_document_with_element(element)
            .map_err(|e| Error::mutation(e.to_string()))?;
        Ok((doc, element))
    }

    fn append_element(&mut self, parent: &Self::Node, name: &QName) -> Result<Self::Node> {
        let name = self.name_id(name);
        let element = self.xot.new_element(name);
        self.xot
            .append(*parent, element)
            .map_err(|e| Error::mutation(e.to_string()))?;
        Ok(element)
    }

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<()> {
        self.xot
            .append(*parent, *child)
            .map_err(|e| Error::mutation(e.to_string()))
    }

    fn set_attribute(&mut self, element: &Self::Node, name: &QName, value: &str) -> Result<()> {
        if self.xot.element(*element).is_none() {
            return Err(Error::node_access("attributes can only be set on elements"));
        }
        let name = self.name_id(name);
        self.xot
            .attributes_mut(*element)
            .insert(name, value.to_string());
        Ok(())
    }

    fn set_text(&mut self, element: &Self::Node, text: &str) -> Result<()> {
        if let Some(first) = self.xot.first_child(*element) {
            if self.is_text_node(first) {
                self.xot
                    .remove(first)
                    .map_err(|e| Error::mutation(e.to_string()))?;
            }
        }
        if text.is_empty() {
            return Ok(());
        }
        let node = self.xot.new_text(text);
        match self.xot.first_child(*element) {
            Some(first) => self.xot.insert_before(first, node),
            None => self.xot.append(*element, node),
        }
        .map_err(|e| Error::mutation(e.to_string()))
    }

    fn remove(&mut self, node: &Self::Node) -> Result<()> {
        self.xot
            .remove(*node)
            .map_err(|e| Error::mutation(e.to_string()))
    }
}
