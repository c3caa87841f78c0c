//! Structural queries: evaluating parsed paths against a tree.

use xml_tree_traits::{Namespaces, NodeType, QName, XmlTree};

use crate::error::{Error, Result};
use crate::path::{Name, NodeTest, Path, Predicate, Step};

/// A query result: a node, or a string for `text()` and `@attr` steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item<N> {
    Node(N),
    Text(String),
}

impl<N: Copy> Item<N> {
    pub fn as_node(&self) -> Option<N> {
        match self {
            Item::Node(node) => Some(*node),
            Item::Text(_) => None,
        }
    }
}

/// Resolves prefixed names in paths to qualified names.
///
/// Unprefixed element names resolve to the default namespace when one is
/// set, and to no namespace otherwise. Unprefixed attribute names are
/// always in no namespace.
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    namespaces: &'a Namespaces,
    default_namespace: Option<&'a str>,
}

impl<'a> NameResolver<'a> {
    pub fn new(namespaces: &'a Namespaces, default_namespace: Option<&'a str>) -> Self {
        Self {
            namespaces,
            default_namespace,
        }
    }

    pub fn element(&self, name: &Name) -> std::result::Result<QName, String> {
        match &name.prefix {
            Some(prefix) => self.prefixed(prefix, &name.local),
            None => Ok(match self.default_namespace {
                Some(ns) => QName::with_namespace(ns, name.local.as_str()),
                None => QName::local(name.local.as_str()),
            }),
        }
    }

    pub fn attribute(&self, name: &Name) -> std::result::Result<QName, String> {
        match &name.prefix {
            Some(prefix) => self.prefixed(prefix, &name.local),
            None => Ok(QName::local(name.local.as_str())),
        }
    }

    fn prefixed(&self, prefix: &str, local: &str) -> std::result::Result<QName, String> {
        self.namespaces
            .resolve(prefix)
            .map(|uri| QName::with_namespace(uri, local))
            .ok_or_else(|| {
                let defined: Vec<_> = self.namespaces.iter().map(|(p, _)| p).collect();
                format!("undefined namespace prefix '{prefix}', defined prefixes: {defined:?}")
            })
    }
}

/// Evaluate `path` relative to `context`, returning matches in document
/// order.
pub fn select<T: XmlTree>(
    tree: &T,
    context: &T::Node,
    path: &Path,
    resolver: &NameResolver<'_>,
) -> Result<Vec<Item<T::Node>>> {
    let mut current = vec![Item::Node(*context)];
    for step in path.steps() {
        let mut next: Vec<Item<T::Node>> = Vec::new();
        for node in current.iter().filter_map(Item::as_node) {
            for item in select_step(tree, &node, step, resolver)? {
                if step.test == NodeTest::Parent && next.contains(&item) {
                    continue;
                }
                next.push(item);
            }
        }
        current = next;
    }
    Ok(current)
}

/// Evaluate a single step relative to `context`.
pub fn select_step<T: XmlTree>(
    tree: &T,
    context: &T::Node,
    step: &Step,
    resolver: &NameResolver<'_>,
) -> Result<Vec<Item<T::Node>>> {
    let query_error = |reason: String| Error::structural_query(&step.raw, reason);
    let mut items: Vec<Item<T::Node>> = match &step.test {
        NodeTest::SelfNode => vec![Item::Node(*context)],
        NodeTest::Parent => tree.parent(context).map(Item::Node).into_iter().collect(),
        NodeTest::AnyElement => tree
            .children(context)
            .into_iter()
            .filter(|child| tree.is_element(child))
            .map(Item::Node)
            .collect(),
        NodeTest::Text => tree
            .children(context)
            .into_iter()
            .filter(|child| tree.node_type(child) == NodeType::Text)
            .map(|child| Item::Text(tree.text(&child).unwrap_or_default()))
            .collect(),
        NodeTest::Element(name) => {
            let name = resolver.element(name).map_err(query_error)?;
            tree.children(context)
                .into_iter()
                .filter(|child| tree.element_name(child).as_ref() == Some(&name))
                .map(Item::Node)
                .collect()
        }
        NodeTest::Attribute(name) => {
            let name = resolver.attribute(name).map_err(query_error)?;
            tree.attribute(context, &name)
                .map(Item::Text)
                .into_iter()
                .collect()
        }
    };
    for predicate in &step.predicates {
        items = filter(tree, items, predicate, resolver)?;
    }
    Ok(items)
}

fn filter<T: XmlTree>(
    tree: &T,
    items: Vec<Item<T::Node>>,
    predicate: &Predicate,
    resolver: &NameResolver<'_>,
) -> Result<Vec<Item<T::Node>>> {
    if let Predicate::Position(position) = predicate {
        return Ok(items.into_iter().nth(position - 1).into_iter().collect());
    }
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        let keep = match predicate {
            Predicate::Position(_) => unreachable!("handled above"),
            Predicate::Exists(path) => !select_from_item(tree, &item, path, resolver)?.is_empty(),
            Predicate::Equals(path, literal) => select_from_item(tree, &item, path, resolver)?
                .iter()
                .any(|found| string_value(tree, found) == *literal),
            Predicate::NotEquals(path, literal) => select_from_item(tree, &item, path, resolver)?
                .iter()
                .any(|found| string_value(tree, found) != *literal),
        };
        if keep {
            kept.push(item);
        }
    }
    Ok(kept)
}

fn select_from_item<T: XmlTree>(
    tree: &T,
    item: &Item<T::Node>,
    path: &Path,
    resolver: &NameResolver<'_>,
) -> Result<Vec<Item<T::Node>>> {
    match item {
        Item::Node(node) => select(tree, node, path, resolver),
        // only `.` is meaningful relative to a string
        Item::Text(_) => Ok(path
            .steps()
            .iter()
            .all(|step| step.test == NodeTest::SelfNode && step.predicates.is_empty())
            .then(|| item.clone())
            .into_iter()
            .collect()),
    }
}

/// XPath string value of a query result.
pub fn string_value<T: XmlTree>(tree: &T, item: &Item<T::Node>) -> String {
    match item {
        Item::Node(node) => tree.string_value(node),
        Item::Text(text) => text.clone(),
    }
}

/// The value a rule extracts from a query result: the leading text of an
/// element, or the string itself. `None` for elements without text.
pub fn extracted_text<T: XmlTree>(tree: &T, item: &Item<T::Node>) -> Option<String> {
    match item {
        Item::Node(node) => tree.text(node),
        Item::Text(text) => Some(text.clone()),
    }
}
