//! The rewrite engine.
//!
//! [`XmlRewrite`] builds a new document from scratch out of an existing
//! one. Every rule descends the source tree along its source path and the
//! destination tree along its destination path at the same time:
//!
//! - while the source path remainder is longer, each source match is
//!   visited with the same destination context, so all of them write into
//!   one destination subtree;
//! - while the destination path remainder is longer, the destination step
//!   is looked up (and created once if absent), and every existing match is
//!   visited with the same source context;
//! - with equal remainders, destination elements are created until there
//!   are as many as source matches and both are paired by position.
//!
//! When both remainders are empty the value paths are evaluated against
//! the source context and the rendered template is added to the
//! destination context, either as parsed elements (when it starts with
//! `<`) or as text.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};
use xml_tree_traits::{MutableXmlTree, Namespaces, NodeType, QName, XmlTree, XSI_NAMESPACE};

use crate::error::{Error, Result};
use crate::path::{NodeTest, Step};
use crate::rule::{Rule, RuleSet, Vocabulary};
use crate::select::{extracted_text, select, select_step, NameResolver};
use crate::utils::{escape, escape_attribute, unescape};

const FRAGMENT_WRAPPER: &str = "rewrite-fragment";

/// How the root element of the destination document is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRoot {
    /// Root element name, optionally `prefix:local`
    pub name: String,
    /// Namespace of unprefixed destination names
    #[serde(default)]
    pub default_namespace: Option<String>,
    /// Prefixes usable in destination paths and templates
    #[serde(default)]
    pub namespaces: Namespaces,
    /// Namespace URI to schema location, written as `xsi:schemaLocation`
    #[serde(default)]
    pub schema_locations: BTreeMap<String, String>,
}

impl DestinationRoot {
    /// A root element named `name`, in the default namespace if one is set
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Namespace for unprefixed destination names and template elements
    pub fn with_default_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.default_namespace = Some(namespace.into());
        self
    }

    /// Bind a prefix for destination paths and templates. It is declared
    /// on the root unless it maps to the default namespace.
    pub fn with_namespace<P: Into<String>, U: Into<String>>(mut self, prefix: P, uri: U) -> Self {
        self.namespaces = self.namespaces.with(prefix, uri);
        self
    }

    /// Add a `xsi:schemaLocation` pair
    pub fn with_schema_location<N: Into<String>, L: Into<String>>(
        mut self,
        namespace: N,
        location: L,
    ) -> Self {
        self.schema_locations.insert(namespace.into(), location.into());
        self
    }

    fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref().filter(|ns| !ns.is_empty())
    }

    fn root_name(&self) -> Result<QName> {
        if self.name.contains(':') {
            return Ok(self.namespaces.expand(&self.name)?);
        }
        Ok(match self.default_namespace() {
            Some(ns) => QName::with_namespace(ns, self.name.as_str()),
            None => QName::local(self.name.as_str()),
        })
    }

    /// Declarations on the root: the default namespace plus every prefix
    /// bound to another namespace.
    fn root_declarations(&self) -> Vec<(Option<String>, String)> {
        let default = self.default_namespace();
        let mut declarations: Vec<(Option<String>, String)> = default
            .map(|ns| (None, ns.to_string()))
            .into_iter()
            .collect();
        declarations.extend(
            self.namespaces
                .iter()
                .filter(|(_, uri)| Some(*uri) != default)
                .map(|(prefix, uri)| (Some(prefix.to_string()), uri.to_string())),
        );
        if !self.schema_locations.is_empty()
            && !declarations
                .iter()
                .any(|(prefix, uri)| prefix.is_some() && uri == XSI_NAMESPACE)
        {
            declarations.push((Some("xsi".to_string()), XSI_NAMESPACE.to_string()));
        }
        declarations
    }

    /// Namespace declarations for the element wrapping parsed fragments.
    fn fragment_declarations(&self) -> String {
        let mut declarations = String::new();
        if let Some(ns) = self.default_namespace() {
            declarations.push_str(&format!(" xmlns=\"{}\"", escape_attribute(ns)));
        }
        for (prefix, uri) in self.namespaces.iter() {
            declarations.push_str(&format!(" xmlns:{}=\"{}\"", prefix, escape_attribute(uri)));
        }
        declarations
    }
}

/// One rewrite run: a read-only source tree, the destination tree being
/// built, and the rules that connect them.
pub struct XmlRewrite<'s, S: XmlTree, D: MutableXmlTree> {
    source: &'s S,
    source_root: S::Node,
    source_namespaces: Namespaces,
    destination: D,
    destination_root: D::Node,
    root: DestinationRoot,
    rules: RuleSet,
    vocabulary: Vocabulary,
}

impl<'s, S: XmlTree, D: MutableXmlTree> XmlRewrite<'s, S, D> {
    /// Create the destination root element in `destination`.
    pub fn new(
        source: &'s S,
        source_root: S::Node,
        mut destination: D,
        root: DestinationRoot,
    ) -> Result<Self> {
        let root_name = root.root_name()?;
        let (_, destination_root) =
            destination.create_document(&root_name, &root.root_declarations())?;
        if !root.schema_locations.is_empty() {
            let locations = root
                .schema_locations
                .iter()
                .map(|(ns, location)| format!("{ns} {location}"))
                .collect::<Vec<_>>()
                .join(" ");
            destination.set_attribute(
                &destination_root,
                &QName::with_namespace(XSI_NAMESPACE, "schemaLocation"),
                &locations,
            )?;
        }
        debug!(root = %root_name, "created destination root");
        Ok(Self {
            source,
            source_root,
            source_namespaces: Namespaces::new(),
            destination,
            destination_root,
            root,
            rules: RuleSet::default(),
            vocabulary: Vocabulary::default(),
        })
    }

    /// Rules run by [`apply_rules`](Self::apply_rules)
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Lookup table applied to every extracted value before normalization
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Prefixes usable in source and value paths
    pub fn with_source_namespaces(mut self, namespaces: Namespaces) -> Self {
        self.source_namespaces = namespaces;
        self
    }

    /// Apply every rule in order. Stops at the first failing rule; changes
    /// made by earlier rules stay in the destination tree.
    pub fn apply_rules(&mut self) -> Result<()> {
        info!(rules = self.rules.len(), "applying rewrite rules");
        let rules = std::mem::take(&mut self.rules);
        let result = rules.iter().try_for_each(|rule| self.apply(rule));
        self.rules = rules;
        result
    }

    /// Apply a single rule to the destination tree.
    pub fn apply(&mut self, rule: &Rule) -> Result<()> {
        debug!(%rule, "applying rule");
        let mut descent = CoDescent {
            source: self.source,
            source_names: NameResolver::new(&self.source_namespaces, None),
            destination: &mut self.destination,
            destination_names: NameResolver::new(
                &self.root.namespaces,
                self.root.default_namespace(),
            ),
            root: &self.root,
            vocabulary: &self.vocabulary,
            rule,
        };
        descent
            .descend(
                self.source_root,
                rule.source().steps(),
                self.destination_root,
                rule.destination().steps(),
            )
            .map_err(|source| Error::InRule {
                rule: rule.to_string(),
                source: Box::new(source),
            })
    }

    /// The destination tree built so far
    pub fn destination(&self) -> &D {
        &self.destination
    }

    /// The destination root element
    pub fn destination_root(&self) -> D::Node {
        self.destination_root
    }

    /// Give up the rewrite and keep the destination tree with its root
    pub fn into_destination(self) -> (D, D::Node) {
        (self.destination, self.destination_root)
    }

    /// The destination document, indented
    pub fn to_pretty_string(&self) -> Result<String> {
        Ok(self.destination.serialize_pretty(&self.destination_root)?)
    }

    /// The destination document without added whitespace
    pub fn to_compact_string(&self) -> Result<String> {
        Ok(self.destination.serialize(&self.destination_root)?)
    }
}

/// State of one rule application. Lives only as long as the application.
struct CoDescent<'a, S: XmlTree, D: MutableXmlTree> {
    source: &'a S,
    source_names: NameResolver<'a>,
    destination: &'a mut D,
    destination_names: NameResolver<'a>,
    root: &'a DestinationRoot,
    vocabulary: &'a Vocabulary,
    rule: &'a Rule,
}

impl<S: XmlTree, D: MutableXmlTree> CoDescent<'_, S, D> {
    fn descend(
        &mut self,
        source: S::Node,
        source_steps: &[Step],
        destination: D::Node,
        destination_steps: &[Step],
    ) -> Result<()> {
        match source_steps.len().cmp(&destination_steps.len()) {
            Ordering::Greater => {
                for node in self.select_source(&source, &source_steps[0])? {
                    self.descend(node, &source_steps[1..], destination, destination_steps)?;
                }
            }
            Ordering::Less => {
                let step = &destination_steps[0];
                if self.select_destination(&destination, step)?.is_empty() {
                    self.create(&destination, step)?;
                }
                for node in self.select_destination(&destination, step)? {
                    self.descend(source, source_steps, node, &destination_steps[1..])?;
                }
            }
            Ordering::Equal => match (source_steps.split_first(), destination_steps.split_first()) {
                (Some((source_step, source_rest)), Some((destination_step, destination_rest))) => {
                    let sources = self.select_source(&source, source_step)?;
                    let existing = self.select_destination(&destination, destination_step)?.len();
                    for _ in existing..sources.len() {
                        self.create(&destination, destination_step)?;
                    }
                    let destinations = self.select_destination(&destination, destination_step)?;
                    for (source, destination) in sources.into_iter().zip(destinations) {
                        self.descend(source, source_rest, destination, destination_rest)?;
                    }
                }
                _ => self.render(&source, &destination)?,
            },
        }
        Ok(())
    }

    fn select_source(&self, context: &S::Node, step: &Step) -> Result<Vec<S::Node>> {
        Ok(select_step(self.source, context, step, &self.source_names)?
            .iter()
            .filter_map(|item| item.as_node())
            .collect())
    }

    fn select_destination(&self, context: &D::Node, step: &Step) -> Result<Vec<D::Node>> {
        Ok(
            select_step(&*self.destination, context, step, &self.destination_names)?
                .iter()
                .filter_map(|item| item.as_node())
                .collect(),
        )
    }

    fn create(&mut self, parent: &D::Node, step: &Step) -> Result<D::Node> {
        let NodeTest::Element(name) = &step.test else {
            return Err(Error::UncreatableStep {
                step: step.raw.clone(),
            });
        };
        let name = self
            .destination_names
            .element(name)
            .map_err(|reason| Error::structural_query(&step.raw, reason))?;
        trace!(element = %name, "creating destination element");
        Ok(self.destination.append_element(parent, &name)?)
    }

    fn render(&mut self, source: &S::Node, destination: &D::Node) -> Result<()> {
        let columns = self
            .rule
            .values()
            .iter()
            .map(|path| select(self.source, source, path, &self.source_names))
            .collect::<Result<Vec<_>>>()?;
        // rows are cut off at the shortest column
        let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
        for row in 0..rows {
            let values: Vec<String> = columns
                .iter()
                .map(|column| {
                    let text = extracted_text(self.source, &column[row]);
                    self.vocabulary.lookup(text.as_deref())
                })
                .collect();
            let normalized = self.rule.normalization().apply(values)?;
            let Some(arguments) = normalized
                .into_iter()
                .map(|value| value.map(|v| escape(&v)))
                .collect::<Option<Vec<String>>>()
            else {
                debug!(row, "row filtered by normalization");
                continue;
            };
            let rendered = self.rule.template().render(&arguments)?;
            self.place(destination, &rendered)?;
        }
        Ok(())
    }

    fn place(&mut self, destination: &D::Node, rendered: &str) -> Result<()> {
        if rendered.trim_start().starts_with('<') {
            let wrapped = format!(
                "<{FRAGMENT_WRAPPER}{}>{rendered}</{FRAGMENT_WRAPPER}>",
                self.root.fragment_declarations()
            );
            let document = self
                .destination
                .parse_xml(&wrapped)
                .map_err(|e| Error::FragmentSyntax {
                    fragment: rendered.to_string(),
                    message: e.to_string(),
                })?;
            let wrapper = self.destination.document_element(&document)?;
            self.strip_blank_text(&wrapper)?;
            // moving a node can merge the text around it, so always take
            // the current first child
            while let Some(child) = self.destination.children(&wrapper).first().copied() {
                self.destination.append_child(destination, &child)?;
            }
        } else if !rendered.is_empty() {
            self.destination.set_text(destination, &unescape(rendered))?;
        }
        Ok(())
    }

    /// Drop whitespace-only text from a parsed fragment: everywhere at the
    /// top level, and below it wherever it sits next to elements.
    fn strip_blank_text(&mut self, wrapper: &D::Node) -> Result<()> {
        let mut blank = Vec::new();
        let mut pending = vec![(*wrapper, true)];
        while let Some((parent, top_level)) = pending.pop() {
            let children = self.destination.children(&parent);
            let has_elements = children.iter().any(|child| self.destination.is_element(child));
            for child in children {
                if self.destination.is_element(&child) {
                    pending.push((child, false));
                } else if (top_level || has_elements) && self.is_blank_text(&child) {
                    blank.push(child);
                }
            }
        }
        // adjacent text is always merged, so removing text never frees
        // another collected node
        for node in blank {
            self.destination.remove(&node)?;
        }
        Ok(())
    }

    fn is_blank_text(&self, node: &D::Node) -> bool {
        self.destination.node_type(node) == NodeType::Text
            && self
                .destination
                .text(node)
                .map_or(true, |text| text.trim().is_empty())
    }
}
