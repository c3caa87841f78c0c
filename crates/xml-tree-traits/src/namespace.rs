//! Namespace prefix registry

use crate::error::{Error, Result};
use crate::tree::QName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only mapping from short prefixes to namespace URIs.
///
/// Derive new registries with [`Namespaces::with`] or
/// [`Namespaces::select`]; an existing registry never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespaces {
    map: BTreeMap<String, String>,
}

impl Namespaces {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of commonly used prefixes
    pub fn well_known() -> Self {
        WELL_KNOWN.iter().copied().collect()
    }

    /// Look up the namespace URI bound to `prefix`
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.map.get(prefix).map(String::as_str)
    }

    /// Like [`Namespaces::resolve`] but failing on unknown prefixes
    pub fn require(&self, prefix: &str) -> Result<&str> {
        self.resolve(prefix)
            .ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))
    }

    /// Expand a `prefix:local` name into a qualified name
    pub fn expand(&self, curie: &str) -> Result<QName> {
        let (prefix, local) = split_curie(curie)?;
        Ok(QName::with_namespace(self.require(prefix)?, local))
    }

    /// Expand a `prefix:local` name into the namespace URI followed by the
    /// local part, e.g. `dc:title` into `http://purl.org/dc/elements/1.1/title`
    pub fn expand_uri(&self, curie: &str) -> Result<String> {
        let (prefix, local) = split_curie(curie)?;
        Ok(format!("{}{}", self.require(prefix)?, local))
    }

    /// Turn a `{uri}local` name back into `prefix:local`
    pub fn prefixed_name(&self, clark: &str) -> Result<String> {
        let (uri, local) = clark
            .strip_prefix('{')
            .and_then(|rest| rest.split_once('}'))
            .ok_or_else(|| {
                Error::InvalidName(format!("expected '{{some:uri}}tagname', got '{clark}'"))
            })?;
        let prefix = self
            .prefix_for(uri)
            .ok_or_else(|| Error::UnknownPrefix(format!("no prefix bound to '{uri}'")))?;
        Ok(format!("{prefix}:{local}"))
    }

    /// The prefix bound to `uri`, if any
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.map
            .iter()
            .find(|(_, ns)| ns.as_str() == uri)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Shorten a full URI to `prefix:rest` using the longest namespace it
    /// starts with, e.g. `http://purl.org/dc/terms/title` into
    /// `dcterms:title`
    pub fn uri_to_curie(&self, uri: &str) -> Option<String> {
        self.map
            .iter()
            .filter(|(_, ns)| !ns.is_empty() && uri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(prefix, ns)| format!("{prefix}:{}", &uri[ns.len()..]))
    }

    /// A registry restricted to the given prefixes
    pub fn select<'a, I>(&self, prefixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        prefixes
            .into_iter()
            .map(|prefix| Ok((prefix.to_string(), self.require(prefix)?.to_string())))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(|map| Self { map })
    }

    /// A copy of this registry with one extra (or replaced) binding
    pub fn with<P: Into<String>, U: Into<String>>(&self, prefix: P, uri: U) -> Self {
        let mut map = self.map.clone();
        map.insert(prefix.into(), uri.into());
        Self { map }
    }

    /// Iterate over `(prefix, uri)` bindings in prefix order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<P: Into<String>, U: Into<String>> FromIterator<(P, U)> for Namespaces {
    fn from_iter<T: IntoIterator<Item = (P, U)>>(iter: T) -> Self {
        Self {
            map: iter
                .into_iter()
                .map(|(p, u)| (p.into(), u.into()))
                .collect(),
        }
    }
}

fn split_curie(curie: &str) -> Result<(&str, &str)> {
    curie
        .split_once(':')
        .filter(|(prefix, local)| !prefix.is_empty() && !local.is_empty())
        .ok_or_else(|| Error::InvalidName(format!("expected 'prefix:name', got '{curie}'")))
}

const WELL_KNOWN: &[(&str, &str)] = &[
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("diag", "http://www.loc.gov/zing/srw/diagnostic/"),
    ("document", "http://meresco.org/namespace/harvester/document"),
    ("drilldown", "http://meresco.org/namespace/drilldown"),
    ("edm", "http://www.europeana.eu/schemas/edm/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("html", "http://www.w3.org/1999/xhtml"),
    ("meresco_ext", "http://meresco.org/namespace/xslt/extensions"),
    ("meta", "http://meresco.org/namespace/harvester/meta"),
    ("oai", "http://www.openarchives.org/OAI/2.0/"),
    ("oai_dc", "http://www.openarchives.org/OAI/2.0/oai_dc/"),
    ("oaiprov", "http://www.openarchives.org/OAI/2.0/provenance"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("prov", "http://www.w3.org/ns/prov#"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("sfr", "http://docs.oasis-open.org/ns/search-ws/facetedResults"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("soapenv", "http://schemas.xmlsoap.org/soap/envelope/"),
    ("srw", "http://www.loc.gov/zing/srw/"),
    ("srw_dc", "info:srw/schema/1/dc-v1.1"),
    ("sug", "http://meresco.org/namespace/suggestions"),
    ("ti", "http://meresco.org/namespace/timing"),
    ("ucp", "info:lc/xmlns/update-v1"),
    ("wsdl", "http://schemas.xmlsoap.org/wsdl/"),
    ("xml", "http://www.w3.org/XML/1998/namespace"),
    ("xsd", "http://www.w3.org/2001/XMLSchema"),
    ("xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ("xsl", "http://www.w3.org/1999/XSL/Transform"),
    ("zr", "http://explain.z3950.org/dtd/2.0/"),
];

/// Namespace URI of the `xsi` prefix
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_curies() {
        let ns = Namespaces::well_known();
        assert_eq!(
            ns.expand("dc:title").unwrap(),
            QName::with_namespace("http://purl.org/dc/elements/1.1/", "title")
        );
        assert_eq!(
            ns.expand_uri("dc:title").unwrap(),
            "http://purl.org/dc/elements/1.1/title"
        );
        assert!(matches!(ns.expand("nope:title"), Err(Error::UnknownPrefix(_))));
        assert!(matches!(ns.expand("title"), Err(Error::InvalidName(_))));
    }

    #[test]
    fn prefixed_name_reverses_clark_notation() {
        let ns = Namespaces::well_known();
        assert_eq!(
            ns.prefixed_name("{http://www.w3.org/2004/02/skos/core#}prefLabel")
                .unwrap(),
            "skos:prefLabel"
        );
        assert!(ns.prefixed_name("prefLabel").is_err());
    }

    #[test]
    fn derived_registries_leave_original_untouched() {
        let ns = Namespaces::well_known();
        let extended = ns.with("lom", "http://ltsc.ieee.org/xsd/LOM");
        assert_eq!(extended.resolve("lom"), Some("http://ltsc.ieee.org/xsd/LOM"));
        assert_eq!(ns.resolve("lom"), None);

        let selected = extended.select(["lom", "dc"]).unwrap();
        assert_eq!(selected.len(), 2);
        assert!(extended.select(["missing"]).is_err());
    }

    #[test]
    fn reverse_lookups() {
        let ns = Namespaces::well_known();
        assert_eq!(ns.prefix_for("http://purl.org/dc/elements/1.1/"), Some("dc"));
        assert_eq!(ns.prefix_for("asdfasdf"), None);
        assert_eq!(
            ns.uri_to_curie("http://purl.org/dc/terms/fluffy").as_deref(),
            Some("dcterms:fluffy")
        );
        assert_eq!(ns.prefix_for("http://meresco.org/namespace/timing"), Some("ti"));
        assert_eq!(ns.uri_to_curie("urn:unknown:thing"), None);
    }
}
