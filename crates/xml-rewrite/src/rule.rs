//! Rules, rule sets, value normalization and vocabulary substitution.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::normalize::Normalize;
use crate::path::Path;
use crate::template::Template;

/// Normalizes a whole row of values at once. Must return as many values as
/// it receives; `None` filters the row.
pub type RowFn = Arc<dyn Fn(&[String]) -> Vec<Option<String>> + Send + Sync>;

/// Normalizes a single value; `None` filters the row.
pub type ValueFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// How the extracted values of a row are reshaped before rendering.
#[derive(Clone, Default)]
pub enum Normalization {
    #[default]
    PassThrough,
    WholeRow(RowFn),
    /// One entry per value path
    PerValue(Vec<ValueNormalizer>),
}

#[derive(Clone)]
pub enum ValueNormalizer {
    Function(ValueFn),
    Rules(Normalize),
}

impl ValueNormalizer {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        ValueNormalizer::Function(Arc::new(f))
    }

    pub fn apply(&self, value: &str) -> Result<Option<String>> {
        match self {
            ValueNormalizer::Function(f) => Ok(f(value)),
            ValueNormalizer::Rules(normalize) => normalize.process(value),
        }
    }
}

impl From<Normalize> for ValueNormalizer {
    fn from(normalize: Normalize) -> Self {
        ValueNormalizer::Rules(normalize)
    }
}

impl Normalization {
    pub fn whole_row<F>(f: F) -> Self
    where
        F: Fn(&[String]) -> Vec<Option<String>> + Send + Sync + 'static,
    {
        Normalization::WholeRow(Arc::new(f))
    }

    pub fn per_value<I>(normalizers: I) -> Self
    where
        I: IntoIterator<Item = ValueNormalizer>,
    {
        Normalization::PerValue(normalizers.into_iter().collect())
    }

    pub fn apply(&self, values: Vec<String>) -> Result<Vec<Option<String>>> {
        match self {
            Normalization::PassThrough => Ok(values.into_iter().map(Some).collect()),
            Normalization::WholeRow(f) => {
                let normalized = f(&values);
                if normalized.len() != values.len() {
                    return Err(Error::NormalizationArity {
                        expected: values.len(),
                        found: normalized.len(),
                        values,
                    });
                }
                Ok(normalized)
            }
            Normalization::PerValue(normalizers) => values
                .iter()
                .zip(normalizers)
                .map(|(value, normalizer)| normalizer.apply(value))
                .collect(),
        }
    }
}

impl fmt::Debug for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::PassThrough => f.write_str("PassThrough"),
            Normalization::WholeRow(_) => f.write_str("WholeRow(..)"),
            Normalization::PerValue(normalizers) => f
                .debug_list()
                .entries(normalizers.iter().map(|n| match n {
                    ValueNormalizer::Function(_) => "Function(..)",
                    ValueNormalizer::Rules(_) => "Rules(..)",
                }))
                .finish(),
        }
    }
}

/// One rewrite rule: where to write, where to read, what to extract and
/// how to render it.
#[derive(Clone)]
pub struct Rule {
    destination: Path,
    source: Path,
    values: Vec<Path>,
    template: Template,
    normalization: Normalization,
}

impl Rule {
    /// Parse all paths and the template. Destination paths only take `.`
    /// and element names; anything else is a `MalformedPath`.
    pub fn new<I, S>(destination: &str, source: &str, values: I, template: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let destination = Path::parse(destination)?;
        check_destination(&destination)?;
        Ok(Self {
            destination,
            source: Path::parse(source)?,
            values: values
                .into_iter()
                .map(|value| Path::parse(value.as_ref()))
                .collect::<Result<_>>()?,
            template: Template::parse(template),
            normalization: Normalization::PassThrough,
        })
    }

    /// Attach a normalization. A per-value normalization needs exactly one
    /// normalizer per value path.
    pub fn with_normalization(mut self, normalization: Normalization) -> Result<Self> {
        if let Normalization::PerValue(normalizers) = &normalization {
            if normalizers.len() != self.values.len() {
                return Err(Error::NormalizationArity {
                    expected: self.values.len(),
                    found: normalizers.len(),
                    values: self.values.iter().map(|p| p.to_string()).collect(),
                });
            }
        }
        self.normalization = normalization;
        Ok(self)
    }

    /// Where rendered fragments are placed, relative to the destination root
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Source elements that each produce one value row
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Value paths, relative to each source element
    pub fn values(&self) -> &[Path] {
        &self.values
    }

    /// Template filled with one value row
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Normalization applied to each value row
    pub fn normalization(&self) -> &Normalization {
        &self.normalization
    }
}

fn check_destination(path: &Path) -> Result<()> {
    let mut position = 0;
    for step in path.steps() {
        if !step.is_destination_step() {
            return Err(Error::malformed_path(
                path.as_str(),
                position,
                format!("destination step \"{}\" must be '.' or an element name", step.raw),
            ));
        }
        position += step.raw.len() + 1;
    }
    Ok(())
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<&str> = self.values.iter().map(Path::as_str).collect();
        write!(
            f,
            "({:?}, {:?}, {:?}, {:?})",
            self.destination.as_str(),
            self.source.as_str(),
            values,
            self.template.as_str()
        )
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("destination", &self.destination.as_str())
            .field("source", &self.source.as_str())
            .field("values", &self.values)
            .field("template", &self.template.as_str())
            .field("normalization", &self.normalization)
            .finish()
    }
}

/// Rules applied strictly in order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Rules in application order
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Append a rule; it runs after the existing ones
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Iterate over the rules, first to last
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Global substitution of extracted values, applied before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    map: HashMap<String, String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F: Into<String>, T: Into<String>>(mut self, from: F, to: T) -> Self {
        self.map.insert(from.into(), to.into());
        self
    }

    /// Substitute a value; a missing value becomes the empty string.
    pub fn lookup(&self, value: Option<&str>) -> String {
        match value {
            Some(value) => self
                .map
                .get(value)
                .cloned()
                .unwrap_or_else(|| value.to_string()),
            None => String::new(),
        }
    }
}

impl<F: Into<String>, T: Into<String>> FromIterator<(F, T)> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = (F, T)>>(iter: I) -> Self {
        Self {
            map: iter
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        }
    }
}
