//! JSON rewrite configuration.
//!
//! ```json
//! {
//!   "root": { "name": "z", "default_namespace": "http://example.org/z" },
//!   "source_namespaces": { "dc": "http://purl.org/dc/elements/1.1/" },
//!   "vocabulary": { "nl": "dut" },
//!   "rules": [
//!     { "destination": "title", "source": "dc:title", "values": ["."],
//!       "template": "%s", "normalize": ["trim"] }
//!   ]
//! }
//! ```
//!
//! A `normalize` entry per value is `null`, a named function (`lower`,
//! `upper`, `trim`), a list of `{ pattern, template, transforms }` regex
//! rules, or an object `{ rules, no_match }`.

use std::sync::Arc;

use serde::Deserialize;
use xml_tree_traits::Namespaces;

use crate::error::{Error, Result};
use crate::normalize::{GroupTransform, NoMatch, Normalize, NormalizeRule};
use crate::rewrite::DestinationRoot;
use crate::rule::{Normalization, Rule, RuleSet, ValueNormalizer, Vocabulary};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteConfig {
    pub root: DestinationRoot,
    #[serde(default)]
    pub source_namespaces: Namespaces,
    #[serde(default)]
    pub vocabulary: Vocabulary,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub destination: String,
    pub source: String,
    pub values: Vec<String>,
    pub template: String,
    #[serde(default)]
    pub normalize: Option<Vec<Option<NormalizerConfig>>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NormalizerConfig {
    Named(String),
    Patterns(Vec<PatternConfig>),
    WithPolicy {
        rules: Vec<PatternConfig>,
        #[serde(default)]
        no_match: NoMatchConfig,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternConfig {
    pub pattern: String,
    pub template: String,
    #[serde(default)]
    pub transforms: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoMatchConfig {
    #[default]
    Keep,
    Replace(String),
    Filter,
}

impl From<NoMatchConfig> for NoMatch {
    fn from(config: NoMatchConfig) -> Self {
        match config {
            NoMatchConfig::Keep => NoMatch::Keep,
            NoMatchConfig::Replace(value) => NoMatch::Replace(value),
            NoMatchConfig::Filter => NoMatch::Filter,
        }
    }
}

impl RewriteConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compile the configured rules.
    pub fn rule_set(&self) -> Result<RuleSet> {
        self.rules.iter().map(RuleConfig::compile).collect()
    }
}

impl RuleConfig {
    pub fn compile(&self) -> Result<Rule> {
        let rule = Rule::new(&self.destination, &self.source, &self.values, &self.template)?;
        let Some(entries) = &self.normalize else {
            return Ok(rule);
        };
        let normalizers = entries
            .iter()
            .map(|entry| match entry {
                None => Ok(ValueNormalizer::function(|value| Some(value.to_string()))),
                Some(entry) => entry.compile(),
            })
            .collect::<Result<Vec<_>>>()?;
        rule.with_normalization(Normalization::per_value(normalizers))
    }
}

impl NormalizerConfig {
    fn compile(&self) -> Result<ValueNormalizer> {
        match self {
            NormalizerConfig::Named(name) => {
                let transform = named_transform(name)?;
                Ok(ValueNormalizer::function(move |value| Some(transform(value))))
            }
            NormalizerConfig::Patterns(patterns) => Ok(compile_patterns(patterns)?.into()),
            NormalizerConfig::WithPolicy { rules, no_match } => Ok(compile_patterns(rules)?
                .with_no_match(no_match.clone().into())
                .into()),
        }
    }
}

fn compile_patterns(patterns: &[PatternConfig]) -> Result<Normalize> {
    let rules = patterns
        .iter()
        .map(|config| {
            let transforms = config
                .transforms
                .iter()
                .map(|name| named_transform(name))
                .collect::<Result<Vec<_>>>()?;
            Ok(NormalizeRule::new(&config.pattern, &config.template)?.with_transforms(transforms))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Normalize::from_rules(rules))
}

fn named_transform(name: &str) -> Result<GroupTransform> {
    let transform: GroupTransform = match name {
        "lower" => Arc::new(|value: &str| value.to_lowercase()),
        "upper" => Arc::new(|value: &str| value.to_uppercase()),
        "trim" => Arc::new(|value: &str| value.trim().to_string()),
        "identity" => Arc::new(|value: &str| value.to_string()),
        other => {
            return Err(Error::Config(format!(
                "unknown transform \"{other}\", expected lower, upper, trim or identity"
            )))
        }
    };
    Ok(transform)
}
