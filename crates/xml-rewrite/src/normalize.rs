//! Regex based value normalization.
//!
//! A [`Normalize`] holds an ordered list of rules. The first rule whose
//! pattern matches at the start of the value wins: its capture groups,
//! optionally passed through per-group transforms, fill the rule's
//! template.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::{Error, Result};
use crate::template::Template;

/// Transform applied to one capture group before templating.
pub type GroupTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Clone)]
pub struct NormalizeRule {
    pattern: Regex,
    source: String,
    template: Template,
    transforms: Vec<GroupTransform>,
}

impl NormalizeRule {
    pub fn new(pattern: &str, template: &str) -> Result<Self> {
        let anchored = Regex::new(&format!("^(?:{pattern})")).map_err(|source| {
            Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            pattern: anchored,
            source: pattern.to_string(),
            template: Template::parse(template),
            transforms: Vec::new(),
        })
    }

    /// Add a transform for the next capture group.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.transforms.push(Arc::new(transform));
        self
    }

    pub fn with_transforms<I>(mut self, transforms: I) -> Self
    where
        I: IntoIterator<Item = GroupTransform>,
    {
        self.transforms.extend(transforms);
        self
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// `None` when the pattern does not match.
    fn apply(&self, value: &str) -> Option<Result<String>> {
        let captures = self.pattern.captures(value)?;
        let groups: Vec<&str> = captures
            .iter()
            .skip(1)
            .map(|group| group.map_or("", |m| m.as_str()))
            .collect();
        let rendered = if self.transforms.is_empty() {
            self.template.render(&groups)
        } else {
            // pairs up transforms and groups; the shorter list decides
            let transformed: Vec<String> = self
                .transforms
                .iter()
                .zip(&groups)
                .map(|(transform, group)| transform(group))
                .collect();
            self.template.render(&transformed)
        };
        Some(rendered)
    }
}

impl fmt::Debug for NormalizeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizeRule")
            .field("pattern", &self.source)
            .field("template", &self.template.as_str())
            .field("transforms", &self.transforms.len())
            .finish()
    }
}

/// What to do with a value no rule matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NoMatch {
    /// Return the value unchanged
    #[default]
    Keep,
    /// Return a fixed value instead
    Replace(String),
    /// Drop the value
    Filter,
}

#[derive(Debug, Clone, Default)]
pub struct Normalize {
    rules: Vec<NormalizeRule>,
    no_match: NoMatch,
}

impl Normalize {
    /// Build from `(pattern, template)` pairs.
    pub fn new<I, P, T>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, T)>,
        P: AsRef<str>,
        T: AsRef<str>,
    {
        let rules = rules
            .into_iter()
            .map(|(pattern, template)| NormalizeRule::new(pattern.as_ref(), template.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_rules(rules))
    }

    pub fn from_rules(rules: Vec<NormalizeRule>) -> Self {
        Self {
            rules,
            no_match: NoMatch::Keep,
        }
    }

    pub fn with_no_match(mut self, no_match: NoMatch) -> Self {
        self.no_match = no_match;
        self
    }

    pub fn rules(&self) -> &[NormalizeRule] {
        &self.rules
    }

    /// Normalize one value. `Ok(None)` means the value is filtered out.
    pub fn process(&self, value: &str) -> Result<Option<String>> {
        for rule in &self.rules {
            if let Some(rendered) = rule.apply(value) {
                return rendered.map(Some);
            }
        }
        Ok(match &self.no_match {
            NoMatch::Keep => Some(value.to_string()),
            NoMatch::Replace(replacement) => Some(replacement.clone()),
            NoMatch::Filter => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_groups_render_empty() {
        let normalize = Normalize::new([("a(x)?b", "[%s]")]).unwrap();
        assert_eq!(normalize.process("ab").unwrap(), Some("[]".to_string()));
        assert_eq!(normalize.process("axb").unwrap(), Some("[x]".to_string()));
    }

    #[test]
    fn pattern_is_only_anchored_at_the_start() {
        let normalize = Normalize::new([("noot", "found")]).unwrap();
        assert_eq!(normalize.process("aap noot").unwrap(), Some("aap noot".to_string()));
        assert_eq!(normalize.process("noot aap").unwrap(), Some("found".to_string()));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        match Normalize::new([("(unclosed", "%s")]) {
            Err(Error::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "(unclosed"),
            other => panic!("expected invalid pattern, got {other:?}"),
        }
    }
}
