//! `%s`-style templates.

use std::fmt;

use crate::error::{Error, Result};

/// A template with positional `%s` slots. `%%` renders a literal `%`;
/// any other `%` sequence is kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot,
}

impl Template {
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            match chars.peek() {
                Some('s') => {
                    chars.next();
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot);
                }
                Some('%') => {
                    chars.next();
                    literal.push('%');
                }
                _ => literal.push('%'),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// Number of `%s` slots
    pub fn slots(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Slot))
            .count()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Fill the slots in order. The number of values must equal the number
    /// of slots.
    pub fn render<S: AsRef<str>>(&self, values: &[S]) -> Result<String> {
        let expected = self.slots();
        if values.len() != expected {
            return Err(Error::TemplateArity {
                template: self.raw.clone(),
                expected,
                found: values.len(),
                values: values.iter().map(|v| v.as_ref().to_string()).collect(),
            });
        }
        let mut values = values.iter();
        let mut rendered = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Slot => {
                    if let Some(value) = values.next() {
                        rendered.push_str(value.as_ref());
                    }
                }
            }
        }
        Ok(rendered)
    }
}

impl From<&str> for Template {
    fn from(raw: &str) -> Self {
        Template::parse(raw)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
