//! Path parsing.
//!
//! A path is a `/`-separated sequence of steps, each an optional node
//! test followed by bracketed predicates:
//!
//! ```text
//! path      := step ('/' step)*
//! step      := test predicate*
//! test      := '.' | '..' | '*' | 'text()' | '@' name | name
//! name      := ncname (':' ncname)?
//! predicate := '[' (integer | path (('=' | '!=') literal)?) ']'
//! ```
//!
//! Predicates are parsed here but evaluated by [`crate::select`].

use std::fmt;

use crate::error::{Error, Result};

/// A parsed, reusable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    raw: String,
    steps: Vec<Step>,
}

/// One step of a path. `raw` is the step as written, predicates included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub raw: String,
    pub test: NodeTest,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `.`
    SelfNode,
    /// `..`
    Parent,
    /// `*`
    AnyElement,
    /// `text()`
    Text,
    Element(Name),
    Attribute(Name),
}

/// A possibly prefixed name as written in a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub prefix: Option<String>,
    pub local: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `[2]`, one-based
    Position(usize),
    /// `[c/d]`
    Exists(Path),
    /// `[c/d="aap"]`
    Equals(Path, String),
    /// `[c/d!="aap"]`
    NotEquals(Path, String),
}

impl Path {
    /// Parse a path. The empty string is a path without steps.
    pub fn parse(input: &str) -> Result<Path> {
        let mut parser = Parser::new(input);
        let path = if input.is_empty() {
            Path {
                raw: String::new(),
                steps: Vec::new(),
            }
        } else {
            parser.path()?
        };
        match parser.peek() {
            None => Ok(path),
            Some(']') => Err(parser.error("unbalanced ']'")),
            Some(c) => Err(parser.error(format!("unexpected '{c}'"))),
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Step {
    /// Whether the step can be used on the destination side: `.` or a
    /// plain element name.
    pub fn is_destination_step(&self) -> bool {
        self.predicates.is_empty()
            && matches!(self.test, NodeTest::SelfNode | NodeTest::Element(_))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => f.write_str(&self.local),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error<S: Into<String>>(&self, reason: S) -> Error {
        Error::malformed_path(self.input, self.pos, reason)
    }

    fn path(&mut self) -> Result<Path> {
        let start = self.pos;
        let mut steps = vec![self.step()?];
        while self.eat('/') {
            steps.push(self.step()?);
        }
        Ok(Path {
            raw: self.input[start..self.pos].to_string(),
            steps,
        })
    }

    fn step(&mut self) -> Result<Step> {
        let start = self.pos;
        let test = self.node_test()?;
        let mut predicates = Vec::new();
        while self.eat('[') {
            predicates.push(self.predicate()?);
        }
        Ok(Step {
            raw: self.input[start..self.pos].to_string(),
            test,
            predicates,
        })
    }

    fn node_test(&mut self) -> Result<NodeTest> {
        match self.peek() {
            None | Some('/') => Err(self.error("empty step")),
            Some('.') if self.peek_second() == Some('.') => {
                self.pos += 2;
                Ok(NodeTest::Parent)
            }
            Some('.') => {
                self.bump();
                Ok(NodeTest::SelfNode)
            }
            Some('*') => {
                self.bump();
                Ok(NodeTest::AnyElement)
            }
            Some('@') => {
                self.bump();
                Ok(NodeTest::Attribute(self.name()?))
            }
            Some(_) => {
                let name = self.name()?;
                if name.prefix.is_none() && name.local == "text" && self.input[self.pos..].starts_with("()") {
                    self.pos += 2;
                    return Ok(NodeTest::Text);
                }
                Ok(NodeTest::Element(name))
            }
        }
    }

    fn name(&mut self) -> Result<Name> {
        let first = self.ncname()?;
        if self.peek() == Some(':') {
            self.bump();
            let local = self.ncname()?;
            return Ok(Name {
                prefix: Some(first),
                local,
            });
        }
        Ok(Name {
            prefix: None,
            local: first,
        })
    }

    fn ncname(&mut self) -> Result<String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => {
                self.bump();
            }
            Some(c) => return Err(self.error(format!("'{c}' cannot start a name"))),
            None => return Err(self.error("expected a name")),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            self.bump();
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn predicate(&mut self) -> Result<Predicate> {
        self.skip_whitespace();
        let predicate = if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
            let position: usize = self.input[start..self.pos]
                .parse()
                .map_err(|_| self.error("position out of range"))?;
            if position == 0 {
                return Err(self.error("positions start at 1"));
            }
            Predicate::Position(position)
        } else {
            let path = self.path()?;
            self.skip_whitespace();
            if self.eat('=') {
                self.skip_whitespace();
                Predicate::Equals(path, self.literal()?)
            } else if self.input[self.pos..].starts_with("!=") {
                self.pos += 2;
                self.skip_whitespace();
                Predicate::NotEquals(path, self.literal()?)
            } else {
                Predicate::Exists(path)
            }
        };
        self.skip_whitespace();
        match self.bump() {
            Some(']') => Ok(predicate),
            None => Err(self.error("unbalanced '['")),
            Some(c) => Err(self.error(format!("unexpected '{c}' in predicate"))),
        }
    }

    fn literal(&mut self) -> Result<String> {
        let quote = match self.bump() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected a quoted literal")),
        };
        let start = self.pos;
        loop {
            match self.bump() {
                Some(c) if c == quote => {
                    return Ok(self.input[start..self.pos - quote.len_utf8()].to_string())
                }
                Some(_) => {}
                None => return Err(self.error("unterminated literal")),
            }
        }
    }
}
