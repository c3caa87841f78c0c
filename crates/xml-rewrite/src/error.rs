//! Error types for xml-rewrite

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed path \"{path}\" at {position}: {reason}")]
    MalformedPath {
        path: String,
        position: usize,
        reason: String,
    },

    #[error("cannot evaluate \"{path}\": {reason}")]
    StructuralQuery { path: String, reason: String },

    #[error("template \"{template}\" has {expected} slot(s) but got {found} value(s): {values:?}")]
    TemplateArity {
        template: String,
        expected: usize,
        found: usize,
        values: Vec<String>,
    },

    #[error("normalization returned {found} value(s) for {expected} input(s): {values:?}")]
    NormalizationArity {
        expected: usize,
        found: usize,
        values: Vec<String>,
    },

    #[error("rendered fragment is not well-formed: {message}: {fragment}")]
    FragmentSyntax { fragment: String, message: String },

    #[error("cannot create destination element for step \"{step}\"")]
    UncreatableStep { step: String },

    #[error("invalid normalization pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid rewrite configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Tree(#[from] xml_tree_traits::Error),

    #[error("rule {rule}: {source}")]
    InRule {
        rule: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn malformed_path<S: Into<String>>(path: &str, position: usize, reason: S) -> Self {
        Error::MalformedPath {
            path: path.to_string(),
            position,
            reason: reason.into(),
        }
    }

    pub(crate) fn structural_query<S: Into<String>>(path: &str, reason: S) -> Self {
        Error::StructuralQuery {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// The error underneath any rule context
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::InRule { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
