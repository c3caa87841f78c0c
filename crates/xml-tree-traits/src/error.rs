//! Error types for XML tree operations

/// Result type for XML tree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all XML tree operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// XML parsing failed
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Serializing a node failed
    #[error("XML serialization error: {0}")]
    Serialize(String),

    /// Node access error
    #[error("Node access error: {0}")]
    NodeAccess(String),

    /// Tree mutation failed
    #[error("Tree mutation error: {0}")]
    Mutation(String),

    /// A prefix has no namespace binding
    #[error("Unknown namespace prefix: {0}")]
    UnknownPrefix(String),

    /// A name is not a valid `prefix:local` or `{uri}local` name
    #[error("Invalid name: {0}")]
    InvalidName(String),
}

impl Error {
    /// Create a new parse error
    pub fn xml_parse<S: Into<String>>(msg: S) -> Self {
        Error::XmlParse(msg.into())
    }

    /// Create a new node access error
    pub fn node_access<S: Into<String>>(msg: S) -> Self {
        Error::NodeAccess(msg.into())
    }

    /// Create a new mutation error
    pub fn mutation<S: Into<String>>(msg: S) -> Self {
        Error::Mutation(msg.into())
    }
}
