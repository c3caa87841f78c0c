//! xot adapter for the XML tree abstraction
//!
//! This adapter wraps a [`xot::Xot`] arena to implement the
//! xml-tree-traits interfaces. Source and destination documents of a
//! rewrite may live in the same arena or in separate ones.

pub mod tree;

// Re-export main types
pub use tree::XotTree;

// Re-export key types for convenience
pub use xot::Node;
