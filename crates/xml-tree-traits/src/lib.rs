//! Core trait abstractions for XML trees.
//!
//! This crate defines the tree access traits and the namespace registry
//! that the rewrite engine is written against. Concrete trees live in
//! adapter crates.

pub mod error;
pub mod namespace;
pub mod tree;

pub use error::Error;
pub use namespace::{Namespaces, XSI_NAMESPACE};
pub use tree::{MutableXmlTree, NodeType, QName, XmlTree};
