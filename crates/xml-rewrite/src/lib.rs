//! Rule-driven rewriting of one XML document into a differently shaped one.
//!
//! A [`Rule`] names a destination path, a source path, a list of value
//! paths and a `%s` template. [`XmlRewrite`] applies rules in order,
//! walking source and destination trees together and creating destination
//! elements as needed.
//!
//! ```ignore
//! use xml_rewrite::{DestinationRoot, Rule, RuleSet, XmlRewrite};
//! use xot_adapter::XotTree;
//!
//! let mut source = XotTree::new();
//! let root = source.parse_root("<a><b>aap</b></a>")?;
//! let rules: RuleSet = [Rule::new("y", "b", ["."], "<w>%s</w>")?].into_iter().collect();
//! let mut rewrite = XmlRewrite::new(&source, root, XotTree::new(), DestinationRoot::new("z"))?
//!     .with_rules(rules);
//! rewrite.apply_rules()?;
//! assert_eq!(rewrite.to_compact_string()?, "<z><y><w>aap</w></y></z>");
//! ```

pub mod config;
pub mod error;
pub mod normalize;
pub mod path;
pub mod rewrite;
pub mod rule;
pub mod select;
pub mod template;
pub mod utils;

pub use config::RewriteConfig;
pub use error::{Error, Result};
pub use normalize::{NoMatch, Normalize, NormalizeRule};
pub use path::Path;
pub use rewrite::{DestinationRoot, XmlRewrite};
pub use rule::{Normalization, Rule, RuleSet, ValueNormalizer, Vocabulary};
pub use template::Template;
pub use utils::{escape, sort_root_attributes, unescape};
