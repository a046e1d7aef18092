//! CSS collection and inlining
//!
//! Components declare the rules their output needs ([`CssRule`]). The
//! collector gathers them in document order, then [`merge`] folds inlinable
//! rules into per-element declarations by specificity and pushes the rest into
//! a deduplicated head stylesheet.

mod collector;
pub mod parser;
pub mod rule;

pub use collector::{collect, merge, StyleSheet};
pub use parser::{parse_declarations, parse_stylesheet};
pub use rule::{CssRule, Declarations, Part, Selector, SimpleSelector, Specificity};
