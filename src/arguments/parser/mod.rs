//! Command-line parser for the tokens following a command path.
//!
//! The walk is driven by the prepared [`CommandNode`](crate::definition::CommandNode):
//! options are looked up by name or alias in the node's merged option set,
//! so the parser needs no per-command code.
//!
//! # Module Structure
//!
//! - [`tokens`] - the token walk producing [`ParsedArguments`]
//! - [`helpers`] - option detection, boolean text, suggestions and the
//!   pre-resolution flag scan

mod helpers;
mod tokens;

pub use helpers::scan_flag;
pub use tokens::{ParsedArguments, parse};
