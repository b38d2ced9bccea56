//! Turning argv, environment and profiles into one argument set.
//!
//! [`parse`] splits the tokens after a command path into options and
//! positionals. [`ArgumentMapper`] layers defaults, profile values,
//! environment variables and command-line values into
//! [`ResolvedArguments`], which is frozen before syntax validation.

pub mod case;
pub mod censor;
mod env;
mod mapper;
mod parser;
mod prompt;
mod resolved;

pub use env::{Environment, ProcessEnvironment, env_value};
pub(crate) use mapper::coerce;
pub use mapper::ArgumentMapper;
pub use parser::{ParsedArguments, parse, scan_flag};
pub use prompt::{Prompter, TerminalPrompter};
pub use resolved::{ArgumentSource, ResolvedArguments};

#[cfg(test)]
mod tests;
