//! Imperative - framework for building command-line interfaces from
//! declarative command definitions.
//!
//! A CLI describes its commands once as a tree of [`definition::CommandDefinition`]
//! nodes. For every invocation the framework:
//!
//! - Resolves the command path and parses options and positionals
//! - Loads the profiles the command asks for
//! - Layers defaults, profile values, environment variables and
//!   command-line values into one argument set
//! - Validates the argument set against the command's constraints
//! - Runs the registered handler and renders its response as text or as a
//!   single JSON document
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use imperative::{
//!     cli::{CliService, HandlerRegistry},
//!     config::ImperativeConfig,
//!     definition::CommandDefinition,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ImperativeConfig::from_env("sample-cli")?;
//! let root = CommandDefinition::from_toml_str(r#"
//!     type = "group"
//!     description = "Sample CLI"
//! "#)?;
//!
//! let service = CliService::new(config, root, HandlerRegistry::new())?;
//! let code = service.run(&["config".to_string(), "list".to_string()]).await;
//! # let _ = code;
//! # Ok(())
//! # }
//! ```

/// Parsing and layering of command arguments.
pub mod arguments;

/// Command processing, handlers and help output.
pub mod cli;

/// CLI configuration context and config file.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Command definition documents and the prepared command tree.
pub mod definition;

/// Documentation generation for command trees.
pub mod docs;

/// Named profiles and their resolution for a command.
pub mod profiles;

/// Command output: streaming text, JSON documents and progress bars.
pub mod response;

/// Syntax validation of resolved arguments.
pub mod syntax;

/// Logging setup for CLI processes.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{ImperativeError, Result};
