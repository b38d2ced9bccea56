//! Command processing.
//!
//! Resolves argv against the command tree, loads profiles, maps and
//! validates arguments, then runs the command's handler and renders its
//! response. Handlers are looked up by identifier in a
//! [`HandlerRegistry`]; help text is generated from the definitions.

pub mod commands;
pub mod formatting;
mod help;
mod processor;
mod registry;
mod service;
mod types;

pub use help::{render_examples, render_help};
pub use processor::{CommandProcessor, ProcessorState, requested_format};
pub use registry::{HandlerFactory, HandlerRegistry};
pub use service::CliService;
pub use types::{
    CommandError, CommandHandler, ExpectedError, HandlerError, HandlerParameters,
};

#[cfg(test)]
mod tests;
