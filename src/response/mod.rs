//! Handler output and its final rendering.
//!
//! Handlers write through [`CommandResponse`]. In the default format text
//! reaches the terminal as it is written; with `--response-format-json`
//! everything is collected and emitted as one JSON document:
//!
//! ```text
//! { "success", "exitCode", "message", "stdout", "stderr", "data", "error" }
//! ```

mod command;
mod format;

pub use command::CommandResponse;
pub use format::{OutputFormat, OutputOverrides, ResponseFormat, render_bar, render_output};
