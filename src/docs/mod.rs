//! Documentation generation for command trees.
//!
//! Renders a Markdown page per command node from its definition, a page
//! describing the CLI configuration file, and the JSON schema of
//! definition documents.

mod generator;
mod markdown;
pub mod schema;

pub use generator::{DocsError, DocsGenerator};
pub use markdown::{generate_command_page, generate_config_page, generate_option_table};
pub use schema::{PropertyInfo, config_schema, definition_schema, extract_property_info};
