use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;

use super::{
    config_schema, definition_schema, generate_command_page, generate_config_page,
    markdown::page_name,
};
use crate::definition::{CommandNode, CommandTree};

/// Generates markdown documentation for a command tree.
///
/// Writes one page per command node, a configuration file page and the
/// JSON schema of definition documents.
pub struct DocsGenerator {
    tree: CommandTree,
    program: String,
    output_dir: PathBuf,
}

impl DocsGenerator {
    /// Creates a generator for `tree`, invoked as `program`, writing to
    /// `docs/commands`.
    pub fn new(tree: CommandTree, program: impl Into<String>) -> Self {
        Self {
            tree,
            program: program.into(),
            output_dir: PathBuf::from("docs/commands"),
        }
    }

    /// Sets a custom output directory for generated documentation.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Generates every page and the schema. Returns the written files.
    ///
    /// # Errors
    ///
    /// Returns `DocsError::FileWrite` if a file cannot be written.
    pub fn generate_all(&self) -> Result<Vec<PathBuf>, DocsError> {
        self.ensure_output_dir()?;

        let mut written = Vec::new();
        for node in self.tree.nodes() {
            written.push(self.write_page(node)?);
        }
        written.push(self.generate_config()?);
        written.push(self.generate_schema()?);

        info!(files = written.len(), dir = %self.output_dir.display(), "generated documentation");
        Ok(written)
    }

    /// Generates the page of the command at `path`.
    ///
    /// # Errors
    ///
    /// Returns `DocsError::InvalidCommand` if no command has that path.
    pub fn generate_command<S: AsRef<str>>(&self, path: &[S]) -> Result<PathBuf, DocsError> {
        let node = self.tree.find(path).ok_or_else(|| {
            let joined: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
            DocsError::InvalidCommand(joined.join(" "))
        })?;

        self.ensure_output_dir()?;
        self.write_page(node)
    }

    /// Writes the configuration file page.
    ///
    /// # Errors
    ///
    /// Returns `DocsError::FileWrite` if the file cannot be written.
    pub fn generate_config(&self) -> Result<PathBuf, DocsError> {
        self.ensure_output_dir()?;
        let content = generate_config_page(&self.program, &config_schema());
        self.write(&format!("{}_configuration.md", self.program), &content)
    }

    /// Writes the JSON schema of definition documents.
    ///
    /// # Errors
    ///
    /// Returns `DocsError::SchemaConversion` if the schema cannot be
    /// serialized, `DocsError::FileWrite` if it cannot be written.
    pub fn generate_schema(&self) -> Result<PathBuf, DocsError> {
        self.ensure_output_dir()?;
        let content = serde_json::to_string_pretty(&definition_schema())
            .map_err(|err| DocsError::SchemaConversion(err.to_string()))?;
        self.write("definition.schema.json", &content)
    }

    /// Returns the full names of all commands and groups.
    pub fn list_commands(&self) -> Vec<String> {
        self.tree
            .nodes()
            .into_iter()
            .filter(|node| !node.path().is_empty())
            .map(CommandNode::full_name)
            .collect()
    }

    fn write_page(&self, node: &CommandNode) -> Result<PathBuf, DocsError> {
        let content = generate_command_page(node, &self.program);
        self.write(&page_name(node, &self.program), &content)
    }

    fn write(&self, filename: &str, content: &str) -> Result<PathBuf, DocsError> {
        let filepath = Path::new(&self.output_dir).join(filename);
        fs::write(&filepath, content).map_err(|err| DocsError::FileWrite(err.to_string()))?;
        Ok(filepath)
    }

    fn ensure_output_dir(&self) -> Result<(), DocsError> {
        fs::create_dir_all(&self.output_dir).map_err(|err| {
            DocsError::FileWrite(format!("Failed to create output directory: {}", err))
        })
    }
}

/// Errors that can occur during documentation generation.
#[derive(Error, Debug)]
pub enum DocsError {
    /// A file or directory could not be written.
    #[error("{0}")]
    FileWrite(String),

    /// No command has the requested path.
    #[error("Unknown command: {0}")]
    InvalidCommand(String),

    /// A schema could not be serialized.
    #[error("{0}")]
    SchemaConversion(String),
}
