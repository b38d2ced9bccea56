use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error types for the framework itself.
///
/// These are failures of the host application rather than of a single
/// command invocation: malformed command definition documents, unreadable
/// configuration files, and broken config imports.
#[derive(Error, Debug)]
pub enum ImperativeError {
    /// A command definition node failed structural validation
    #[error("invalid command definition '{node}': {details}")]
    InvalidDefinition {
        /// Space-joined path of the node in error
        node: String,
        /// What is wrong with the node
        details: String,
    },

    /// Configuration validation error
    #[error("configuration validation failed for '{component}': {details}")]
    ConfigValidation {
        /// Component that failed validation
        component: String,
        /// Validation error details
        details: String,
    },

    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// Standard I/O operation error (for compatibility)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// JSON parsing error with location context
    #[error("failed to parse JSON at '{location}': {details}")]
    JsonParseError {
        /// Location of JSON being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// Import operation error with file context
    #[error("failed to import '{path}': {details}")]
    ImportError {
        /// Path of file being imported
        path: PathBuf,
        /// Import error details
        details: String,
    },
}

/// A specialized `Result` type for framework operations.
pub type Result<T> = std::result::Result<T, ImperativeError>;

impl ImperativeError {
    /// Creates a TOML parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        ImperativeError::TomlParseError {
            location: Self::location(path),
            details: error.to_string(),
        }
    }

    /// Creates a JSON parsing error with optional file path context.
    pub fn json_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        ImperativeError::JsonParseError {
            location: Self::location(path),
            details: error.to_string(),
        }
    }

    /// Creates an import error with file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying import error
    /// * `path` - Path to the file that failed to import
    pub fn import(error: impl std::fmt::Display, path: &Path) -> Self {
        let clean_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        ImperativeError::ImportError {
            path: clean_path,
            details: error.to_string(),
        }
    }

    /// Creates a definition error for the node at `node_path`.
    pub fn definition(node_path: &[String], details: impl Into<String>) -> Self {
        let node = if node_path.is_empty() {
            "<root>".to_string()
        } else {
            node_path.join(" ")
        };

        ImperativeError::InvalidDefinition {
            node,
            details: details.into(),
        }
    }

    fn location(path: Option<&Path>) -> String {
        match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        }
    }
}
