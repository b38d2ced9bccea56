use std::{
    io::IsTerminal,
    path::{Path, PathBuf},
};

use super::{ConfigFile, ConfigPaths};
use crate::{
    ImperativeError, Result,
    arguments::{Environment, ProcessEnvironment},
};

/// Phrase that, given as an option value, asks for the value interactively.
pub const DEFAULT_PROMPT_PHRASE: &str = "PROMPT*";

/// Settings of one CLI built on the framework.
///
/// Constructed once at process entry and passed by reference to the
/// processor, the profile store and the response formatter. Nothing in the
/// framework keeps configuration in global state.
#[derive(Debug, Clone, PartialEq)]
pub struct ImperativeConfig {
    root_command: String,
    display_name: String,
    env_prefix: String,
    cli_home: PathBuf,
    profile_types: Vec<String>,
    prompt_phrase: String,
    diagnostic: bool,
    interactive: bool,
}

impl ImperativeConfig {
    /// Starts a builder for the CLI invoked as `root_command`.
    pub fn builder(root_command: impl Into<String>) -> ImperativeConfigBuilder {
        ImperativeConfigBuilder::new(root_command.into())
    }

    /// Builds the configuration from the process environment with every
    /// other setting left at its default.
    ///
    /// # Errors
    /// Returns an error if the CLI home directory cannot be determined.
    pub fn from_env(root_command: impl Into<String>) -> Result<Self> {
        Self::builder(root_command).build(&ProcessEnvironment)
    }

    /// Command name users type.
    pub fn root_command(&self) -> &str {
        &self.root_command
    }

    /// Product name used in help output.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Prefix of every environment variable the CLI reads.
    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// Directory holding the config file and logs.
    pub fn cli_home(&self) -> &Path {
        &self.cli_home
    }

    /// Path of the config file.
    pub fn config_file_path(&self) -> PathBuf {
        ConfigPaths::config_file(&self.cli_home, &self.root_command)
    }

    /// Loads the config file (and its imports).
    ///
    /// # Errors
    /// Returns an error if an existing config file cannot be loaded.
    pub fn load_config_file(&self) -> Result<ConfigFile> {
        ConfigFile::load(&self.config_file_path())
    }

    /// Profile types the CLI knows about.
    pub fn profile_types(&self) -> &[String] {
        &self.profile_types
    }

    /// Value that triggers an interactive prompt.
    pub fn prompt_phrase(&self) -> &str {
        &self.prompt_phrase
    }

    /// Whether unexpected errors include their full detail.
    pub fn diagnostic(&self) -> bool {
        self.diagnostic
    }

    /// Whether the session may prompt.
    pub fn interactive(&self) -> bool {
        self.interactive
    }

    /// Name of the environment variable for option `option_name`.
    ///
    /// `color` under prefix `SAMPLE` is read from `SAMPLE_OPT_COLOR`;
    /// `fruit-size` from `SAMPLE_OPT_FRUIT_SIZE`.
    pub fn option_env_var(&self, option_name: &str) -> String {
        let kebab = crate::arguments::case::kebab_case(option_name);
        format!(
            "{}_OPT_{}",
            self.env_prefix,
            kebab.to_uppercase().replace('-', "_")
        )
    }

    /// Name of the environment variable carrying the log filter.
    pub fn log_level_env_var(&self) -> String {
        format!("{}_LOG_LEVEL", self.env_prefix)
    }

    /// Name of the environment variable selecting the log format.
    pub fn log_format_env_var(&self) -> String {
        format!("{}_LOG_FORMAT", self.env_prefix)
    }
}

/// Builder for [`ImperativeConfig`].
#[derive(Debug, Clone)]
pub struct ImperativeConfigBuilder {
    root_command: String,
    display_name: Option<String>,
    env_prefix: Option<String>,
    cli_home: Option<PathBuf>,
    profile_types: Vec<String>,
    prompt_phrase: Option<String>,
    diagnostic: Option<bool>,
    interactive: Option<bool>,
}

impl ImperativeConfigBuilder {
    fn new(root_command: String) -> Self {
        Self {
            root_command,
            display_name: None,
            env_prefix: None,
            cli_home: None,
            profile_types: Vec::new(),
            prompt_phrase: None,
            diagnostic: None,
            interactive: None,
        }
    }

    /// Product name for help output. Defaults to the root command.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Environment variable prefix. Defaults to the root command in upper
    /// case with `-` replaced by `_`.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Fixes the CLI home directory instead of deriving it from the
    /// environment.
    pub fn cli_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.cli_home = Some(home.into());
        self
    }

    /// Registers a profile type.
    pub fn profile_type(mut self, profile_type: impl Into<String>) -> Self {
        self.profile_types.push(profile_type.into());
        self
    }

    /// Overrides the prompt phrase.
    pub fn prompt_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.prompt_phrase = Some(phrase.into());
        self
    }

    /// Fixes diagnostic mode instead of reading `<PREFIX>_DIAGNOSTIC`.
    pub fn diagnostic(mut self, enabled: bool) -> Self {
        self.diagnostic = Some(enabled);
        self
    }

    /// Fixes interactivity instead of checking whether stdin is a terminal.
    pub fn interactive(mut self, enabled: bool) -> Self {
        self.interactive = Some(enabled);
        self
    }

    /// Finishes the configuration, reading unset values from `env`.
    ///
    /// # Errors
    /// Returns `ImperativeError::ConfigValidation` for a blank root command
    /// and `ImperativeError::IoError` if the CLI home cannot be determined.
    pub fn build(self, env: &dyn Environment) -> Result<ImperativeConfig> {
        if self.root_command.trim().is_empty() {
            return Err(ImperativeError::ConfigValidation {
                component: "root command".to_string(),
                details: "root command name is blank".to_string(),
            });
        }

        let env_prefix = self
            .env_prefix
            .unwrap_or_else(|| self.root_command.to_uppercase().replace('-', "_"));

        let cli_home = match self.cli_home {
            Some(home) => home,
            None => ConfigPaths::cli_home(env, &env_prefix, &self.root_command).map_err(|e| {
                ImperativeError::IoError {
                    path: PathBuf::from(format!("~/.{}", self.root_command)),
                    details: e.to_string(),
                }
            })?,
        };

        let diagnostic = self.diagnostic.unwrap_or_else(|| {
            env.var(&format!("{env_prefix}_DIAGNOSTIC"))
                .is_some_and(|value| value.eq_ignore_ascii_case("true") || value == "1")
        });

        let interactive = self
            .interactive
            .unwrap_or_else(|| std::io::stdin().is_terminal());

        Ok(ImperativeConfig {
            display_name: self.display_name.unwrap_or_else(|| self.root_command.clone()),
            root_command: self.root_command,
            env_prefix,
            cli_home,
            profile_types: self.profile_types,
            prompt_phrase: self
                .prompt_phrase
                .unwrap_or_else(|| DEFAULT_PROMPT_PHRASE.to_string()),
            diagnostic,
            interactive,
        })
    }
}
