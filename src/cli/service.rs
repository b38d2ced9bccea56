use std::sync::Arc;

use tracing::{debug, warn};

use super::{
    CommandError, CommandProcessor, HandlerRegistry,
    commands::config,
    processor::requested_format,
};
use crate::{
    Result,
    arguments::{Environment, ProcessEnvironment, Prompter, TerminalPrompter},
    config::ImperativeConfig,
    definition::{CommandDefinition, CommandTree},
    profiles::{CredentialStore, ProfileStore},
    response::CommandResponse,
};

/// High-level service for running a CLI built on the framework.
///
/// Owns everything an invocation reads: the configuration context, the
/// prepared command tree, the handler registry and the profile store. The
/// built-in `config` group is added to the tree unless the root already
/// has a child of that name.
pub struct CliService {
    config: ImperativeConfig,
    tree: CommandTree,
    registry: HandlerRegistry,
    profiles: Arc<ProfileStore>,
    env: Box<dyn Environment>,
    prompter: Box<dyn Prompter>,
}

impl CliService {
    /// Creates a service for `root`, loading profiles from the config file
    /// under the CLI home.
    ///
    /// # Errors
    /// Returns an error if the definition tree is invalid or the config
    /// file cannot be read.
    pub fn new(
        config: ImperativeConfig,
        root: CommandDefinition,
        registry: HandlerRegistry,
    ) -> Result<Self> {
        Self::with_credentials(config, root, registry, None)
    }

    /// Like [`CliService::new`], looking secure profile values missing from
    /// the config file up in `credentials`.
    ///
    /// # Errors
    /// Returns an error if the definition tree is invalid or the config
    /// file cannot be read.
    pub fn with_credentials(
        config: ImperativeConfig,
        root: CommandDefinition,
        registry: HandlerRegistry,
        credentials: Option<&dyn CredentialStore>,
    ) -> Result<Self> {
        let file = config.load_config_file()?;
        let profiles = ProfileStore::from_config(&file, credentials);

        let root = if root.children.iter().any(|c| c.name == config::GROUP_NAME) {
            root
        } else {
            root.child(config::definition())
        };
        let tree = CommandTree::new(root)?;
        debug!(commands = tree.nodes().len(), "prepared command tree");

        let mut service = Self {
            config,
            tree,
            registry,
            profiles: Arc::new(profiles),
            env: Box::new(ProcessEnvironment),
            prompter: Box::new(TerminalPrompter),
        };
        service.register_builtins();
        Ok(service)
    }

    /// Replaces the loaded profiles.
    pub fn with_profiles(mut self, profiles: ProfileStore) -> Self {
        self.profiles = Arc::new(profiles);
        self.register_builtins();
        self
    }

    /// Reads environment variables from `env` instead of the process.
    pub fn with_environment(mut self, env: Box<dyn Environment>) -> Self {
        self.env = env;
        self
    }

    /// Prompts through `prompter` instead of the terminal.
    pub fn with_prompter(mut self, prompter: Box<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    /// Configuration context.
    pub fn config(&self) -> &ImperativeConfig {
        &self.config
    }

    /// Prepared command tree.
    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// Runs one invocation writing to the process's stdout and stderr and
    /// returns its exit code.
    pub async fn run(&self, raw_args: &[String]) -> i32 {
        let mut response = CommandResponse::new(requested_format(raw_args));
        match self.run_with_response(raw_args, &mut response).await {
            Ok(code) => code,
            Err(error) => {
                warn!(error = %error, "syntax error raised by command");
                eprintln!("{error}");
                1
            }
        }
    }

    /// Runs one invocation writing to `response`.
    ///
    /// # Errors
    /// Returns the unrendered syntax error of a command marked
    /// `syntax_throw`.
    pub async fn run_with_response(
        &self,
        raw_args: &[String],
        response: &mut CommandResponse,
    ) -> std::result::Result<i32, CommandError> {
        self.processor().invoke(raw_args, response).await
    }

    /// Full names of every command, sorted.
    pub fn list_commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tree
            .nodes()
            .into_iter()
            .filter(|node| !node.is_group())
            .map(|node| node.full_name())
            .collect();
        names.sort();
        names
    }

    fn processor(&self) -> CommandProcessor<'_> {
        CommandProcessor::new(
            &self.config,
            &self.tree,
            &self.registry,
            &self.profiles,
            self.env.as_ref(),
        )
        .with_prompter(self.prompter.as_ref())
    }

    fn register_builtins(&mut self) {
        config::register_commands(
            &mut self.registry,
            self.profiles.clone(),
            self.config.config_file_path(),
            self.config.profile_types().to_vec(),
        );
    }
}
