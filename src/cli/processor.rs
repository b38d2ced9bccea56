use std::{
    any::Any, error::Error as StdError, fmt, io::IsTerminal, panic::AssertUnwindSafe,
};

use futures::FutureExt;
use tracing::{Span, debug, field, info, instrument, warn};

use super::{
    CommandError, CommandHandler, HandlerError, HandlerParameters, HandlerRegistry,
    help::{render_examples, render_help},
};
use crate::{
    arguments::{
        ArgumentMapper, Environment, ParsedArguments, Prompter, ResolvedArguments, censor, parse,
        scan_flag,
    },
    config::ImperativeConfig,
    definition::{
        CommandNode, CommandTree, HELP_EXAMPLES_OPTION, HELP_OPTION, RESPONSE_FORMAT_FILTER_OPTION,
        RESPONSE_FORMAT_HEADER_OPTION, RESPONSE_FORMAT_JSON_ALIAS, RESPONSE_FORMAT_JSON_OPTION,
        RESPONSE_FORMAT_TYPE_OPTION, SHOW_INPUTS_ONLY_OPTION,
    },
    profiles::{ProfileResolver, ProfileStore, ResolvedProfiles},
    response::{CommandResponse, OutputFormat, OutputOverrides, ResponseFormat},
    syntax::SyntaxValidator,
};

/// Stage of one command invocation.
///
/// Every invocation passes through the stages in order and ends in `Done`
/// or `Failed`; a failure in any stage skips the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    /// Walking the tree for the command path and parsing its options.
    ResolvingCommand,
    /// Loading the profiles the command needs.
    ResolvingProfiles,
    /// Layering defaults, profiles, environment and flags.
    MappingArguments,
    /// Checking the final arguments against the definition.
    ValidatingSyntax,
    /// Running the handler.
    InvokingHandler,
    /// Emitting the response.
    FormattingResponse,
    /// Finished successfully.
    Done,
    /// Finished with an error.
    Failed,
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolvingCommand => "ResolvingCommand",
            Self::ResolvingProfiles => "ResolvingProfiles",
            Self::MappingArguments => "MappingArguments",
            Self::ValidatingSyntax => "ValidatingSyntax",
            Self::InvokingHandler => "InvokingHandler",
            Self::FormattingResponse => "FormattingResponse",
            Self::Done => "Done",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Output format asked for anywhere in `raw_args`.
///
/// Read before the command is resolved so that resolution errors are
/// rendered in the requested format too. Once the command's options are
/// parsed, the processor settles the format from the parsed flag.
pub fn requested_format(raw_args: &[String]) -> ResponseFormat {
    ResponseFormat::from_flag(scan_flag(
        raw_args,
        &[RESPONSE_FORMAT_JSON_OPTION, RESPONSE_FORMAT_JSON_ALIAS],
    ))
}

struct Failure {
    error: CommandError,
    rethrow: bool,
}

impl From<CommandError> for Failure {
    fn from(error: CommandError) -> Self {
        Self {
            error,
            rethrow: false,
        }
    }
}

/// Runs one command invocation against a prepared tree.
///
/// The processor holds only borrowed, read-only state, so one tree,
/// registry and profile store can serve any number of sequential
/// invocations.
pub struct CommandProcessor<'a> {
    config: &'a ImperativeConfig,
    tree: &'a CommandTree,
    registry: &'a HandlerRegistry,
    profiles: &'a ProfileStore,
    env: &'a dyn Environment,
    prompter: Option<&'a dyn Prompter>,
}

impl<'a> CommandProcessor<'a> {
    /// Processor over the given collaborators.
    pub fn new(
        config: &'a ImperativeConfig,
        tree: &'a CommandTree,
        registry: &'a HandlerRegistry,
        profiles: &'a ProfileStore,
        env: &'a dyn Environment,
    ) -> Self {
        Self {
            config,
            tree,
            registry,
            profiles,
            env,
            prompter: None,
        }
    }

    /// Enables interactive prompting.
    pub fn with_prompter(mut self, prompter: &'a dyn Prompter) -> Self {
        self.prompter = Some(prompter);
        self
    }

    /// Runs `raw_args` and finishes `response`, rendering any failure into
    /// it exactly once. Returns the exit code.
    ///
    /// # Errors
    /// Returns the syntax error unrendered when the resolved command is
    /// marked `syntax_throw`. Every other failure is rendered and reflected
    /// in the exit code instead.
    #[instrument(skip_all, fields(args = field::Empty))]
    pub async fn invoke(
        &self,
        raw_args: &[String],
        response: &mut CommandResponse,
    ) -> Result<i32, CommandError> {
        let node = self.tree.resolve(raw_args).ok().map(|resolution| resolution.node);
        Span::current().record(
            "args",
            field::debug(censor::censor_raw_args(raw_args, node)),
        );

        let outcome = self.run(raw_args, response).await;

        if let Err(failure) = outcome {
            transition(ProcessorState::Failed);
            if failure.rethrow {
                return Err(failure.error);
            }
            self.render_error(&failure.error, response);
        }

        transition(ProcessorState::FormattingResponse);
        if let Err(e) = response.finish() {
            warn!(error = %e, "cannot write response");
        }

        let code = response.exit_code();
        info!(exit_code = code, "command finished");
        Ok(code)
    }

    /// Runs `raw_args` without rendering failures or finishing `response`.
    ///
    /// # Errors
    /// Returns the first failure of any stage.
    pub async fn try_invoke(
        &self,
        raw_args: &[String],
        response: &mut CommandResponse,
    ) -> Result<(), CommandError> {
        self.run(raw_args, response).await.map_err(|f| f.error)
    }

    async fn run(&self, raw_args: &[String], response: &mut CommandResponse) -> Result<(), Failure> {
        transition(ProcessorState::ResolvingCommand);
        let resolution = self.tree.resolve(raw_args)?;
        let node = resolution.node;
        let throws = node.definition().syntax_throw;
        let syntax = |error: CommandError| Failure {
            rethrow: throws && error.is_syntax(),
            error,
        };

        let parsed = parse(node, &resolution.remaining).map_err(syntax)?;
        response.set_format(ResponseFormat::from_flag(
            parsed.flag(RESPONSE_FORMAT_JSON_OPTION),
        ));
        debug!(command = %node.full_name(), "resolved command");

        if self.show_help(node, &parsed, response) {
            transition(ProcessorState::Done);
            return Ok(());
        }

        transition(ProcessorState::ResolvingProfiles);
        let mut mapper = ArgumentMapper::new(self.config, self.env);
        if let Some(prompter) = self.prompter {
            mapper = mapper.with_prompter(prompter);
        }
        let profiles = match node.profile() {
            Some(spec) => {
                let explicit = mapper.explicit_profile_names(node, &parsed);
                ProfileResolver::new(self.profiles).resolve(spec, &explicit)?
            }
            None => ResolvedProfiles::default(),
        };

        transition(ProcessorState::MappingArguments);
        let arguments = mapper
            .map(node, &parsed, profiles.arguments())
            .await
            .map_err(syntax)?;

        if parsed.flag(SHOW_INPUTS_ONLY_OPTION) {
            let inputs = censor::censored(&arguments);
            response.log(serde_json::to_string_pretty(&inputs).unwrap_or_default());
            response.set_obj(inputs, false);
            transition(ProcessorState::Done);
            return Ok(());
        }

        transition(ProcessorState::ValidatingSyntax);
        SyntaxValidator::new(node)
            .validate(&arguments)
            .map_err(|e| syntax(e.into()))?;

        transition(ProcessorState::InvokingHandler);
        let handler = self.create_handler(node)?;

        if node.definition().output_format_options {
            response.set_output_overrides(output_overrides(&arguments));
        }

        let mut params = HandlerParameters {
            arguments,
            positionals: parsed.positionals.clone(),
            profiles,
            response,
            raw_args: raw_args.to_vec(),
            command: node.full_name(),
        };

        let outcome = AssertUnwindSafe(handler.process(&mut params))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {
                transition(ProcessorState::Done);
                Ok(())
            }
            Ok(Err(error)) => Err(handler_failure(error, params.response).into()),
            Err(panic) => {
                let message = panic_message(&*panic);
                Err(unexpected(format!("handler panicked: {message}")).into())
            }
        }
    }

    fn create_handler(&self, node: &CommandNode) -> Result<Box<dyn CommandHandler>, CommandError> {
        let handler = node.handler();
        handler
            .and_then(|id| self.registry.create(id))
            .ok_or_else(|| CommandError::MissingHandler {
                command: node.full_name(),
                handler: handler.map(str::to_string),
            })
    }

    fn show_help(
        &self,
        node: &CommandNode,
        parsed: &ParsedArguments,
        response: &mut CommandResponse,
    ) -> bool {
        let root = self.config.root_command();
        let styled = !response.is_json() && std::io::stdout().is_terminal();

        let text = if parsed.flag(HELP_OPTION) {
            render_help(node, root, styled)
        } else if node.is_group() && parsed.flag(HELP_EXAMPLES_OPTION) {
            render_examples(node, root, styled)
        } else if node.is_group() && parsed.positionals.is_empty() {
            render_help(node, root, styled)
        } else {
            return false;
        };

        debug!(command = %node.full_name(), "showing help");
        response.log(text);
        true
    }

    fn render_error(&self, error: &CommandError, response: &mut CommandResponse) {
        let diagnostic = self.config.diagnostic();
        response.failed();

        if response.is_json() {
            if response.message().is_empty() {
                response.set_message(error.to_string());
            }
            response.set_error(error.to_json(diagnostic));
            return;
        }

        response.error_header(error.heading());
        response.error(error.to_string());

        let suggestions = error.suggestions();
        if !suggestions.is_empty() {
            response.error(format!("\nDid you mean: {}?", suggestions.join(", ")));
        }

        match error {
            CommandError::HandlerExpected {
                additional_details,
                causes,
                ..
            } => {
                if let Some(details) = additional_details {
                    response.error(format!("\n{details}"));
                }
                for cause in causes {
                    response.error(format!("Caused by: {cause}"));
                }
            }
            CommandError::UnexpectedInternal { detail, .. } => match detail {
                Some(detail) if diagnostic => response.error(format!("\n{detail}")),
                _ => response.error(format!(
                    "\nSet {}_DIAGNOSTIC=true for more detail.",
                    self.config.env_prefix()
                )),
            },
            _ if error.is_syntax() => {
                response.error(format!(
                    "\nUse \"{} --help\" to view command usage.",
                    self.config.root_command()
                ));
            }
            _ => {}
        }
    }
}

fn transition(state: ProcessorState) {
    debug!(state = %state, "processor state");
}

fn unexpected(detail: String) -> CommandError {
    CommandError::UnexpectedInternal {
        message: "The command handler failed unexpectedly".to_string(),
        detail: Some(detail),
    }
}

fn handler_failure(error: HandlerError, response: &mut CommandResponse) -> CommandError {
    match error {
        HandlerError::Expected(error) => {
            if let Some(code) = error.exit_code {
                response.set_exit_code(code);
            }
            CommandError::HandlerExpected {
                message: error.message,
                additional_details: error.additional_details,
                causes: error.causes,
            }
        }
        HandlerError::Unexpected(error) => {
            let mut detail = error.to_string();
            let mut source = error.source();
            while let Some(cause) = source {
                detail.push_str(&format!("\nCaused by: {cause}"));
                source = cause.source();
            }
            unexpected(detail)
        }
    }
}

fn output_overrides(arguments: &ResolvedArguments) -> OutputOverrides {
    OutputOverrides {
        format: arguments
            .get_str(RESPONSE_FORMAT_TYPE_OPTION)
            .and_then(OutputFormat::from_name),
        fields: arguments.get_list(RESPONSE_FORMAT_FILTER_OPTION),
        header: arguments
            .get(RESPONSE_FORMAT_HEADER_OPTION)
            .and_then(serde_json::Value::as_bool),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
