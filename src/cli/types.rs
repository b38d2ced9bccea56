use std::error::Error as StdError;

use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;

use crate::{
    ImperativeError,
    arguments::ResolvedArguments,
    profiles::ResolvedProfiles,
    response::CommandResponse,
    syntax::{ValidationError, ValidationKind},
};

/// Errors that end a command invocation.
///
/// Everything before the handler runs (resolution, profiles, arguments,
/// syntax) short-circuits with one of these, as do handler failures once
/// the processor has translated them. Each is rendered exactly once.
#[derive(Error, Debug)]
pub enum CommandError {
    /// No node matches the given command path.
    #[error("Unknown command: {}", tokens.join(" "))]
    UnknownCommand {
        /// Tokens walked, including the one that failed to match.
        tokens: Vec<String>,
        /// Close matches among the valid tokens at that level.
        suggestions: Vec<String>,
    },

    /// An option the command does not declare.
    #[error("Unknown option: {option}")]
    UnknownOption {
        /// Option as typed.
        option: String,
        /// Close matches among the declared options.
        suggestions: Vec<String>,
    },

    /// An option that takes a value was given none.
    #[error("No value specified for option: --{option}")]
    MissingOptionValue {
        /// Declared option name.
        option: String,
    },

    /// A required or explicitly named profile is unavailable.
    #[error("{}", profile_not_found_message(profile_type, name.as_deref()))]
    ProfileNotFound {
        /// Profile type.
        profile_type: String,
        /// Name asked for explicitly, if any.
        name: Option<String>,
    },

    /// More positional tokens than declared positionals.
    #[error(
        "Too many positional arguments: expected at most {expected}, received {received}"
    )]
    TooManyPositionals {
        /// Declared positional count.
        expected: usize,
        /// Tokens received.
        received: usize,
    },

    /// A required positional was not supplied.
    #[error("Missing positional argument: {name}")]
    MissingPositional {
        /// Positional name.
        name: String,
    },

    /// The argument set violates a declared constraint.
    #[error(transparent)]
    Validation(ValidationError),

    /// The command has no handler, or its handler is not registered.
    #[error("{}", missing_handler_message(command, handler.as_deref()))]
    MissingHandler {
        /// Command path.
        command: String,
        /// Handler identifier that failed to resolve, if one was declared.
        handler: Option<String>,
    },

    /// A handler reported an intentional, user-facing failure.
    #[error("{message}")]
    HandlerExpected {
        /// User-facing message.
        message: String,
        /// Further explanation.
        additional_details: Option<String>,
        /// Messages of the underlying causes, outermost first.
        causes: Vec<String>,
    },

    /// A handler failed in a way it did not anticipate.
    #[error("Unexpected Command Error: {message}")]
    UnexpectedInternal {
        /// Short description.
        message: String,
        /// Full detail, shown only in diagnostic mode.
        detail: Option<String>,
    },

    /// Interactive input could not be obtained.
    #[error("Unable to prompt for input: {0}")]
    Prompt(String),

    /// Framework failure (definitions, config files).
    #[error(transparent)]
    Framework(#[from] ImperativeError),
}

impl From<ValidationError> for CommandError {
    fn from(error: ValidationError) -> Self {
        match error.kind {
            ValidationKind::MissingPositional => CommandError::MissingPositional {
                name: error.option,
            },
            _ => CommandError::Validation(error),
        }
    }
}

fn profile_not_found_message(profile_type: &str, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("Profile \"{name}\" of type \"{profile_type}\" does not exist"),
        None => format!(
            "No default profile of type \"{profile_type}\" is configured, and the command requires one"
        ),
    }
}

fn missing_handler_message(command: &str, handler: Option<&str>) -> String {
    match handler {
        Some(handler) => format!(
            "Cannot invoke the command \"{command}\": handler \"{handler}\" is not registered"
        ),
        None => format!("Cannot invoke the command \"{command}\": it has no handler"),
    }
}

impl CommandError {
    /// Stable identifier of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::UnknownCommand { .. } => "UnknownCommand",
            CommandError::UnknownOption { .. } => "UnknownOption",
            CommandError::MissingOptionValue { .. } => "MissingOptionValue",
            CommandError::ProfileNotFound { .. } => "ProfileNotFound",
            CommandError::TooManyPositionals { .. } => "TooManyPositionals",
            CommandError::MissingPositional { .. } => "MissingPositional",
            CommandError::Validation(_) => "Validation",
            CommandError::MissingHandler { .. } => "MissingHandler",
            CommandError::HandlerExpected { .. } => "HandlerExpected",
            CommandError::UnexpectedInternal { .. } => "UnexpectedInternal",
            CommandError::Prompt(_) => "Prompt",
            CommandError::Framework(_) => "Framework",
        }
    }

    /// Error heading shown above the message.
    pub fn heading(&self) -> &'static str {
        match self {
            CommandError::UnknownCommand { .. }
            | CommandError::UnknownOption { .. }
            | CommandError::MissingOptionValue { .. }
            | CommandError::TooManyPositionals { .. }
            | CommandError::MissingPositional { .. }
            | CommandError::Validation(_) => "Syntax Error",
            CommandError::ProfileNotFound { .. } => "Profile Error",
            CommandError::HandlerExpected { .. } | CommandError::MissingHandler { .. } => {
                "Command Error"
            }
            CommandError::UnexpectedInternal { .. } => "Unexpected Command Error",
            CommandError::Prompt(_) | CommandError::Framework(_) => "Command Preparation Error",
        }
    }

    /// "Did you mean" candidates, if any.
    pub fn suggestions(&self) -> &[String] {
        match self {
            CommandError::UnknownCommand { suggestions, .. }
            | CommandError::UnknownOption { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    /// Whether the error is a syntax error (the handler never ran).
    pub fn is_syntax(&self) -> bool {
        self.heading() == "Syntax Error"
    }

    /// JSON form embedded in the response document. Unexpected error detail
    /// is included only when `diagnostic` is set.
    pub fn to_json(&self, diagnostic: bool) -> Value {
        let mut value = json!({
            "kind": self.kind(),
            "heading": self.heading(),
            "message": self.to_string(),
        });

        match self {
            CommandError::UnknownCommand { suggestions, .. }
            | CommandError::UnknownOption { suggestions, .. } => {
                value["suggestions"] = json!(suggestions);
            }
            CommandError::Validation(error) => {
                value["option"] = json!(error.option);
                value["definition"] = json!(error.definition);
            }
            CommandError::MissingPositional { name } => {
                value["option"] = json!(name);
            }
            CommandError::HandlerExpected {
                additional_details,
                causes,
                ..
            } => {
                if let Some(details) = additional_details {
                    value["additionalDetails"] = json!(details);
                }
                if !causes.is_empty() {
                    value["causes"] = json!(causes);
                }
            }
            CommandError::UnexpectedInternal {
                detail: Some(detail),
                ..
            } if diagnostic => {
                value["detail"] = json!(detail);
            }
            _ => {}
        }

        value
    }
}

/// A failure a handler anticipated and wants shown to the user as is.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ExpectedError {
    /// User-facing message.
    pub message: String,

    /// Further explanation.
    pub additional_details: Option<String>,

    /// Exit code to use instead of 1.
    pub exit_code: Option<i32>,

    /// Messages of the underlying causes, outermost first.
    pub causes: Vec<String>,
}

impl ExpectedError {
    /// Creates an error with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            additional_details: None,
            exit_code: None,
            causes: Vec::new(),
        }
    }

    /// Adds further explanation.
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.additional_details = Some(details.into());
        self
    }

    /// Requests a specific exit code.
    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Records `cause` and its source chain.
    pub fn caused_by(mut self, cause: &(dyn StdError + 'static)) -> Self {
        let mut current = Some(cause);
        while let Some(error) = current {
            self.causes.push(error.to_string());
            current = error.source();
        }
        self
    }
}

/// Result of a handler.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Reported as a normal command failure.
    #[error(transparent)]
    Expected(#[from] ExpectedError),

    /// Reported as an unexpected internal error.
    #[error("{0}")]
    Unexpected(Box<dyn StdError + Send + Sync>),
}

impl HandlerError {
    /// Wraps any error as unexpected.
    pub fn unexpected(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        HandlerError::Unexpected(error.into())
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(error: std::io::Error) -> Self {
        HandlerError::Unexpected(Box::new(error))
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        HandlerError::Unexpected(Box::new(error))
    }
}

/// Everything a handler receives.
#[derive(Debug)]
pub struct HandlerParameters<'a> {
    /// Final argument set.
    pub arguments: ResolvedArguments,

    /// Positional tokens as typed.
    pub positionals: Vec<String>,

    /// Profiles loaded for the command.
    pub profiles: ResolvedProfiles,

    /// Output API.
    pub response: &'a mut CommandResponse,

    /// Full argv after the program name.
    pub raw_args: Vec<String>,

    /// Space-joined command path.
    pub command: String,
}

/// Domain logic bound to a command.
///
/// Handlers write output through `params.response` and return `Ok(())` on
/// success. An [`ExpectedError`] becomes a normal command failure; any
/// other error or a panic becomes an unexpected internal error.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Runs the command.
    ///
    /// # Errors
    /// Returns `HandlerError` describing why the command failed.
    async fn process(&self, params: &mut HandlerParameters<'_>) -> Result<(), HandlerError>;
}
