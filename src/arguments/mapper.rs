use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, instrument, trace};

use super::{
    ArgumentSource, Environment, ParsedArguments, Prompter, ResolvedArguments, censor,
    env::{env_value, parse_number},
};
use crate::{
    cli::CommandError,
    config::ImperativeConfig,
    definition::{
        ArgType, CommandNode, GLOBAL_OPTIONS_GROUP, OptionDefinition, profile_option_name,
    },
    profiles::ProfileArgument,
};

/// Builds the final argument set for a command.
///
/// Layers, lowest precedence first: option defaults, profile values,
/// environment variables (`<PREFIX>_OPT_<NAME>`, positionals included),
/// command-line flags and positional tokens. An
/// array option's profile and environment values append to whatever lower
/// layer supplied (a default is replaced rather than appended to); a
/// command-line array replaces everything below it.
pub struct ArgumentMapper<'a> {
    config: &'a ImperativeConfig,
    env: &'a dyn Environment,
    prompter: Option<&'a dyn Prompter>,
}

impl<'a> ArgumentMapper<'a> {
    /// Mapper reading environment variables from `env`.
    pub fn new(config: &'a ImperativeConfig, env: &'a dyn Environment) -> Self {
        Self {
            config,
            env,
            prompter: None,
        }
    }

    /// Enables prompting through `prompter` in interactive sessions.
    pub fn with_prompter(mut self, prompter: &'a dyn Prompter) -> Self {
        self.prompter = Some(prompter);
        self
    }

    /// Profile names selected with `--<type>-profile` on the command line
    /// or through its environment variable, by profile type.
    pub fn explicit_profile_names(
        &self,
        node: &CommandNode,
        parsed: &ParsedArguments,
    ) -> BTreeMap<String, String> {
        let Some(spec) = node.profile() else {
            return BTreeMap::new();
        };

        spec.types()
            .filter_map(|profile_type| {
                let option = profile_option_name(profile_type);
                let name = parsed
                    .get(&option)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| self.env.var(&self.config.option_env_var(&option)))?;
                Some((profile_type.clone(), name))
            })
            .collect()
    }

    /// Layers every source into the final argument set, assigns
    /// positionals, converts values to their declared types and prompts for
    /// values still missing.
    ///
    /// # Errors
    /// Returns `CommandError::TooManyPositionals` when more positional
    /// tokens are given than declared, and `CommandError::Prompt` when a
    /// value must be prompted for but cannot be.
    #[instrument(skip_all, fields(command = %node.full_name()))]
    pub async fn map(
        &self,
        node: &CommandNode,
        parsed: &ParsedArguments,
        profile_arguments: &[ProfileArgument],
    ) -> Result<ResolvedArguments, CommandError> {
        let mut resolved = ResolvedArguments::default();

        self.apply_defaults(node, &mut resolved);
        self.apply_profiles(node, profile_arguments, &mut resolved);
        self.apply_environment(node, &mut resolved);
        self.apply_command_line(parsed, &mut resolved);
        self.assign_positionals(node, &parsed.positionals, &mut resolved)?;

        for option in node.options() {
            if option.secure {
                resolved.mark_secure(&option.name);
            }
        }

        for (name, value) in resolved.values_mut() {
            if let Some(arg_type) = declared_type(node, name) {
                let converted = coerce(value.clone(), arg_type);
                *value = converted;
            }
        }

        self.prompt_for_missing(node, &mut resolved).await?;

        debug!(arguments = %censor::censored(&resolved), "mapped arguments");
        Ok(resolved)
    }

    fn apply_defaults(&self, node: &CommandNode, resolved: &mut ResolvedArguments) {
        for option in node.options() {
            if let Some(default) = &option.default_value {
                resolved.set(&option.name, default.clone(), ArgumentSource::Default);
            }
        }
    }

    fn apply_profiles(
        &self,
        node: &CommandNode,
        profile_arguments: &[ProfileArgument],
        resolved: &mut ResolvedArguments,
    ) {
        for argument in profile_arguments {
            let Some(option) = node.find_option(&argument.option) else {
                trace!(property = %argument.option, "profile property matches no option");
                continue;
            };

            if argument.secure {
                resolved.mark_secure(&option.name);
            }

            match resolved.source(&option.name) {
                Some(ArgumentSource::Profile) if option.option_type != ArgType::Array => {
                    trace!(option = %option.name, profile = %argument.profile, "earlier profile wins");
                }
                _ => layer(resolved, option, argument.value.clone(), ArgumentSource::Profile),
            }
        }
    }

    fn apply_environment(&self, node: &CommandNode, resolved: &mut ResolvedArguments) {
        for option in node.options() {
            if option.group.as_deref() == Some(GLOBAL_OPTIONS_GROUP) {
                continue;
            }

            let variable = self.config.option_env_var(&option.name);
            if let Some(raw) = self.env.var(&variable) {
                trace!(option = %option.name, variable = %variable, "environment value");
                layer(
                    resolved,
                    option,
                    env_value(&raw, option.option_type),
                    ArgumentSource::Environment,
                );
            }
        }

        for positional in node.positionals() {
            let variable = self.config.option_env_var(&positional.name);
            if let Some(raw) = self.env.var(&variable) {
                trace!(positional = %positional.name, variable = %variable, "environment value");
                resolved.set(
                    &positional.name,
                    env_value(&raw, positional.positional_type),
                    ArgumentSource::Environment,
                );
            }
        }
    }

    fn apply_command_line(&self, parsed: &ParsedArguments, resolved: &mut ResolvedArguments) {
        for (name, value) in &parsed.options {
            resolved.set(name, value.clone(), ArgumentSource::CommandLine);
        }
    }

    fn assign_positionals(
        &self,
        node: &CommandNode,
        tokens: &[String],
        resolved: &mut ResolvedArguments,
    ) -> Result<(), CommandError> {
        let declared = node.positionals();
        let mut remaining = tokens.iter();

        for positional in declared {
            if positional.positional_type == ArgType::Array {
                let rest: Vec<Value> = remaining.by_ref().cloned().map(Value::String).collect();
                if !rest.is_empty() {
                    resolved.set(&positional.name, Value::Array(rest), ArgumentSource::CommandLine);
                }
                break;
            }

            match remaining.next() {
                Some(token) => resolved.set(
                    &positional.name,
                    Value::String(token.clone()),
                    ArgumentSource::CommandLine,
                ),
                None => break,
            }
        }

        let excess = remaining.count();
        if excess > 0 {
            return Err(CommandError::TooManyPositionals {
                expected: declared.len(),
                received: tokens.len(),
            });
        }

        Ok(())
    }

    async fn prompt_for_missing(
        &self,
        node: &CommandNode,
        resolved: &mut ResolvedArguments,
    ) -> Result<(), CommandError> {
        let phrase = self.config.prompt_phrase();

        for option in node.options() {
            let current = resolved.get(&option.name);
            let asked_for = current.and_then(Value::as_str) == Some(phrase);
            let missing = current.is_none() && option.required && option.promptable;

            if !asked_for && !missing {
                continue;
            }

            let prompter = match self.prompter {
                Some(prompter) if self.config.interactive() => prompter,
                _ if asked_for => {
                    return Err(CommandError::Prompt(format!(
                        "--{} asks for a prompt, but the session is not interactive",
                        option.name
                    )));
                }
                _ => continue,
            };

            let hide = option.secure || censor::is_censored_name(&option.name);
            let message = format!("Please enter \"{}\": ", option.name);
            let answer = prompter
                .prompt(&message, hide)
                .await
                .map_err(|e| CommandError::Prompt(e.to_string()))?;

            if hide {
                resolved.mark_secure(&option.name);
            }
            resolved.set(
                &option.name,
                coerce(Value::String(answer), option.option_type),
                ArgumentSource::Prompt,
            );
        }

        Ok(())
    }
}

/// Applies one profile or environment value according to the array rule.
fn layer(
    resolved: &mut ResolvedArguments,
    option: &OptionDefinition,
    value: Value,
    source: ArgumentSource,
) {
    if option.option_type == ArgType::Array {
        let below = resolved
            .source(&option.name)
            .filter(|s| *s != ArgumentSource::Default)
            .and_then(|_| resolved.get(&option.name))
            .and_then(Value::as_array)
            .cloned();

        if let Some(mut items) = below {
            match coerce(value, ArgType::Array) {
                Value::Array(more) => items.extend(more),
                other => items.push(other),
            }
            resolved.set(&option.name, Value::Array(items), source);
            return;
        }
    }

    resolved.set(&option.name, value, source);
}

fn declared_type(node: &CommandNode, name: &str) -> Option<ArgType> {
    node.options()
        .iter()
        .find(|o| o.name == name)
        .map(|o| o.option_type)
        .or_else(|| {
            node.positionals()
                .iter()
                .find(|p| p.name == name)
                .map(|p| p.positional_type)
        })
}

/// Converts `value` to `arg_type` where the conversion is unambiguous.
/// Values that do not convert are returned unchanged for validation to
/// report.
pub(crate) fn coerce(value: Value, arg_type: ArgType) -> Value {
    match (arg_type, value) {
        (ArgType::Number, Value::String(raw)) => {
            parse_number(&raw).unwrap_or(Value::String(raw))
        }
        (ArgType::Boolean, Value::String(raw)) => match raw.to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw),
        },
        (ArgType::Array, Value::Array(items)) => Value::Array(items),
        (ArgType::Array, Value::Null) => Value::Array(Vec::new()),
        (ArgType::Array, scalar) => Value::Array(vec![scalar]),
        (ArgType::Json, Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
            Ok(parsed) if !parsed.is_string() => parsed,
            _ => Value::String(raw),
        },
        (ArgType::String | ArgType::ExistingLocalFile, Value::Number(n)) => {
            Value::String(n.to_string())
        }
        (ArgType::String | ArgType::ExistingLocalFile, Value::Bool(b)) => {
            Value::String(b.to_string())
        }
        (_, value) => value,
    }
}
