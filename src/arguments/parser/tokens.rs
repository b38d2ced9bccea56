use std::collections::BTreeMap;

use serde_json::Value;
use tracing::trace;

use super::helpers::{
    boolean_or_text, looks_like_option, split_option, trailing_boolean, unknown_option,
};
use crate::{
    cli::CommandError,
    definition::{ArgType, CommandNode, OptionDefinition},
};

/// Options and positionals given on the command line for one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArguments {
    /// Option values keyed by the option's declared name. Array options
    /// hold every value given, in order.
    pub options: BTreeMap<String, Value>,

    /// Positional tokens in order.
    pub positionals: Vec<String>,

    /// How often each option appeared.
    pub occurrences: BTreeMap<String, usize>,
}

impl ParsedArguments {
    /// Value given for `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// Whether `name` was given.
    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Whether the boolean option `name` was given and is true.
    pub fn flag(&self, name: &str) -> bool {
        self.options.get(name).is_some_and(|v| v == &Value::Bool(true))
    }
}

/// Parses the tokens following a command path against `node`'s options.
///
/// Recognised forms are `--name value`, `--name=value`, `-a value`, boolean
/// flags with an optional `true`/`false`, and `--` ending option parsing.
/// An array option consumes every following token up to the next option,
/// and repeating it appends. Other repeated options keep the last value.
///
/// # Errors
/// Returns `CommandError::UnknownOption` for an option the node does not
/// declare and `CommandError::MissingOptionValue` when a value is missing.
pub fn parse(node: &CommandNode, tokens: &[String]) -> Result<ParsedArguments, CommandError> {
    let mut parsed = ParsedArguments::default();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        i += 1;

        if token == "--" {
            parsed.positionals.extend(tokens[i..].iter().cloned());
            break;
        }

        if !looks_like_option(token) {
            parsed.positionals.push(token.clone());
            continue;
        }

        let (name, inline) = split_option(token);
        let option = node.find_option(name).ok_or_else(|| unknown_option(node, token, name))?;
        let value = take_value(option, inline, tokens, &mut i)?;

        trace!(option = %option.name, "parsed option");

        *parsed.occurrences.entry(option.name.clone()).or_default() += 1;
        match (option.option_type, parsed.options.get_mut(&option.name)) {
            (ArgType::Array, Some(Value::Array(existing))) => {
                if let Value::Array(more) = value {
                    existing.extend(more);
                }
            }
            _ => {
                parsed.options.insert(option.name.clone(), value);
            }
        }
    }

    Ok(parsed)
}

fn take_value(
    option: &OptionDefinition,
    inline: Option<&str>,
    tokens: &[String],
    i: &mut usize,
) -> Result<Value, CommandError> {
    match option.option_type {
        ArgType::Boolean => {
            if let Some(raw) = inline {
                return Ok(boolean_or_text(raw));
            }
            match trailing_boolean(tokens.get(*i)) {
                Some(explicit) => {
                    *i += 1;
                    Ok(Value::Bool(explicit))
                }
                None => Ok(Value::Bool(true)),
            }
        }
        ArgType::Array => {
            let mut values: Vec<Value> = inline.map(|v| Value::String(v.to_string())).into_iter().collect();
            while let Some(next) = tokens.get(*i) {
                if looks_like_option(next) || next == "--" {
                    break;
                }
                values.push(Value::String(next.clone()));
                *i += 1;
            }
            Ok(Value::Array(values))
        }
        _ => {
            if let Some(raw) = inline {
                return Ok(Value::String(raw.to_string()));
            }
            match tokens.get(*i) {
                Some(next) if !looks_like_option(next) => {
                    *i += 1;
                    Ok(Value::String(next.clone()))
                }
                _ => Err(CommandError::MissingOptionValue {
                    option: option.name.clone(),
                }),
            }
        }
    }
}
