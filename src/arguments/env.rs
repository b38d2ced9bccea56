use std::collections::HashMap;

use serde_json::Value;

use crate::definition::ArgType;

/// Source of environment variables.
///
/// The processor reads option overrides and the CLI home through this
/// trait, so tests can supply a plain map instead of the process
/// environment.
pub trait Environment: Send + Sync {
    /// Value of `name`, if set.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Converts an environment variable's text to a value of `arg_type`.
///
/// Booleans accept `true`/`false` in any case. Numbers that fail to parse
/// stay text so validation can report them. Arrays split on whitespace;
/// single or double quotes group words into one element.
pub fn env_value(raw: &str, arg_type: ArgType) -> Value {
    match arg_type {
        ArgType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        ArgType::Number => parse_number(raw).unwrap_or_else(|| Value::String(raw.to_string())),
        ArgType::Array => Value::Array(split_words(raw).into_iter().map(Value::String).collect()),
        ArgType::String | ArgType::Json | ArgType::ExistingLocalFile => {
            Value::String(raw.to_string())
        }
    }
}

/// Parses `raw` as an integer, then as a float.
pub(crate) fn parse_number(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Some(Value::from(integer));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

fn split_words(raw: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in raw.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_word {
        words.push(current);
    }

    words
}
