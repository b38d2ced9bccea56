use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde_json::Value;
use tracing::debug;

use super::{ValidationError, ValidationKind};
use crate::{
    arguments::{ResolvedArguments, coerce},
    definition::{AllowableValues, ArgType, CommandNode, OptionDefinition, PositionalDefinition},
};

/// Checks a frozen argument set against a node's declared constraints.
///
/// Checks run in a fixed order and stop at the first violation: required
/// arguments, types, allowable values, conflicts (including only-one-of),
/// absence implications, then implications, must-specify-one, numeric and
/// length ranges, and positional patterns. Validation never mutates the
/// arguments, so repeating it yields the same result.
///
/// Conflicts consider only values supplied by a profile, the environment,
/// the command line or a prompt; defaults never conflict.
#[derive(Debug, Clone, Copy)]
pub struct SyntaxValidator<'a> {
    node: &'a CommandNode,
}

impl<'a> SyntaxValidator<'a> {
    /// Validator for `node`.
    pub fn new(node: &'a CommandNode) -> Self {
        Self { node }
    }

    /// Validates `args`.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate(&self, args: &ResolvedArguments) -> Result<(), ValidationError> {
        let result = self
            .check_required(args)
            .and_then(|()| self.check_types(args))
            .and_then(|()| self.check_allowable_values(args))
            .and_then(|()| self.check_conflicts(args))
            .and_then(|()| self.check_absence_implications(args))
            .and_then(|()| self.check_implications(args))
            .and_then(|()| self.check_must_specify_one(args))
            .and_then(|()| self.check_ranges(args))
            .and_then(|()| self.check_positional_patterns(args));

        if let Err(error) = &result {
            debug!(command = %self.node.full_name(), kind = ?error.kind, option = %error.option, "syntax validation failed");
        }

        result
    }

    fn check_required(&self, args: &ResolvedArguments) -> Result<(), ValidationError> {
        for positional in self.node.positionals() {
            if positional.required && !args.contains(&positional.name) {
                return Err(ValidationError::positional(
                    ValidationKind::MissingPositional,
                    positional,
                    format!("Missing Positional Argument: {}", positional.name),
                ));
            }
        }

        for option in self.node.options() {
            if option.required && !args.contains(&option.name) {
                return Err(ValidationError::option(
                    ValidationKind::MissingRequired,
                    option,
                    format!("Missing Required Option: --{}", option.name),
                ));
            }
        }

        Ok(())
    }

    fn check_types(&self, args: &ResolvedArguments) -> Result<(), ValidationError> {
        for option in self.node.options() {
            if let Some(value) = args.get(&option.name)
                && let Some(problem) = type_problem(value, option.option_type)
            {
                return Err(ValidationError::option(
                    type_kind(option.option_type, &problem),
                    option,
                    format!("Invalid value for --{}: {problem}", option.name),
                ));
            }
        }

        for positional in self.node.positionals() {
            if let Some(value) = args.get(&positional.name)
                && let Some(problem) = type_problem(value, positional.positional_type)
            {
                return Err(ValidationError::positional(
                    type_kind(positional.positional_type, &problem),
                    positional,
                    format!("Invalid value for positional {}: {problem}", positional.name),
                ));
            }
        }

        Ok(())
    }

    fn check_allowable_values(&self, args: &ResolvedArguments) -> Result<(), ValidationError> {
        for option in self.node.options() {
            let (Some(allowable), Some(value)) = (&option.allowable_values, args.get(&option.name))
            else {
                continue;
            };

            let patterns = allowable_patterns(allowable);
            let values = match value {
                Value::Array(items) => items.iter().map(display_value).collect(),
                other => vec![display_value(other)],
            };

            for candidate in values {
                if !patterns.iter().any(|pattern| pattern.is_match(&candidate)) {
                    return Err(ValidationError::option(
                        ValidationKind::NotAllowed,
                        option,
                        format!(
                            "Invalid value specified for option: --{}. Allowable values: {}",
                            option.name,
                            allowable.values.join(", ")
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    fn check_conflicts(&self, args: &ResolvedArguments) -> Result<(), ValidationError> {
        for option in self.node.options() {
            if !args.is_explicit(&option.name) {
                continue;
            }

            for other in &option.conflicts_with {
                if args.is_explicit(other) {
                    return Err(ValidationError::option(
                        ValidationKind::Conflict,
                        option,
                        format!(
                            "You cannot specify both --{} and --{}",
                            option.name, other
                        ),
                    ));
                }
            }
        }

        let only_one_of = &self.node.definition().only_one_of;
        let given: Vec<&OptionDefinition> = only_one_of
            .iter()
            .filter_map(|name| self.node.find_option(name))
            .filter(|option| args.is_explicit(&option.name))
            .collect();

        if let [_, second, ..] = given.as_slice() {
            return Err(ValidationError::option(
                ValidationKind::OnlyOneOf,
                second,
                format!(
                    "You may specify only one of the following options: --{}",
                    only_one_of.join(", --")
                ),
            ));
        }

        Ok(())
    }

    fn check_absence_implications(&self, args: &ResolvedArguments) -> Result<(), ValidationError> {
        for option in self.node.options() {
            if was_specified(args, &option.name) {
                continue;
            }

            for implied in &option.absence_implications {
                if !was_specified(args, implied) {
                    return Err(ValidationError::option(
                        ValidationKind::AbsenceImplication,
                        option,
                        format!(
                            "If you do not specify --{}, you must specify --{}",
                            option.name, implied
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    fn check_implications(&self, args: &ResolvedArguments) -> Result<(), ValidationError> {
        for option in self.node.options() {
            if !args.is_explicit(&option.name) {
                continue;
            }

            for implied in &option.implies {
                if !args.contains(implied) {
                    return Err(ValidationError::option(
                        ValidationKind::Implication,
                        option,
                        format!(
                            "If you specify --{}, you must also specify --{}",
                            option.name, implied
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    fn check_must_specify_one(&self, args: &ResolvedArguments) -> Result<(), ValidationError> {
        let names = &self.node.definition().must_specify_one;
        if names.is_empty() || names.iter().any(|name| args.contains(name)) {
            return Ok(());
        }

        match names.first().and_then(|name| self.node.find_option(name)) {
            Some(first) => Err(ValidationError::option(
                ValidationKind::MustSpecifyOne,
                first,
                format!(
                    "You must specify one of the following options: --{}",
                    names.join(", --")
                ),
            )),
            None => Ok(()),
        }
    }

    fn check_ranges(&self, args: &ResolvedArguments) -> Result<(), ValidationError> {
        for option in self.node.options() {
            let Some(value) = args.get(&option.name) else {
                continue;
            };

            if let (Some([min, max]), Some(number)) = (option.numeric_value_range, value.as_f64())
                && (number < min || number > max)
            {
                return Err(ValidationError::option(
                    ValidationKind::OutOfRange,
                    option,
                    format!("--{} must be between {min} and {max}", option.name),
                ));
            }

            if let (Some([min, max]), Some(text)) = (option.string_length_range, value.as_str()) {
                let length = text.chars().count();
                if length < min || length > max {
                    return Err(ValidationError::option(
                        ValidationKind::LengthOutOfRange,
                        option,
                        format!(
                            "--{} must be between {min} and {max} characters long",
                            option.name
                        ),
                    ));
                }
            }
        }

        for positional in self.node.positionals() {
            if let (Some([min, max]), Some(text)) = (
                positional.string_length_range,
                args.get(&positional.name).and_then(Value::as_str),
            ) {
                let length = text.chars().count();
                if length < min || length > max {
                    return Err(ValidationError::positional(
                        ValidationKind::LengthOutOfRange,
                        positional,
                        format!(
                            "{} must be between {min} and {max} characters long",
                            positional.name
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    fn check_positional_patterns(&self, args: &ResolvedArguments) -> Result<(), ValidationError> {
        for positional in self.node.positionals() {
            let (Some(pattern), Some(value)) = (&positional.regex, args.get(&positional.name))
            else {
                continue;
            };

            if !matches_pattern(pattern, &display_value(value)) {
                return Err(pattern_error(positional, pattern));
            }
        }

        Ok(())
    }
}

fn pattern_error(positional: &PositionalDefinition, pattern: &str) -> ValidationError {
    ValidationError::positional(
        ValidationKind::PatternMismatch,
        positional,
        format!(
            "Positional {} does not match the required pattern: {pattern}",
            positional.name
        ),
    )
}

/// Why `value` is not a valid `arg_type`, if it is not.
fn type_problem(value: &Value, arg_type: ArgType) -> Option<String> {
    let value = coerce(value.clone(), arg_type);

    match arg_type {
        ArgType::String => (!value.is_string()).then(|| "expected a string".to_string()),
        ArgType::Boolean => (!value.is_boolean()).then(|| "expected true or false".to_string()),
        ArgType::Number => (!value.is_number()).then(|| "expected a number".to_string()),
        ArgType::Array => (!value.is_array()).then(|| "expected a list".to_string()),
        ArgType::Json => match &value {
            Value::String(raw) => serde_json::from_str::<Value>(raw)
                .err()
                .map(|e| format!("expected JSON ({e})")),
            _ => None,
        },
        ArgType::ExistingLocalFile => match value.as_str() {
            Some(path) if Path::new(path).is_file() => None,
            Some(path) => Some(format!("no such file: {path}")),
            None => Some("expected a file path".to_string()),
        },
    }
}

fn type_kind(arg_type: ArgType, problem: &str) -> ValidationKind {
    if arg_type == ArgType::ExistingLocalFile && problem.starts_with("no such file") {
        ValidationKind::FileNotFound
    } else {
        ValidationKind::InvalidType
    }
}

/// Present with a value other than boolean `false`. A flag turned off
/// counts as absent.
fn was_specified(args: &ResolvedArguments, name: &str) -> bool {
    args.get(name).is_some_and(|value| value != &Value::Bool(false))
}

fn allowable_patterns(allowable: &AllowableValues) -> Vec<Regex> {
    allowable
        .values
        .iter()
        .filter_map(|value| {
            RegexBuilder::new(&format!("^(?:{value})$"))
                .case_insensitive(!allowable.case_sensitive)
                .build()
                .ok()
        })
        .collect()
}

fn matches_pattern(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).is_ok_and(|regex| regex.is_match(value))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
