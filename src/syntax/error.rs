use serde::Serialize;
use thiserror::Error;

use crate::definition::{OptionDefinition, PositionalDefinition};

/// Which constraint a value violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationKind {
    /// A required option has no value.
    MissingRequired,

    /// A required positional has no value.
    MissingPositional,

    /// A value is not of the declared type.
    InvalidType,

    /// A value matches none of the allowable values.
    NotAllowed,

    /// Two conflicting options were both given.
    Conflict,

    /// More than one option of an only-one-of set was given.
    OnlyOneOf,

    /// An option implied by another's absence is missing.
    AbsenceImplication,

    /// An option implied by another's presence is missing.
    Implication,

    /// None of a must-specify-one set was given.
    MustSpecifyOne,

    /// A number lies outside its declared range.
    OutOfRange,

    /// A string's length lies outside its declared range.
    LengthOutOfRange,

    /// A positional does not match its pattern.
    PatternMismatch,

    /// A file argument names no existing file.
    FileNotFound,
}

/// Definition of the argument a validation error is about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgumentDefinition {
    /// An option.
    Option(OptionDefinition),

    /// A positional.
    Positional(PositionalDefinition),
}

/// First constraint violation found in an argument set.
///
/// Carries the offending argument's name and definition rather than its
/// value, so sensitive values never end up in error output.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Violated constraint.
    pub kind: ValidationKind,

    /// Name of the offending option or positional.
    pub option: String,

    /// Its definition.
    pub definition: ArgumentDefinition,

    /// Human-readable description.
    pub message: String,
}

impl ValidationError {
    pub(super) fn option(kind: ValidationKind, option: &OptionDefinition, message: String) -> Self {
        Self {
            kind,
            option: option.name.clone(),
            definition: ArgumentDefinition::Option(option.clone()),
            message,
        }
    }

    pub(super) fn positional(
        kind: ValidationKind,
        positional: &PositionalDefinition,
        message: String,
    ) -> Self {
        Self {
            kind,
            option: positional.name.clone(),
            definition: ArgumentDefinition::Positional(positional.clone()),
            message,
        }
    }
}
