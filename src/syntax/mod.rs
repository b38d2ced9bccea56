//! Constraint checks on a command's final arguments.

mod error;
mod validator;

pub use error::{ArgumentDefinition, ValidationError, ValidationKind};
pub use validator::SyntaxValidator;

#[cfg(test)]
mod tests;
