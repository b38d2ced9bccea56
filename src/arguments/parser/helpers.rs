//! Helper functions shared by the token walk and by callers that need to
//! look at argv before a command is resolved.

use serde_json::Value;

use crate::{
    arguments::case::kebab_case,
    cli::CommandError,
    definition::{CommandNode, suggest_similar},
};

/// Whether `token` is an option rather than a value. Negative numbers are
/// values.
pub(super) fn looks_like_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && token.parse::<f64>().is_err()
}

/// Splits `--name=value` into its name and inline value.
pub(super) fn split_option(token: &str) -> (&str, Option<&str>) {
    let body = token.trim_start_matches('-');
    match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}

/// `true`/`false` in any case become booleans; anything else stays text
/// for validation to report.
pub(super) fn boolean_or_text(raw: &str) -> Value {
    match raw.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// Explicit boolean given as the token after a flag.
pub(super) fn trailing_boolean(next: Option<&String>) -> Option<bool> {
    match next.map(|t| t.to_ascii_lowercase()).as_deref() {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

pub(super) fn unknown_option(node: &CommandNode, token: &str, name: &str) -> CommandError {
    let candidates = node
        .options()
        .iter()
        .flat_map(|o| std::iter::once(o.name.as_str()).chain(o.aliases.iter().map(String::as_str)));

    CommandError::UnknownOption {
        option: token.split_once('=').map_or(token, |(t, _)| t).to_string(),
        suggestions: suggest_similar(name, candidates)
            .into_iter()
            .map(|s| if s.len() == 1 { format!("-{s}") } else { format!("--{s}") })
            .collect(),
    }
}

/// Value of a boolean flag found anywhere before `--`, without knowing the
/// command yet.
///
/// `names` lists the flag's name and aliases. Matching accepts either case
/// format, `--flag=true|false` and a trailing `true`/`false` token, the
/// same forms [`parse`](super::parse) accepts. The last occurrence wins.
/// Returns `false` when the flag is absent.
///
/// ```
/// use imperative::arguments::scan_flag;
///
/// let args: Vec<String> = ["eat", "--rfj", "false"].map(String::from).to_vec();
/// assert!(!scan_flag(&args, &["response-format-json", "rfj"]));
/// ```
pub fn scan_flag(args: &[String], names: &[&str]) -> bool {
    let wanted: Vec<String> = names.iter().map(|name| kebab_case(name)).collect();
    let mut value = false;

    for (index, arg) in args.iter().enumerate() {
        if arg == "--" {
            break;
        }
        if !looks_like_option(arg) {
            continue;
        }

        let (name, inline) = split_option(arg);
        if !wanted.contains(&kebab_case(name)) {
            continue;
        }

        value = match inline {
            Some(raw) => boolean_or_text(raw) == Value::Bool(true),
            None => trailing_boolean(args.get(index + 1)).unwrap_or(true),
        };
    }

    value
}
