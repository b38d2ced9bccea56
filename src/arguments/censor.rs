use serde_json::{Map, Value};

use super::{ResolvedArguments, case::kebab_case};
use crate::definition::CommandNode;

/// Replacement text for sensitive values.
pub const CENSOR_RESPONSE: &str = "****";

/// Option names treated as sensitive whether or not they are declared
/// secure.
const CENSORED_OPTIONS: &[&str] = &[
    "auth",
    "p",
    "pw",
    "pass",
    "password",
    "passphrase",
    "credentials",
    "authentication",
    "basic-auth",
    "tv",
    "token-value",
    "cert-file-passphrase",
];

/// Whether `name` (any case format) is one of the well-known sensitive
/// option names.
pub fn is_censored_name(name: &str) -> bool {
    let kebab = kebab_case(name);
    CENSORED_OPTIONS.contains(&kebab.as_str())
}

/// Whether the value of `name` must be hidden.
pub fn is_sensitive(arguments: &ResolvedArguments, name: &str) -> bool {
    arguments.is_secure(name) || is_censored_name(name)
}

/// Arguments as a JSON object with sensitive values replaced.
pub fn censored(arguments: &ResolvedArguments) -> Value {
    let object: Map<String, Value> = arguments
        .iter()
        .map(|(name, value)| {
            let shown = if is_sensitive(arguments, name) {
                Value::String(CENSOR_RESPONSE.to_string())
            } else {
                value.clone()
            };
            (name.to_string(), shown)
        })
        .collect();

    Value::Object(object)
}

/// Raw argv with the value following each sensitive option replaced.
///
/// An option is sensitive when its name is one of the well-known sensitive
/// names or, given the resolved `node`, when the node declares it `secure`
/// under any of its names or aliases.
pub fn censor_raw_args(args: &[String], node: Option<&CommandNode>) -> Vec<String> {
    let sensitive = |name: &str| {
        is_censored_name(name)
            || node
                .and_then(|node| node.find_option(name))
                .is_some_and(|option| option.secure)
    };

    let mut out = Vec::with_capacity(args.len());
    let mut hide_next = false;

    for arg in args {
        if hide_next {
            out.push(CENSOR_RESPONSE.to_string());
            hide_next = false;
            continue;
        }

        match arg.strip_prefix('-').map(|a| a.trim_start_matches('-')) {
            Some(body) => match body.split_once('=') {
                Some((name, _)) if sensitive(name) => {
                    let flag = &arg[..arg.len() - body.len() + name.len()];
                    out.push(format!("{flag}={CENSOR_RESPONSE}"));
                }
                Some(_) => out.push(arg.clone()),
                None => {
                    hide_next = sensitive(body);
                    out.push(arg.clone());
                }
            },
            None => out.push(arg.clone()),
        }
    }

    out
}
