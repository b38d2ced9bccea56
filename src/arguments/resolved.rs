use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value};

use super::case::{camel_case, kebab_case};

/// Layer that supplied an argument's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ArgumentSource {
    /// The option's declared default.
    Default,

    /// A loaded profile.
    Profile,

    /// An environment variable.
    Environment,

    /// The command line.
    CommandLine,

    /// An interactive prompt.
    Prompt,
}

/// Final argument set handed to a handler.
///
/// Values are keyed by declared option or positional name. Lookups accept
/// either kebab-case or camelCase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedArguments {
    values: BTreeMap<String, Value>,
    sources: BTreeMap<String, ArgumentSource>,
    secure: BTreeSet<String>,
}

impl ResolvedArguments {
    /// Value of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.key(name).and_then(|key| self.values.get(key))
    }

    /// String value of `name`.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Boolean value of `name`; absent means false.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Numeric value of `name`.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Array value of `name` as strings.
    pub fn get_list(&self, name: &str) -> Option<Vec<String>> {
        self.get(name).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
    }

    /// Whether `name` has a value.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Layer that supplied `name`.
    pub fn source(&self, name: &str) -> Option<ArgumentSource> {
        self.key(name).and_then(|key| self.sources.get(key)).copied()
    }

    /// Whether `name` was supplied by a layer other than its default.
    pub fn is_explicit(&self, name: &str) -> bool {
        self.source(name)
            .is_some_and(|source| source != ArgumentSource::Default)
    }

    /// Whether `name` holds a sensitive value.
    pub fn is_secure(&self, name: &str) -> bool {
        self.key(name).is_some_and(|key| self.secure.contains(key))
    }

    /// Names and values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no argument has a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arguments as a JSON object under both kebab-case and camelCase names.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in &self.values {
            object.insert(name.clone(), value.clone());
            let camel = camel_case(name);
            if camel != *name {
                object.insert(camel, value.clone());
            }
        }
        Value::Object(object)
    }

    pub(crate) fn set(&mut self, name: &str, value: Value, source: ArgumentSource) {
        self.values.insert(name.to_string(), value);
        self.sources.insert(name.to_string(), source);
    }

    pub(crate) fn mark_secure(&mut self, name: &str) {
        self.secure.insert(name.to_string());
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.values.iter_mut()
    }

    fn key<'a>(&'a self, name: &str) -> Option<&'a str> {
        if let Some((key, _)) = self.values.get_key_value(name) {
            return Some(key.as_str());
        }
        let kebab = kebab_case(name);
        self.values.get_key_value(&kebab).map(|(key, _)| key.as_str())
    }
}

impl FromIterator<(String, Value, ArgumentSource)> for ResolvedArguments {
    fn from_iter<I: IntoIterator<Item = (String, Value, ArgumentSource)>>(iter: I) -> Self {
        let mut resolved = Self::default();
        for (name, value, source) in iter {
            resolved.set(&name, value, source);
        }
        resolved
    }
}
