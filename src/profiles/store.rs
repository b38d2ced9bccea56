use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use super::{CredentialStore, Profile};
use crate::config::ConfigFile;

/// Profiles available to one invocation, by type and name.
///
/// The store is read-only to the framework. Profile management commands
/// write the config file; the store is rebuilt from it per invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileStore {
    profiles: BTreeMap<String, BTreeMap<String, Profile>>,
    defaults: BTreeMap<String, String>,
}

impl ProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the store from a loaded config file.
    ///
    /// Secure properties missing from the file are looked up in
    /// `credentials`; a secure property found in neither place is left
    /// unset.
    pub fn from_config(config: &ConfigFile, credentials: Option<&dyn CredentialStore>) -> Self {
        let mut store = Self::new();

        for (name, entry) in &config.profiles {
            let mut profile = Profile::new(name, &entry.profile_type);

            for (key, value) in &entry.properties {
                profile.properties.insert(key.clone(), toml_to_json(value));
            }

            for key in &entry.secure {
                profile.secure.insert(key.clone());
                if profile.properties.contains_key(key) {
                    continue;
                }
                match credentials.and_then(|c| c.load(&entry.profile_type, name, key)) {
                    Some(value) => {
                        profile.properties.insert(key.clone(), value);
                    }
                    None => {
                        warn!(profile = %name, property = %key, "secure property has no value");
                    }
                }
            }

            store.insert(profile);
        }

        for (profile_type, name) in &config.defaults {
            store.set_default(profile_type, name);
        }

        debug!(types = store.profiles.len(), "loaded profile store");
        store
    }

    /// Adds or replaces a profile.
    pub fn insert(&mut self, profile: Profile) {
        self.profiles
            .entry(profile.profile_type.clone())
            .or_default()
            .insert(profile.name.clone(), profile);
    }

    /// Sets the default profile name of `profile_type`.
    pub fn set_default(&mut self, profile_type: impl Into<String>, name: impl Into<String>) {
        self.defaults.insert(profile_type.into(), name.into());
    }

    /// Profile `name` of `profile_type`.
    pub fn get(&self, profile_type: &str, name: &str) -> Option<&Profile> {
        self.profiles.get(profile_type).and_then(|by_name| by_name.get(name))
    }

    /// Configured default name of `profile_type`.
    pub fn default_name(&self, profile_type: &str) -> Option<&str> {
        self.defaults.get(profile_type).map(String::as_str)
    }

    /// Default profile of `profile_type`, if configured and present.
    pub fn default_profile(&self, profile_type: &str) -> Option<&Profile> {
        self.default_name(profile_type)
            .and_then(|name| self.get(profile_type, name))
    }

    /// Profile names of `profile_type`, sorted.
    pub fn names(&self, profile_type: &str) -> Vec<&str> {
        self.profiles
            .get(profile_type)
            .map(|by_name| by_name.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Types with at least one profile, sorted.
    pub fn types(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    /// Whether the store holds no profile.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Converts a TOML value to JSON. Datetimes become their TOML text.
pub(crate) fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect(),
        ),
    }
}
