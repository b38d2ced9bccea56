use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::arguments::censor::{CENSOR_RESPONSE, is_censored_name};

/// A named, typed bag of property values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Profile name, unique within its type.
    pub name: String,

    /// Type tag the profile belongs to.
    #[serde(rename = "type")]
    pub profile_type: String,

    /// Property values keyed by property name.
    pub properties: Map<String, Value>,

    /// Properties holding sensitive values.
    pub secure: BTreeSet<String>,
}

impl Profile {
    /// Creates an empty profile.
    pub fn new(name: impl Into<String>, profile_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profile_type: profile_type.into(),
            properties: Map::new(),
            secure: BTreeSet::new(),
        }
    }

    /// Adds a property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Adds a sensitive property.
    pub fn secure_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        self.secure.insert(key.clone());
        self.properties.insert(key, value.into());
        self
    }

    /// Value of `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Whether `key` is sensitive, by declaration or by its name.
    pub fn is_secure(&self, key: &str) -> bool {
        self.secure.contains(key) || is_censored_name(key)
    }

    /// Properties with sensitive values replaced.
    pub fn censored_properties(&self) -> Value {
        Value::Object(
            self.properties
                .iter()
                .map(|(key, value)| {
                    let shown = if self.is_secure(key) {
                        Value::String(CENSOR_RESPONSE.to_string())
                    } else {
                        value.clone()
                    };
                    (key.clone(), shown)
                })
                .collect(),
        )
    }
}
