use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::GeneralConfig;

/// Contents of `<cli_home>/<root>.config.toml`.
///
/// ```toml
/// imports = ["@team"]
///
/// [general]
/// log_level = "debug"
///
/// [defaults]
/// fruit = "my-banana"
///
/// [profiles.my-banana]
/// type = "fruit"
/// secure = ["password"]
///
/// [profiles.my-banana.properties]
/// color = "yellow"
/// password = "hunter2"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ConfigFile {
    /// Framework settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Named profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,

    /// Default profile name per profile type.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    /// Other config files merged underneath this one (`@name`, relative to
    /// this file, `.toml` implied).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
}

/// One `[profiles.<name>]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ProfileEntry {
    /// Profile type tag.
    #[serde(rename = "type")]
    pub profile_type: String,

    /// Property bag.
    #[serde(default)]
    #[schemars(with = "serde_json::Map<String, serde_json::Value>")]
    pub properties: toml::Table,

    /// Properties holding sensitive values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secure: Vec<String>,
}

impl ConfigFile {
    /// Profile names of `profile_type`, sorted.
    pub fn profile_names(&self, profile_type: &str) -> Vec<&str> {
        self.profiles
            .iter()
            .filter(|(_, entry)| entry.profile_type == profile_type)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
