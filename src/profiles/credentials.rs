use std::collections::BTreeMap;

use serde_json::Value;

/// Backend holding sensitive profile values outside the config file.
///
/// When a profile lists a property as secure but the config file has no
/// value for it, the store is asked for one.
pub trait CredentialStore: Send + Sync {
    /// Secure value of `key` in profile `profile_name` of `profile_type`.
    fn load(&self, profile_type: &str, profile_name: &str, key: &str) -> Option<Value>;
}

/// Credential store kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentials {
    values: BTreeMap<(String, String, String), Value>,
}

impl MemoryCredentials {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value.
    pub fn insert(
        &mut self,
        profile_type: impl Into<String>,
        profile_name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.values.insert(
            (profile_type.into(), profile_name.into(), key.into()),
            value.into(),
        );
    }
}

impl CredentialStore for MemoryCredentials {
    fn load(&self, profile_type: &str, profile_name: &str, key: &str) -> Option<Value> {
        self.values
            .get(&(
                profile_type.to_string(),
                profile_name.to_string(),
                key.to_string(),
            ))
            .cloned()
    }
}
