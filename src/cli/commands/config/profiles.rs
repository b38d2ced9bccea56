use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::{
    cli::{CommandHandler, HandlerError, HandlerParameters},
    profiles::ProfileStore,
    response::OutputFormat,
};

/// Lists profile names per type as a table, one row per type.
///
/// Every type the CLI registered gets a row even when no profile of that
/// type exists yet. Types only found in the config file follow.
pub struct ProfilesCommand {
    store: Arc<ProfileStore>,
    profile_types: Vec<String>,
}

impl ProfilesCommand {
    /// Creates a ProfilesCommand over `store` listing `profile_types` first.
    pub fn new(store: Arc<ProfileStore>, profile_types: Vec<String>) -> Self {
        Self {
            store,
            profile_types,
        }
    }

    fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.profile_types.iter().map(String::as_str).collect();
        for profile_type in self.store.types() {
            if !types.contains(&profile_type) {
                types.push(profile_type);
            }
        }
        types
    }
}

#[async_trait]
impl CommandHandler for ProfilesCommand {
    async fn process(&self, params: &mut HandlerParameters<'_>) -> Result<(), HandlerError> {
        let mut rows = Vec::new();
        let mut data = Map::new();

        for profile_type in self.types() {
            let names = self.store.names(profile_type);
            let default = self.store.default_name(profile_type).unwrap_or_default();

            rows.push(json!({
                "type": profile_type,
                "default": default,
                "profiles": names.join(", "),
            }));
            data.insert(profile_type.to_string(), json!(names));
        }

        if rows.is_empty() {
            params.response.log("No profile types found.");
        } else {
            params
                .response
                .log_output(&Value::Array(rows), OutputFormat::Table, None, true);
        }

        params.response.set_obj(data.into(), false);
        Ok(())
    }
}
