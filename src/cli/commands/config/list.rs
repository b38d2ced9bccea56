use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::{
    cli::{CommandHandler, HandlerError, HandlerParameters, formatting::format_value},
    profiles::ProfileStore,
};

/// Lists profiles and their properties, sensitive values censored.
///
/// # Example Usage
///
/// ```bash
/// sample config list
/// sample config list --type fruit
/// ```
pub struct ListCommand {
    store: Arc<ProfileStore>,
    config_file: PathBuf,
}

impl ListCommand {
    /// Creates a ListCommand over `store`.
    pub fn new(store: Arc<ProfileStore>, config_file: PathBuf) -> Self {
        Self { store, config_file }
    }
}

#[async_trait]
impl CommandHandler for ListCommand {
    async fn process(&self, params: &mut HandlerParameters<'_>) -> Result<(), HandlerError> {
        let only = params.arguments.get_str("type").map(str::to_string);
        let response = &mut *params.response;

        response.log(format!("Config file: {}", self.config_file.display()));

        let mut data = Map::new();
        for profile_type in self.store.types() {
            if only.as_deref().is_some_and(|only| only != profile_type) {
                continue;
            }

            let default = self.store.default_name(profile_type);
            response.log("");
            response.log(match default {
                Some(name) => format!("{profile_type} (default: {name})"),
                None => profile_type.to_string(),
            });

            let mut profiles = Map::new();
            for name in self.store.names(profile_type) {
                let Some(profile) = self.store.get(profile_type, name) else {
                    continue;
                };
                let properties = profile.censored_properties();

                response.log(format!("  {name}"));
                if let Value::Object(map) = &properties {
                    for (key, value) in map {
                        response.log(format!("    {key}: {}", format_value(value)));
                    }
                }
                profiles.insert(name.to_string(), properties);
            }

            data.insert(
                profile_type.to_string(),
                json!({ "default": default, "profiles": profiles }),
            );
        }

        if data.is_empty() {
            response.log("No profiles found.");
        }

        response.set_obj(Value::Object(data), false);
        Ok(())
    }
}
