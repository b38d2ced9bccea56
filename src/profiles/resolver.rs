use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{Profile, ProfileStore};
use crate::{arguments::case::kebab_case, cli::CommandError, definition::ProfileSpec};

/// One profile property mapped onto an option.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileArgument {
    /// Option name (kebab-case of the property name).
    pub option: String,

    /// Property value.
    pub value: Value,

    /// The value is sensitive.
    pub secure: bool,

    /// Profile the value came from.
    pub profile: String,
}

/// Profiles loaded for one invocation and the arguments they contribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedProfiles {
    profiles: Vec<Profile>,
    arguments: Vec<ProfileArgument>,
}

impl ResolvedProfiles {
    /// Loaded profile of `profile_type`.
    pub fn get(&self, profile_type: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.profile_type == profile_type)
    }

    /// Loaded profiles, required types first.
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Contributed arguments in load order.
    pub fn arguments(&self) -> &[ProfileArgument] {
        &self.arguments
    }

    /// Whether no profile was loaded.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Selects the profiles a command needs and maps their properties onto
/// option names.
pub struct ProfileResolver<'a> {
    store: &'a ProfileStore,
}

impl<'a> ProfileResolver<'a> {
    /// Resolver reading from `store`.
    pub fn new(store: &'a ProfileStore) -> Self {
        Self { store }
    }

    /// Loads one profile per type listed in `spec`.
    ///
    /// A name in `explicit` (type to name, from `--<type>-profile`) wins over
    /// the type's configured default. A type with no explicit name and no
    /// default fails if it is required and is skipped if it is optional. An
    /// explicit name that does not exist always fails.
    ///
    /// # Errors
    /// Returns `CommandError::ProfileNotFound` as described above.
    #[instrument(skip(self, spec), fields(required = ?spec.required, optional = ?spec.optional))]
    pub fn resolve(
        &self,
        spec: &ProfileSpec,
        explicit: &BTreeMap<String, String>,
    ) -> Result<ResolvedProfiles, CommandError> {
        let mut resolved = ResolvedProfiles::default();

        for profile_type in spec.types() {
            let Some(profile) = self.select(spec, profile_type, explicit)? else {
                debug!(profile_type = %profile_type, "optional profile type has no profile");
                continue;
            };

            debug!(profile_type = %profile_type, profile = %profile.name, "loaded profile");

            for (key, value) in &profile.properties {
                resolved.arguments.push(ProfileArgument {
                    option: kebab_case(key),
                    value: value.clone(),
                    secure: profile.is_secure(key),
                    profile: profile.name.clone(),
                });
            }
            resolved.profiles.push(profile.clone());
        }

        Ok(resolved)
    }

    fn select(
        &self,
        spec: &ProfileSpec,
        profile_type: &str,
        explicit: &BTreeMap<String, String>,
    ) -> Result<Option<&'a Profile>, CommandError> {
        if let Some(name) = explicit.get(profile_type) {
            return self
                .store
                .get(profile_type, name)
                .map(Some)
                .ok_or_else(|| CommandError::ProfileNotFound {
                    profile_type: profile_type.to_string(),
                    name: Some(name.clone()),
                });
        }

        match self.store.default_profile(profile_type) {
            Some(profile) => Ok(Some(profile)),
            None if spec.is_required(profile_type) => Err(CommandError::ProfileNotFound {
                profile_type: profile_type.to_string(),
                name: self.store.default_name(profile_type).map(str::to_string),
            }),
            None => Ok(None),
        }
    }
}
