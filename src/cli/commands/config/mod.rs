//! Profile inspection commands.
mod list;
mod profiles;

use std::{path::PathBuf, sync::Arc};

pub use list::ListCommand;
pub use profiles::ProfilesCommand;

use crate::{
    cli::HandlerRegistry,
    definition::{ArgType, CommandDefinition, OptionDefinition},
    profiles::ProfileStore,
};

/// Name of the built-in group.
pub const GROUP_NAME: &str = "config";

/// Handler identifier of `config list`.
pub const LIST_HANDLER: &str = "config.list";

/// Handler identifier of `config profiles`.
pub const PROFILES_HANDLER: &str = "config.profiles";

/// Definition of the `config` group.
pub fn definition() -> CommandDefinition {
    CommandDefinition::group(GROUP_NAME, "Inspect the profiles available to commands")
        .child(
            CommandDefinition::command("list", "List profiles with sensitive values censored")
                .alias("ls")
                .handler(LIST_HANDLER)
                .option(
                    OptionDefinition::new("type", ArgType::String, "Only list profiles of this type")
                        .alias("t"),
                )
                .example("List every profile", "")
                .example("List fruit profiles", "--type fruit"),
        )
        .child(
            CommandDefinition::command("profiles", "List profile names by type")
                .handler(PROFILES_HANDLER)
                .output_format_options()
                .example("Show profile types as a table", "")
                .example("Only show profile names, without a header", "--rff profiles --rfh false"),
        )
}

/// Registers the `config` handlers, reading from `store`.
///
/// # Arguments
///
/// * `registry` - Registry to add the handlers to
/// * `store` - Profiles shown by the commands
/// * `config_file` - Path reported as the profiles' source
/// * `profile_types` - Types listed by `config profiles` even without profiles
pub fn register_commands(
    registry: &mut HandlerRegistry,
    store: Arc<ProfileStore>,
    config_file: PathBuf,
    profile_types: Vec<String>,
) {
    let list_store = store.clone();
    registry.register(LIST_HANDLER, move || {
        Box::new(ListCommand::new(list_store.clone(), config_file.clone()))
    });

    registry.register(PROFILES_HANDLER, move || {
        Box::new(ProfilesCommand::new(store.clone(), profile_types.clone()))
    });
}
