mod log_level;

pub use log_level::LogLevel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `[general]` section of the CLI configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct GeneralConfig {
    /// Log level used when no log level environment variable is set.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Also write logs to a daily rolling file under `<cli_home>/logs`.
    #[serde(default)]
    pub log_to_file: bool,
}
