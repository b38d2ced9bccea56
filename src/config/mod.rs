//! CLI configuration.
//!
//! [`ImperativeConfig`] is the explicit context object describing one CLI:
//! its name, environment prefix, home directory and profile types. The
//! persisted side lives in a TOML file under the CLI home, described by
//! [`ConfigFile`]; config files may import other files, which are merged
//! underneath the importing file.

mod context;
mod file;
mod general;
mod loading;
mod paths;

pub use context::{DEFAULT_PROMPT_PHRASE, ImperativeConfig, ImperativeConfigBuilder};
pub use file::{ConfigFile, ProfileEntry};
pub use general::{GeneralConfig, LogLevel};
pub use paths::ConfigPaths;
