use std::{
    fs,
    io::{Error, ErrorKind},
    path::{Path, PathBuf},
};

use crate::arguments::Environment;

/// Locations of the files a CLI reads and writes.
pub struct ConfigPaths;

impl ConfigPaths {
    /// Returns the CLI home directory.
    ///
    /// Uses `<PREFIX>_CLI_HOME` when set and non-empty, otherwise
    /// `$HOME/.<root_command>`.
    ///
    /// # Errors
    /// Returns an error if neither variable is set.
    pub fn cli_home(
        env: &dyn Environment,
        env_prefix: &str,
        root_command: &str,
    ) -> Result<PathBuf, Error> {
        let override_var = format!("{env_prefix}_CLI_HOME");

        if let Some(home) = env.var(&override_var).filter(|home| !home.trim().is_empty()) {
            return Ok(PathBuf::from(home));
        }

        env.var("HOME")
            .map(|home| PathBuf::from(home).join(format!(".{root_command}")))
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::NotFound,
                    format!("Neither {override_var} nor HOME environment variable found"),
                )
            })
    }

    /// Returns `<cli_home>/<root_command>.config.toml`.
    pub fn config_file(cli_home: &Path, root_command: &str) -> PathBuf {
        cli_home.join(format!("{root_command}.config.toml"))
    }

    /// Returns the log directory under `cli_home`.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    /// Returns error if directory cannot be created
    pub fn log_dir(cli_home: &Path) -> Result<PathBuf, Error> {
        let log_dir = cli_home.join("logs");

        if !log_dir.exists() {
            fs::create_dir_all(&log_dir)?;
        }

        Ok(log_dir)
    }
}
