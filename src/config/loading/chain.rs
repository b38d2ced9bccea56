use std::path::{Path, PathBuf};

use crate::{ImperativeError, Result};

/// Files currently being loaded, outermost first.
#[derive(Debug, Default)]
pub(super) struct ImportChain {
    files: Vec<PathBuf>,
}

impl ImportChain {
    /// Pushes `path`, failing if it is already being loaded.
    pub(super) fn enter(&mut self, path: &Path) -> Result<()> {
        if self.files.iter().any(|file| file == path) {
            let cycle: Vec<String> = self
                .files
                .iter()
                .map(|file| file_label(file))
                .chain(std::iter::once(file_label(path)))
                .collect();

            return Err(ImperativeError::ConfigValidation {
                component: "config imports".to_string(),
                details: format!("Circular import detected: {}", cycle.join(" -> ")),
            });
        }

        self.files.push(path.to_path_buf());
        Ok(())
    }

    pub(super) fn leave(&mut self) {
        self.files.pop();
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
