mod chain;
mod merging;

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use chain::ImportChain;
use merging::merge_imports;
use toml::Value;
use tracing::debug;

use super::ConfigFile;
use crate::{ImperativeError, Result};

impl ConfigFile {
    /// Loads the configuration file at `path`, merging its imports.
    ///
    /// Entries of the `imports` array that start with `@` name other files,
    /// relative to the importing file, with `.toml` implied. Imported files
    /// are merged underneath the importing file, so the importing file wins
    /// on conflicts. A missing file yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a file cannot be read or is not valid TOML
    /// - an imported file does not exist
    /// - imports form a cycle
    /// - the merged document does not describe a configuration
    pub fn load(path: &Path) -> Result<ConfigFile> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using empty configuration");
            return Ok(ConfigFile::default());
        }

        let canonical = path.canonicalize().map_err(|e| ImperativeError::IoError {
            path: path.to_path_buf(),
            details: format!("Failed to resolve path: {e}"),
        })?;

        let mut chain = ImportChain::default();
        let merged = Self::load_value(&canonical, &mut chain)?;

        merged
            .try_into()
            .map_err(|e| ImperativeError::ConfigValidation {
                component: canonical.display().to_string(),
                details: format!("Configuration validation failed: {e}"),
            })
    }

    /// Every file taking part in the configuration, importing file first.
    ///
    /// Files reached through several imports are listed once. Missing files
    /// are listed but not descended into.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn files(path: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut seen = HashSet::new();
        Self::collect_files(path, &mut files, &mut seen)?;
        Ok(files)
    }

    fn load_value(path: &Path, chain: &mut ImportChain) -> Result<Value> {
        chain.enter(path)?;
        let result = Self::read_with_imports(path, chain);
        chain.leave();
        result
    }

    fn read_with_imports(path: &Path, chain: &mut ImportChain) -> Result<Value> {
        let content = fs::read_to_string(path).map_err(|e| ImperativeError::import(e, path))?;
        let document: Value =
            toml::from_str(&content).map_err(|e| ImperativeError::toml_parse(e, Some(path)))?;

        let imported = import_names(&document)
            .iter()
            .map(|name| {
                let resolved = resolve_import(path, name)?;
                let canonical = resolved
                    .canonicalize()
                    .map_err(|e| ImperativeError::import(e, &resolved))?;
                debug!(from = %path.display(), import = %canonical.display(), "importing config");
                Self::load_value(&canonical, chain)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(merge_imports(imported, document))
    }

    fn collect_files(
        path: &Path,
        files: &mut Vec<PathBuf>,
        seen: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !seen.insert(canonical.clone()) {
            return Ok(());
        }
        files.push(canonical.clone());

        if canonical.exists() {
            let content = fs::read_to_string(&canonical)?;
            let document: Value = toml::from_str(&content)
                .map_err(|e| ImperativeError::toml_parse(e, Some(&canonical)))?;

            for name in import_names(&document) {
                let resolved = resolve_import(&canonical, &name)?;
                Self::collect_files(&resolved, files, seen)?;
            }
        }

        Ok(())
    }
}

fn import_names(document: &Value) -> Vec<String> {
    document
        .get("imports")
        .and_then(Value::as_array)
        .map(|imports| {
            imports
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|entry| entry.strip_prefix('@'))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn resolve_import(importing: &Path, name: &str) -> Result<PathBuf> {
    let directory = importing.parent().ok_or_else(|| ImperativeError::ImportError {
        path: importing.to_path_buf(),
        details: "Invalid base path - no parent directory".to_string(),
    })?;

    let mut file = PathBuf::from(name);
    if file.extension().is_none() {
        file.set_extension("toml");
    }

    Ok(directory.join(file))
}
