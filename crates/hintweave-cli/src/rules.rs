//! Builds the rule store a command runs with.

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use hintweave_config::Config;
use hintweave_rules::{BundledLibraries, HintStore, TransformationRule};

use crate::error::AppError;

/// Rules sharing one severity.
pub(crate) type SeverityGroup = (String, Vec<Arc<TransformationRule>>);

/// Loads the bundled libraries unless disabled by `config` or
/// `skip_bundled`, then every configured rule path. A user rule file
/// registers under its file stem, so it replaces a bundled library of the
/// same name.
pub(crate) fn load_store(config: &Config, skip_bundled: bool) -> Result<HintStore, AppError> {
    let store = HintStore::new();
    if config.bundled() && !skip_bundled {
        store.load_bundled_libraries(&BundledLibraries::new());
    }
    for path in config.rule_paths() {
        register_path(&store, path)?;
    }
    Ok(store)
}

fn register_path(store: &HintStore, path: &Utf8Path) -> Result<(), AppError> {
    if path.is_dir() {
        for file in hint_files_in(path)? {
            register_file(store, &file)?;
        }
        Ok(())
    } else if path.is_file() {
        register_file(store, path)
    } else {
        Err(AppError::MissingRulePath {
            path: path.to_path_buf(),
        })
    }
}

fn register_file(store: &HintStore, path: &Utf8Path) -> Result<(), AppError> {
    let key = path.file_stem().unwrap_or_else(|| path.as_str());
    store.register_from_file(key, path.as_std_path())?;
    tracing::debug!(key, path = %path, "registered rule file");
    Ok(())
}

fn hint_files_in(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, AppError> {
    let entries = fs::read_dir(dir).map_err(|source| AppError::read_source(dir, source))?;
    let mut files: Vec<Utf8PathBuf> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| Utf8PathBuf::from_path_buf(entry.path()).ok())
        .filter(|path| path.extension() == Some("hint") && path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Groups the rules of every registered file by the file's severity.
///
/// Included files are registered in their own right, so the groups cover
/// every rule an include would pull in.
pub(crate) fn severity_groups(store: &HintStore) -> Vec<SeverityGroup> {
    let mut groups: BTreeMap<String, Vec<Arc<TransformationRule>>> = BTreeMap::new();
    for key in store.registered_ids() {
        if let Some(file) = store.get(&key) {
            groups
                .entry(file.severity().to_owned())
                .or_default()
                .extend(file.rules().iter().cloned());
        }
    }
    groups.into_iter().collect()
}
