//! Shared registry of parsed hint files.
//!
//! Files are stored under their registration key and, when they declare
//! one, under their `<!id:>` as well. Both indices are concurrent maps so
//! several sessions can register and query at once.

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

use crate::bundled::LibrarySource;
use crate::error::StoreError;
use crate::hint_file::HintFile;
use crate::hint_parser::parse_hint_file;
use crate::rule::TransformationRule;

const INFERRED_PREFIX: &str = "inferred:";
const MANUAL_PREFIX: &str = "manual:";

/// Registry of hint files keyed by registration key and declared id.
#[derive(Debug, Default)]
pub struct HintStore {
    files: DashMap<String, Arc<HintFile>>,
    by_declared_id: DashMap<String, Arc<HintFile>>,
    bundled_loaded: AtomicBool,
}

impl HintStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parsed file under `key` and its declared id, replacing
    /// earlier entries. The declared id of a file replaced under `key` is
    /// dropped unless another registration has claimed it since.
    pub fn register(&self, key: impl Into<String>, file: HintFile) -> Arc<HintFile> {
        let registration_key = key.into();
        let registered = Arc::new(file);
        tracing::debug!(
            key = %registration_key,
            id = registered.id().unwrap_or_default(),
            rules = registered.rules().len(),
            "registered hint file"
        );
        let replaced = self
            .files
            .insert(registration_key, Arc::clone(&registered));
        if let Some(previous) = replaced
            && let Some(id) = previous.id()
        {
            self.by_declared_id
                .remove_if(id, |_, current| Arc::ptr_eq(current, &previous));
        }
        if let Some(id) = registered.id() {
            self.by_declared_id
                .insert(id.to_owned(), Arc::clone(&registered));
        }
        registered
    }

    /// Parses `text` and registers the result under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] when the text is not a valid hint file.
    pub fn register_from_str(&self, key: &str, text: &str) -> Result<Arc<HintFile>, StoreError> {
        let file = parse_hint_file(text).map_err(|source| StoreError::parse(key, source))?;
        Ok(self.register(key, file))
    }

    /// Reads a hint file from `reader` and registers it under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when reading fails and
    /// [`StoreError::Parse`] when the content is invalid.
    pub fn register_from_reader(
        &self,
        key: &str,
        mut reader: impl Read,
    ) -> Result<Arc<HintFile>, StoreError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|source| StoreError::io(key, source))?;
        self.register_from_str(key, &text)
    }

    /// Reads the hint file at `path` and registers it under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file cannot be read and
    /// [`StoreError::Parse`] when its content is invalid.
    pub fn register_from_file(&self, key: &str, path: &Path) -> Result<Arc<HintFile>, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| StoreError::io(key, source))?;
        self.register_from_str(key, &text)
    }

    /// Looks a file up by registration key, then by declared id.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<HintFile>> {
        self.files
            .get(key)
            .or_else(|| self.by_declared_id.get(key))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the registration keys in sorted order.
    #[must_use]
    pub fn registered_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.files.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Returns the number of registered files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns every registered file's own rules, ordered by key.
    #[must_use]
    pub fn all_rules(&self) -> Vec<Arc<TransformationRule>> {
        self.registered_ids()
            .iter()
            .filter_map(|key| self.files.get(key).map(|entry| Arc::clone(entry.value())))
            .flat_map(|file| file.rules().to_vec())
            .collect()
    }

    /// Removes the file registered under `key`, together with its declared
    /// id entry when that still refers to the same file.
    pub fn unregister(&self, key: &str) -> Option<Arc<HintFile>> {
        let (_, file) = self.files.remove(key)?;
        if let Some(id) = file.id() {
            self.by_declared_id
                .remove_if(id, |_, current| Arc::ptr_eq(current, &file));
        }
        Some(file)
    }

    /// Removes every file and resets the bundled-library flag.
    pub fn clear(&self) {
        self.files.clear();
        self.by_declared_id.clear();
        self.bundled_loaded.store(false, Ordering::Release);
    }

    /// Returns the file's own rules followed by the rules of every file it
    /// includes, transitively and depth first.
    ///
    /// An id is visited at most once. Include cycles are logged and broken;
    /// unknown includes are logged and skipped.
    #[must_use]
    pub fn resolve_includes(&self, file: &HintFile) -> Vec<Arc<TransformationRule>> {
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        if let Some(id) = file.id() {
            visited.insert(id.to_owned());
            path.push(id.to_owned());
        }
        let mut rules = file.rules().to_vec();
        self.append_includes(file, &mut visited, &mut path, &mut rules);
        rules
    }

    /// Resolves the file registered under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no file is registered under the
    /// key or declared id.
    pub fn resolve(&self, key: &str) -> Result<Vec<Arc<TransformationRule>>, StoreError> {
        let file = self.get(key).ok_or_else(|| StoreError::not_found(key))?;
        Ok(self.resolve_includes(&file))
    }

    fn append_includes(
        &self,
        file: &HintFile,
        visited: &mut HashSet<String>,
        path: &mut Vec<String>,
        rules: &mut Vec<Arc<TransformationRule>>,
    ) {
        for include in file.includes() {
            if !visited.insert(include.clone()) {
                if path.contains(include) {
                    tracing::warn!(
                        include = %include,
                        chain = %path.join(" -> "),
                        "include cycle broken"
                    );
                } else {
                    tracing::debug!(include = %include, "include already resolved");
                }
                continue;
            }
            let Some(included) = self.get(include) else {
                tracing::warn!(include = %include, "included hint file is not registered");
                continue;
            };
            rules.extend(included.rules().iter().cloned());
            path.push(include.clone());
            self.append_includes(&included, visited, path, rules);
            path.pop();
        }
    }

    /// Registers every library of `source` once per store.
    ///
    /// The first call parses and registers the libraries and returns the
    /// names that loaded; libraries that fail to load are logged and left
    /// out. Later calls, including concurrent ones, return the current
    /// registration keys without loading anything.
    pub fn load_bundled_libraries(&self, source: &dyn LibrarySource) -> Vec<String> {
        if self
            .bundled_loaded
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return self.registered_ids();
        }

        let mut loaded = Vec::new();
        for name in source.names() {
            let registered = source
                .load(&name)
                .map_err(|error| StoreError::io(&name, error))
                .and_then(|text| self.register_from_str(&name, &text));
            match registered {
                Ok(_) => loaded.push(name),
                Err(error) => tracing::warn!(library = %name, %error, "skipping bundled library"),
            }
        }
        tracing::info!(count = loaded.len(), "loaded bundled libraries");
        loaded
    }

    /// Registers mined rules under `inferred:<commit>`, tagging the file
    /// when it carries no tags.
    pub fn register_inferred_rules(&self, mut file: HintFile, commit: &str) -> Arc<HintFile> {
        let id = format!("{INFERRED_PREFIX}{commit}");
        file.set_id(id.clone());
        if file.tags().is_empty() {
            file.set_tags(vec!["inferred".to_owned(), "mining".to_owned(), commit.to_owned()]);
        }
        self.register(id, file)
    }

    /// Returns the inferred files ordered by key.
    #[must_use]
    pub fn inferred_hint_files(&self) -> Vec<Arc<HintFile>> {
        self.registered_ids()
            .iter()
            .filter(|key| key.starts_with(INFERRED_PREFIX))
            .filter_map(|key| self.get(key))
            .collect()
    }

    /// Re-registers an inferred file under `manual:<commit>` and removes the
    /// inferred entry from both indices.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInferred`] when `id` lacks the `inferred:`
    /// prefix and [`StoreError::NotFound`] when nothing is registered under
    /// it.
    pub fn promote_to_manual(&self, id: &str) -> Result<Arc<HintFile>, StoreError> {
        let Some(commit) = id.strip_prefix(INFERRED_PREFIX) else {
            return Err(StoreError::not_inferred(id));
        };
        let inferred = self.unregister(id).ok_or_else(|| StoreError::not_found(id))?;

        let manual_id = format!("{MANUAL_PREFIX}{commit}");
        let mut file = Arc::unwrap_or_clone(inferred);
        file.set_id(manual_id.clone());
        tracing::debug!(from = %id, to = %manual_id, "promoted inferred rules");
        Ok(self.register(manual_id, file))
    }
}

#[cfg(test)]
mod tests;
