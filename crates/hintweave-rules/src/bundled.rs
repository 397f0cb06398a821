//! Sources of named rule libraries.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A set of named `.hint` texts the store can load in bulk.
pub trait LibrarySource: Send + Sync {
    /// Returns the library names in load order.
    fn names(&self) -> Vec<String>;

    /// Returns the text of the library called `name`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the library does not exist or cannot be
    /// read.
    fn load(&self, name: &str) -> io::Result<String>;
}

const LIBRARIES: &[(&str, &str)] = &[
    ("collections", include_str!("../rules/collections.hint")),
    ("modernize-java9", include_str!("../rules/modernize-java9.hint")),
    ("modernize-java11", include_str!("../rules/modernize-java11.hint")),
    ("performance", include_str!("../rules/performance.hint")),
];

/// The rule libraries compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledLibraries;

impl BundledLibraries {
    /// Creates the source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LibrarySource for BundledLibraries {
    fn names(&self) -> Vec<String> {
        LIBRARIES.iter().map(|(name, _)| (*name).to_owned()).collect()
    }

    fn load(&self, name: &str) -> io::Result<String> {
        LIBRARIES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, text)| (*text).to_owned())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no bundled library `{name}`"))
            })
    }
}

/// Libraries stored as `<name>.hint` files in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryLibraries {
    dir: PathBuf,
}

impl DirectoryLibraries {
    /// Creates a source reading from `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl LibrarySource for DirectoryLibraries {
    /// Lists the `.hint` files of the directory in name order. An
    /// unreadable directory lists nothing.
    fn names(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(dir = %self.dir.display(), %error, "cannot list rule libraries");
                return Vec::new();
            }
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "hint"))
            .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()).map(str::to_owned))
            .collect();
        names.sort();
        names
    }

    fn load(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.dir.join(format!("{name}.hint")))
    }
}
