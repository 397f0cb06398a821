//! Collects the Java files a command runs over.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use hintweave_syntax::SupportedLanguage;

use crate::error::AppError;

/// Files found under the given paths, plus the paths that could not be read.
#[derive(Debug, Default)]
pub(crate) struct Sources {
    pub(crate) files: Vec<Utf8PathBuf>,
    pub(crate) errors: Vec<AppError>,
}

/// Expands `paths` into Java files. Files named directly are kept whatever
/// their extension; directories are walked recursively in sorted order.
pub(crate) fn collect(paths: &[Utf8PathBuf]) -> Sources {
    let mut sources = Sources::default();
    for path in paths {
        if path.is_dir() {
            walk(path, &mut sources);
        } else if path.is_file() {
            sources.files.push(path.clone());
        } else {
            sources.errors.push(AppError::read_source(
                path.clone(),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }
    }
    sources
}

fn walk(dir: &Utf8Path, sources: &mut Sources) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            sources.errors.push(AppError::read_source(dir, source));
            return;
        }
    };
    let mut children: Vec<Utf8PathBuf> = Vec::new();
    for entry in entries.filter_map(Result::ok) {
        match Utf8PathBuf::from_path_buf(entry.path()) {
            Ok(path) => children.push(path),
            Err(path) => tracing::warn!(path = %path.display(), "skipping non UTF-8 path"),
        }
    }
    children.sort();
    for child in children {
        if child.is_dir() {
            walk(&child, sources);
        } else if SupportedLanguage::from_path(child.as_std_path()).is_some() {
            sources.files.push(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn directories_are_walked_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8");
        fs::create_dir_all(root.join("b/nested")).expect("mkdir");
        fs::write(root.join("b/nested/C.java"), "class C {}").expect("write");
        fs::write(root.join("b/A.java"), "class A {}").expect("write");
        fs::write(root.join("b/readme.md"), "docs").expect("write");
        fs::write(root.join("notes.txt"), "notes").expect("write");

        let sources = collect(&[root.join("b"), root.join("notes.txt"), root.join("gone")]);
        let names: Vec<&str> = sources
            .files
            .iter()
            .filter_map(|path| path.strip_prefix(&root).ok())
            .map(Utf8Path::as_str)
            .collect();
        assert_eq!(names, ["b/A.java", "b/nested/C.java", "notes.txt"]);
        assert_eq!(sources.errors.len(), 1);
    }
}
