//! Extension-based file matching for a single directory level

use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

/// Errors that can occur while resolving a rule's candidate files
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("unable to read directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file selected for one rule, with the fields placeholder expansion
/// needs precomputed.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    /// Path as listed, relative to whatever the directory argument was.
    pub path: PathBuf,
    /// File name without its extension.
    pub stem: String,
    /// Absolute, symlink-resolved path.
    pub resolved: PathBuf,
}

/// The suffix of a file name, including the leading dot (`".txt"`), or an
/// empty string if the name has no extension. A leading dot alone
/// (`".gitignore"`) is not an extension.
fn suffix(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// List the direct children of `dir` whose suffix equals `extension`
/// exactly (case-sensitive, leading dot included).
///
/// Only regular files are candidates; subdirectories are never descended
/// into, and a directory whose name happens to end in `extension` is not a
/// match. Order is filesystem iteration order, stable within a run.
///
/// # Errors
///
/// Returns `MatchError::NotADirectory` if `dir` is missing or not a
/// directory, or `MatchError::Io` if listing it fails.
pub fn files_with_extension(
    dir: &Path,
    extension: &str,
) -> Result<Vec<FileCandidate>, MatchError> {
    if !dir.is_dir() {
        return Err(MatchError::NotADirectory(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|e| MatchError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MatchError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() || suffix(&path) != extension {
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Entries can vanish between listing and resolution
        let resolved = match path.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                warn!("unable to canonicalize {}: {e}", path.display());
                std::path::absolute(&path).unwrap_or_else(|_| path.clone())
            }
        };
        candidates.push(FileCandidate {
            path,
            stem,
            resolved,
        });
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_matches_exact_suffix_only() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.txt");
        touch(dir.path(), "b.txt");
        touch(dir.path(), "c.log");
        touch(dir.path(), "d.TXT");

        let mut found: Vec<String> = files_with_extension(dir.path(), ".txt")
            .unwrap()
            .into_iter()
            .map(|f| f.stem)
            .collect();
        found.sort();
        assert_eq!(found, vec!["a", "b"]);
    }

    #[test]
    fn test_does_not_descend_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub"), "nested.txt");
        std::fs::create_dir(dir.path().join("dir.txt")).unwrap();
        touch(dir.path(), "top.txt");

        let found = files_with_extension(dir.path(), ".txt").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].stem, "top");
    }

    #[test]
    fn test_candidate_fields() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "report.txt");

        let found = files_with_extension(dir.path(), ".txt").unwrap();
        assert_eq!(found.len(), 1);
        let candidate = &found[0];
        assert_eq!(candidate.stem, "report");
        assert!(candidate.resolved.is_absolute());
        assert!(candidate.resolved.ends_with("report.txt"));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let result = files_with_extension(&missing, ".txt");
        match result {
            Err(MatchError::NotADirectory(path)) => assert_eq!(path, missing),
            other => panic!("Expected NotADirectory, got: {other:?}"),
        }
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".gitignore");

        let found = files_with_extension(dir.path(), ".gitignore").unwrap();
        assert!(found.is_empty());
    }
}
