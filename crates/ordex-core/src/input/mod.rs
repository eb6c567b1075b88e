//! Input discovery and filename normalization.

mod resolver;

pub use resolver::{canonical_filename, parse_filename, resolve, ParsedFilename};

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::InputError;

/// List documents in `directory` matching `pattern`, sorted by path.
pub fn discover(directory: &Path, pattern: &str) -> Result<Vec<PathBuf>, InputError> {
    let full_pattern = directory.join(pattern);
    let full_pattern = full_pattern.to_string_lossy();

    let mut files: Vec<PathBuf> = glob::glob(&full_pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    debug!("Found {} documents matching {}", files.len(), full_pattern);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_matches_pattern_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2_2024-01-02.pdf"), b"").unwrap();
        fs::write(dir.path().join("1_2024-01-01.pdf"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let files = discover(dir.path(), "*.pdf").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["1_2024-01-01.pdf", "2_2024-01-02.pdf"]);
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path(), "*.pdf").unwrap().is_empty());
    }
}
