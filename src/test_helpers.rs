//! Shared test utilities: fixture builders and listing helpers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let issue = make_issue(tmp.path(), "si_20100802", &["si_20100802_1_1_01.pdf"]);
//! assert_eq!(dir_listing(&issue), vec!["si_20100802_1_1_01.pdf"]);
//! ```

use crate::package::BACKGROUND_IMAGES;
use std::fs;
use std::path::{Path, PathBuf};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create an empty file, including missing parent directories.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"").unwrap();
}

/// Create `root/name` holding the given files. Each file's content is its
/// own original name, so tests can tell which source a renamed file came from.
pub fn make_issue(root: &Path, name: &str, files: &[&str]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for file in files {
        fs::write(dir.join(file), file.as_bytes()).unwrap();
    }
    dir
}

/// Write the four package background images into `dir`.
pub fn write_backgrounds(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    for name in BACKGROUND_IMAGES {
        fs::write(dir.join(name), name.as_bytes()).unwrap();
    }
}

// =========================================================================
// Listings
// =========================================================================

/// File names of `paths`, in the given order.
pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

/// Sorted names of every entry directly under `dir`.
pub fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Content of a file as a string. Panics with the path on failure.
pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}
