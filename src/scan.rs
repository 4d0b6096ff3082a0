//! Filesystem discovery of issue directories and their page assets.
//!
//! ## Directory Structure
//!
//! The worker expects a root directory with one subdirectory per issue:
//!
//! ```text
//! legacy/                              # --dir
//! ├── si_20100802/                     # Issue (name carries the issue date)
//! │   ├── si_20100802_1_1_01.pdf
//! │   ├── si_20100802_1_1_01.jpg
//! │   ├── si_20100802_1_1_02.pdf
//! │   └── si_20100802_1_1_02.jpg
//! ├── si_20100809/
//! │   └── ...
//! └── si_20100802.zip                  # Package written next to its issue
//! ```
//!
//! Every subdirectory of the root is returned as a candidate issue. Assets are
//! only returned from directories whose path carries an `si_<8 digits>`
//! component; anything else yields an empty list, which the processor reports.
//!
//! All listings are sorted by filename. Positional numbering depends on it.

use crate::naming::AssetKind;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

static ISSUE_DIR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^si_\d{8}").expect("issue dir pattern must compile"));

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// List every subdirectory of `root`, one level deep, sorted by name.
pub fn list_issue_directories(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut dirs: Vec<PathBuf> = read_entries(root)?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(dirs)
}

/// List the assets of one kind inside an issue directory, sorted by filename.
///
/// Returns an empty list when `issue_dir` is not an issue directory.
pub fn list_assets(issue_dir: &Path, kind: AssetKind) -> Result<Vec<PathBuf>, ScanError> {
    if !is_issue_dir(issue_dir) {
        return Ok(Vec::new());
    }
    let mut assets: Vec<PathBuf> = read_entries(issue_dir)?
        .into_iter()
        .filter(|p| p.is_file() && AssetKind::from_path(p) == Some(kind))
        .collect();
    assets.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(assets)
}

/// Whether any component of `path` starts with `si_` followed by eight digits.
pub fn is_issue_dir(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|s| ISSUE_DIR_PATTERN.is_match(s))
    })
}

fn read_entries(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let read_err = |source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        entries.push(entry.map_err(read_err)?.path());
    }
    Ok(entries)
}
