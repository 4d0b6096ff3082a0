//! Folio packages: a zip archive per issue.
//!
//! ```text
//! legacy/
//! ├── si_20100802/
//! │   ├── page-0.pdf
//! │   ├── page-0.jpg
//! │   └── ...
//! └── si_20100802.zip
//!     ├── page-0.pdf
//!     ├── page-0.jpg
//!     ├── ...
//!     ├── folioIssueBackgroundPhoneLandscape.png
//!     ├── folioIssueBackgroundPhonePortrait.png
//!     ├── folioIssueBackgroundTabletLandscape.png
//!     ├── folioIssueBackgroundTabletPortrait.png
//!     └── manifest.xml
//! ```
//!
//! All entries sit at the archive root. Background images are copied from a
//! fixed assets directory. An existing archive is replaced only once the new
//! one is complete.
//!
//! Writing goes through the [`ArchiveWriter`] trait; [`ZipArchiveWriter`] is
//! the production implementation.

use crate::manifest::{MANIFEST_FILENAME, render_manifest};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Background images every package carries, in archive order.
pub const BACKGROUND_IMAGES: [&str; 4] = [
    "folioIssueBackgroundPhoneLandscape.png",
    "folioIssueBackgroundPhonePortrait.png",
    "folioIssueBackgroundTabletLandscape.png",
    "folioIssueBackgroundTabletPortrait.png",
];

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Zip error writing {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("Background image not found: {0}")]
    MissingBackground(PathBuf),
    #[error("Issue directory has no parent to hold its package: {0}")]
    NoParent(PathBuf),
}

/// Content of one archive entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntrySource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// One named entry at the archive root.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageEntry {
    pub name: String,
    pub source: EntrySource,
}

impl PackageEntry {
    /// Entry named after the file's own name.
    pub fn from_file(path: &Path) -> Self {
        Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            source: EntrySource::File(path.to_path_buf()),
        }
    }
}

/// Writes a complete archive at `dest`, replacing any existing file.
pub trait ArchiveWriter {
    fn write_archive(&self, dest: &Path, entries: &[PackageEntry]) -> Result<(), PackageError>;
}

/// Deflate-compressed zip archives.
#[derive(Debug, Default)]
pub struct ZipArchiveWriter;

impl ArchiveWriter for ZipArchiveWriter {
    /// The archive is assembled in a temporary file beside `dest` and renamed
    /// over it after `finish` succeeds. A failed write leaves `dest` as it was.
    fn write_archive(&self, dest: &Path, entries: &[PackageEntry]) -> Result<(), PackageError> {
        let io_err = |source: io::Error| PackageError::Io {
            path: dest.to_path_buf(),
            source,
        };
        let zip_err = |source: zip::result::ZipError| PackageError::Zip {
            path: dest.to_path_buf(),
            source,
        };

        let parent = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let staging = NamedTempFile::new_in(parent).map_err(io_err)?;
        let mut zip = ZipWriter::new(BufWriter::new(staging));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in entries {
            zip.start_file(entry.name.as_str(), options)
                .map_err(zip_err)?;
            match &entry.source {
                EntrySource::File(path) => {
                    let mut src = File::open(path).map_err(|source| PackageError::Io {
                        path: path.clone(),
                        source,
                    })?;
                    io::copy(&mut src, &mut zip).map_err(io_err)?;
                }
                EntrySource::Bytes(bytes) => {
                    io::Write::write_all(&mut zip, bytes).map_err(io_err)?;
                }
            }
        }

        let staging = zip
            .finish()
            .map_err(zip_err)?
            .into_inner()
            .map_err(|e| io_err(e.into_error()))?;
        staging.persist(dest).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

/// Archive path for an issue: `<parent>/<issue name>.zip`.
pub fn package_path(issue_dir: &Path) -> Result<PathBuf, PackageError> {
    let parent = issue_dir
        .parent()
        .ok_or_else(|| PackageError::NoParent(issue_dir.to_path_buf()))?;
    let name = issue_dir
        .file_name()
        .ok_or_else(|| PackageError::NoParent(issue_dir.to_path_buf()))?;
    let mut archive_name = name.to_os_string();
    archive_name.push(".zip");
    Ok(parent.join(archive_name))
}

/// Assemble the entry list: pages, backgrounds, then the manifest.
///
/// Fails before anything is written if a background image is missing.
pub fn plan_entries(
    pages: &[PathBuf],
    assets_dir: &Path,
    page_count: usize,
) -> Result<Vec<PackageEntry>, PackageError> {
    let mut entries: Vec<PackageEntry> = pages.iter().map(|p| PackageEntry::from_file(p)).collect();

    for name in BACKGROUND_IMAGES {
        let path = assets_dir.join(name);
        if !path.is_file() {
            return Err(PackageError::MissingBackground(path));
        }
        entries.push(PackageEntry::from_file(&path));
    }

    entries.push(PackageEntry {
        name: MANIFEST_FILENAME.to_string(),
        source: EntrySource::Bytes(render_manifest(page_count).into_bytes()),
    });
    Ok(entries)
}

/// Build the package for an issue and return the archive path.
pub fn build_package(
    writer: &impl ArchiveWriter,
    issue_dir: &Path,
    pages: &[PathBuf],
    assets_dir: &Path,
    page_count: usize,
) -> Result<PathBuf, PackageError> {
    let dest = package_path(issue_dir)?;
    let entries = plan_entries(pages, assets_dir, page_count)?;
    writer.write_archive(&dest, &entries)?;
    Ok(dest)
}
