//! Page-number resolution for the FutureFolio `page-<n>.<ext>` convention.
//!
//! Legacy issues arrive in one of two source conventions:
//!
//! - **Ringier**: filenames carry no page information. Pages are numbered by
//!   their position in the (sorted) directory listing.
//! - **SMD**: filenames embed a one-based page number as the last numeric
//!   field: `si_20100802_1_1_07.pdf` is page 7, which becomes `page-6.pdf`.
//!
//! Both conventions produce the same target shape: `page-<n>.pdf` or
//! `page-<n>.jpg`, zero-based, extension lower-cased.
//!
//! ```text
//! Ringier   a.pdf, b.pdf, c.pdf               → page-0.pdf, page-1.pdf, page-2.pdf
//! SMD       si_20100802_1_1_01.pdf            → page-0.pdf
//!           si_20100802_1_1_120.JPG           → page-119.jpg
//! ```

use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// SMD filename pattern. Earlier revisions accepted 1–2 digit page numbers;
/// 1–3 digits is the superset.
static SMD_PAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^si_\d{8}_\d_\d_(\d{1,3})\.(?i:pdf|jpg)$").expect("SMD pattern must compile")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("page-number pattern mismatch: {filename}")]
    PatternMismatch { filename: String },
    #[error("page number 0 has no zero-based equivalent: {filename}")]
    ZeroPageNumber { filename: String },
    #[error("page position {position} is out of range: {filename}")]
    PositionOutOfRange { filename: String, position: usize },
}

/// Source naming convention of a legacy issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
    /// Positional: page index is the encounter order.
    Ringier,
    /// Embedded: page index is parsed from the filename suffix.
    Smd,
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingConvention::Ringier => write!(f, "Ringier"),
            NamingConvention::Smd => write!(f, "SMD"),
        }
    }
}

/// The two asset classes an issue directory holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Pdf,
    Jpg,
}

impl AssetKind {
    /// Lower-case extension used in target filenames.
    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Pdf => "pdf",
            AssetKind::Jpg => "jpg",
        }
    }

    /// Classify a path by its extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<AssetKind> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("pdf") {
            Some(AssetKind::Pdf)
        } else if ext.eq_ignore_ascii_case("jpg") {
            Some(AssetKind::Jpg)
        } else {
            None
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Pdf => write!(f, "PDF"),
            AssetKind::Jpg => write!(f, "JPG"),
        }
    }
}

/// Resolve the zero-based page index for one asset.
///
/// `encounter_index` is the asset's position in the sorted listing of its
/// kind; only the Ringier convention uses it.
pub fn resolve_page_index(
    convention: NamingConvention,
    original_filename: &str,
    encounter_index: usize,
) -> Result<u32, NamingError> {
    match convention {
        NamingConvention::Ringier => {
            u32::try_from(encounter_index).map_err(|_| NamingError::PositionOutOfRange {
                filename: original_filename.to_string(),
                position: encounter_index,
            })
        }
        NamingConvention::Smd => parse_smd_page_number(original_filename),
    }
}

fn parse_smd_page_number(filename: &str) -> Result<u32, NamingError> {
    let captured = SMD_PAGE_PATTERN
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .ok_or_else(|| NamingError::PatternMismatch {
            filename: filename.to_string(),
        })?;

    captured
        .checked_sub(1)
        .ok_or_else(|| NamingError::ZeroPageNumber {
            filename: filename.to_string(),
        })
}

/// Target filename for a page: `page-<n>.pdf` or `page-<n>.jpg`.
pub fn target_filename(page_index: u32, kind: AssetKind) -> String {
    format!("page-{}.{}", page_index, kind.extension())
}
