//! High-level thumbnail operations.
//!
//! These functions turn configuration into [`ThumbnailParams`] and hand them
//! to a backend.

use super::backend::{BackendError, ThumbnailBackend};
use super::params::{ColorProfiles, Quality, Sharpening, ThumbnailParams};
use std::path::{Path, PathBuf};

/// Result type for imaging operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailConfig {
    /// Bounding box edge; thumbnails fit inside `size x size`.
    pub size: u32,
    pub quality: Quality,
    pub sharpening: Option<Sharpening>,
    pub profiles: ColorProfiles,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size: 256,
            quality: Quality::default(),
            sharpening: Some(Sharpening::folio()),
            profiles: ColorProfiles::default(),
        }
    }
}

/// Where the thumbnail of a page lands: the same stem with a `.jpg` extension,
/// next to the source.
pub fn thumbnail_path(source: &Path) -> PathBuf {
    source.with_extension("jpg")
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(source: &Path, config: &ThumbnailConfig) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        output: thumbnail_path(source),
        max_width: config.size,
        max_height: config.size,
        quality: config.quality,
        sharpening: config.sharpening,
        profiles: config.profiles.clone(),
    }
}

/// Create the thumbnail for one page and return its path.
///
/// The written image is identified afterwards; a thumbnail that does not fit
/// the bounding box is an error.
pub fn create_thumbnail(
    backend: &impl ThumbnailBackend,
    source: &Path,
    config: &ThumbnailConfig,
) -> Result<PathBuf> {
    let params = plan_thumbnail(source, config);
    backend.thumbnail(&params)?;

    let dims = backend.identify(&params.output)?;
    if dims.width > params.max_width || dims.height > params.max_height {
        return Err(BackendError::ProcessingFailed(format!(
            "{} is {}x{}, larger than {}x{}",
            params.output.display(),
            dims.width,
            dims.height,
            params.max_width,
            params.max_height
        )));
    }
    Ok(params.output)
}
