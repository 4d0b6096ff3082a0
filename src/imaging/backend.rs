//! Thumbnail backend trait and shared types.
//!
//! The [`ThumbnailBackend`] trait defines the two operations the worker needs
//! from an imaging tool: identify an image and render a page thumbnail.
//!
//! The production implementation is
//! [`MagickBackend`](super::magick_backend::MagickBackend), which shells out
//! to ImageMagick for PDF rasterization. Tests use a recording mock.

use super::params::ThumbnailParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for thumbnail backends.
pub trait ThumbnailBackend {
    /// Get the pixel dimensions of a raster image.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Render the first page of `params.source` into a JPEG thumbnail.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}
