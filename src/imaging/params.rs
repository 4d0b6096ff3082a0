//! Parameter types for thumbnail generation.
//!
//! These structs describe *what* to produce, not *how*. They are the interface
//! between [`operations`](super::operations), which decides where each
//! thumbnail goes, and the [`backend`](super::backend), which rasterizes.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG quality (1–100). Clamped on construction.
//! - [`Sharpening`]: `-sharpen <radius>x<sigma>` parameters.
//! - [`ColorProfiles`]: optional ICC profiles for the CMYK → sRGB conversion.
//! - [`ThumbnailParams`]: full specification for one thumbnail.

use std::path::PathBuf;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// Sharpening parameters, in ImageMagick's `radius x sigma` form.
///
/// A radius of 0 lets ImageMagick pick one from sigma.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub radius: f32,
    pub sigma: f32,
}

impl Sharpening {
    /// The folio thumbnail sharpening: `0x0.8`.
    pub fn folio() -> Self {
        Self {
            radius: 0.0,
            sigma: 0.8,
        }
    }

    /// Render as an ImageMagick geometry argument.
    pub fn to_geometry(self) -> String {
        format!("{}x{}", self.radius, self.sigma)
    }
}

/// ICC profiles applied around the colorspace conversion.
///
/// `source` is applied first (typically a CMYK profile so CMYK scans convert
/// correctly), then the image is converted to sRGB, then `target` is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorProfiles {
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
}

/// Parameters for a thumbnail operation (resize-to-fit, never crop).
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Bounding box; the page is scaled to fit inside it.
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
    pub sharpening: Option<Sharpening>,
    pub profiles: ColorProfiles,
}
