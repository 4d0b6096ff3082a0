//! ImageMagick backend: PDF rasterization via the `magick` CLI.
//!
//! ## Command mapping
//!
//! | Step | Argument |
//! |---|---|
//! | First page only | `<source>[0]` |
//! | Resize to fit | `-resize 256x256` |
//! | Strip metadata | `-strip` |
//! | Source profile | `-profile <cmyk.icc>` (when configured) |
//! | Colorspace | `-colorspace sRGB` |
//! | Target profile | `-profile <rgb.icc>` (when configured) |
//! | Sharpen | `-sharpen 0x0.8` |
//! | Quality | `-quality 100` |
//!
//! Identify uses `image::image_dimensions` on the generated JPEG, so no second
//! process is spawned.

use super::backend::{BackendError, Dimensions, ThumbnailBackend};
use super::params::ThumbnailParams;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Backend that invokes an ImageMagick binary.
pub struct MagickBackend {
    binary: PathBuf,
}

impl MagickBackend {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for MagickBackend {
    fn default() -> Self {
        Self::new("magick")
    }
}

/// Build the argument list for one thumbnail, without the binary itself.
pub fn thumbnail_args(params: &ThumbnailParams) -> Vec<OsString> {
    let mut source = params.source.clone().into_os_string();
    source.push("[0]");

    let mut args: Vec<OsString> = vec![
        source,
        "-resize".into(),
        format!("{}x{}", params.max_width, params.max_height).into(),
        "-strip".into(),
    ];
    if let Some(profile) = &params.profiles.source {
        args.push("-profile".into());
        args.push(profile.clone().into_os_string());
    }
    args.push("-colorspace".into());
    args.push("sRGB".into());
    if let Some(profile) = &params.profiles.target {
        args.push("-profile".into());
        args.push(profile.clone().into_os_string());
    }
    if let Some(sharpening) = params.sharpening {
        args.push("-sharpen".into());
        args.push(sharpening.to_geometry().into());
    }
    args.push("-quality".into());
    args.push(params.quality.value().to_string().into());
    args.push(params.output.clone().into_os_string());
    args
}

impl ThumbnailBackend for MagickBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to identify {}: {}", path.display(), e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let args = thumbnail_args(params);
        debug!(binary = %self.binary.display(), ?args, "running ImageMagick");

        let output = Command::new(&self.binary).args(&args).output()?;
        if !output.status.success() {
            return Err(BackendError::ProcessingFailed(format!(
                "{} exited with {} for {}: {}",
                self.binary.display(),
                output.status,
                params.source.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}
