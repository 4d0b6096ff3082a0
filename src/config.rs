//! Worker configuration.
//!
//! Two layers feed a run:
//!
//! - **`config.toml`**: tool settings that rarely change between runs
//!   (thumbnail rendering, where the package backgrounds live). Loaded from
//!   `--config`, else from `<dir>/config.toml`, else stock defaults.
//! - **Command line**: what to do on this run (`--dir`, convention,
//!   `--thumbnails`, `--package`, `--dry-run`).
//!
//! Both are folded into an immutable [`RunConfig`] that every stage receives
//! by reference.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [thumbnails]
//! size = 256                # Bounding box edge in pixels
//! quality = 100             # JPEG quality (1-100)
//! sharpen_sigma = 0.8       # -sharpen 0x<sigma>; 0 disables sharpening
//! magick_binary = "magick"  # ImageMagick executable
//! # source_profile = "profiles/USWebCoatedSWOP.icc"
//! # target_profile = "profiles/sRGB.icc"
//!
//! [package]
//! assets_dir = "assets"     # Directory holding the four background PNGs
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{ColorProfiles, Quality, Sharpening, ThumbnailConfig};
use crate::naming::NamingConvention;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up inside `--dir` when no `--config` is given.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerConfig {
    /// PDF thumbnail rendering.
    pub thumbnails: ThumbnailsConfig,
    /// Package assembly.
    pub package: PackageConfig,
}

impl WorkerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnails.size == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.size must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.thumbnails.sharpen_sigma < 0.0 {
            return Err(ConfigError::Validation(
                "thumbnails.sharpen_sigma must not be negative".into(),
            ));
        }
        if self.thumbnails.magick_binary.trim().is_empty() {
            return Err(ConfigError::Validation(
                "thumbnails.magick_binary must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Thumbnail rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Bounding box edge; pages are scaled to fit `size x size`.
    pub size: u32,
    /// JPEG quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Sharpening sigma with radius 0. `0` disables sharpening.
    pub sharpen_sigma: f32,
    /// ImageMagick executable name or path.
    pub magick_binary: String,
    /// ICC profile applied before converting to sRGB (usually CMYK).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_profile: Option<PathBuf>,
    /// ICC profile applied after converting to sRGB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_profile: Option<PathBuf>,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            size: 256,
            quality: 100,
            sharpen_sigma: 0.8,
            magick_binary: "magick".to_string(),
            source_profile: None,
            target_profile: None,
        }
    }
}

impl ThumbnailsConfig {
    /// Convert to the imaging module's thumbnail configuration.
    pub fn to_thumbnail_config(&self) -> ThumbnailConfig {
        let sharpening = (self.sharpen_sigma > 0.0).then_some(Sharpening {
            radius: 0.0,
            sigma: self.sharpen_sigma,
        });
        ThumbnailConfig {
            size: self.size,
            quality: Quality::new(self.quality),
            sharpening,
            profiles: ColorProfiles {
                source: self.source_profile.clone(),
                target: self.target_profile.clone(),
            },
        }
    }
}

/// Package assembly settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    /// Directory holding the four `folioIssueBackground*.png` images.
    pub assets_dir: PathBuf,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(WorkerConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

fn read_toml(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Load the worker config.
///
/// An explicit path must exist. Without one, `<root>/config.toml` is used if
/// present; otherwise stock defaults apply.
pub fn load_config(explicit: Option<&Path>, root: &Path) -> Result<WorkerConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => Some(read_toml(path)?),
        None => {
            let candidate = root.join(CONFIG_FILENAME);
            if candidate.is_file() {
                Some(read_toml(&candidate)?)
            } else {
                None
            }
        }
    };

    let merged = match overlay {
        Some(ov) => merge_toml(stock_defaults_value()?, ov),
        None => stock_defaults_value()?,
    };
    let config: WorkerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# FutureFolio Legacy Worker Configuration
# =======================================
# All settings are optional. Values shown below are the defaults.
# Place this file at <dir>/config.toml or pass --config <path>.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# PDF thumbnails (--thumbnails)
# ---------------------------------------------------------------------------
[thumbnails]
# Pages are scaled to fit inside a size x size box.
size = 256

# JPEG quality (1 = worst, 100 = best).
quality = 100

# Sharpening sigma (radius is always 0). Set to 0 to disable.
sharpen_sigma = 0.8

# ImageMagick executable. Needs Ghostscript to read PDFs.
magick_binary = "magick"

# ICC profile applied before converting to sRGB (for CMYK scans).
# source_profile = "profiles/USWebCoatedSWOP.icc"

# ICC profile applied after converting to sRGB.
# target_profile = "profiles/sRGB.icc"

# ---------------------------------------------------------------------------
# Packages (--package)
# ---------------------------------------------------------------------------
[package]
# Directory holding folioIssueBackground{Phone,Tablet}{Landscape,Portrait}.png
assets_dir = "assets"
"##
}

/// Everything one run needs, resolved from the command line and config file.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Root directory holding the issue directories.
    pub root: PathBuf,
    pub convention: NamingConvention,
    /// Render `page-<n>.jpg` from each PDF instead of renaming source JPGs.
    pub thumbnails: bool,
    /// Write `<issue>.zip` next to each issue.
    pub package: bool,
    /// Plan renames and report them without touching the filesystem.
    pub dry_run: bool,
    pub thumbnail: ThumbnailConfig,
    pub assets_dir: PathBuf,
}

impl RunConfig {
    /// Run configuration with stock settings; flags all off.
    pub fn new(root: impl Into<PathBuf>, convention: NamingConvention) -> Self {
        Self::from_worker_config(root, convention, &WorkerConfig::default())
    }

    pub fn from_worker_config(
        root: impl Into<PathBuf>,
        convention: NamingConvention,
        worker: &WorkerConfig,
    ) -> Self {
        Self {
            root: root.into(),
            convention,
            thumbnails: false,
            package: false,
            dry_run: false,
            thumbnail: worker.thumbnails.to_thumbnail_config(),
            assets_dir: worker.package.assets_dir.clone(),
        }
    }
}
