//! Page thumbnails: PDF rasterization behind a backend trait.
//!
//! | Operation | Tool |
//! |---|---|
//! | **Thumbnail** | ImageMagick `magick` (Ghostscript delegate for PDF) |
//! | **Identify** | `image::image_dimensions` |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing a thumbnail
//! - **Backend**: [`ThumbnailBackend`] trait + [`MagickBackend`]
//! - **Operations**: Functions that plan and run thumbnails

pub mod backend;
pub mod magick_backend;
pub mod operations;
mod params;

pub use backend::{BackendError, Dimensions, ThumbnailBackend};
pub use magick_backend::MagickBackend;
pub use operations::{ThumbnailConfig, create_thumbnail, plan_thumbnail, thumbnail_path};
pub use params::{ColorProfiles, Quality, Sharpening, ThumbnailParams};
