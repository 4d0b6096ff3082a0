//! # FutureFolio Legacy Worker
//!
//! Renames legacy scanned-issue assets to the FutureFolio naming convention,
//! optionally renders JPG thumbnails from the PDF pages, and optionally
//! packages each issue into a zip archive for the folio viewer.
//!
//! # Pipeline
//!
//! Every issue directory under the root goes through the same steps:
//!
//! ```text
//! legacy/si_20100802/                 legacy/si_20100802/          legacy/
//!   si_20100802_1_1_01.pdf   rename     page-0.pdf       package     si_20100802.zip
//!   si_20100802_1_1_01.jpg   ───────►   page-0.jpg       ───────►
//!   ...                                 ...
//! ```
//!
//! Issues are processed one at a time. A failing issue is reported and
//! skipped; the run continues with the next directory.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | Ringier / SMD page-index resolution and `page-<n>.<ext>` names |
//! | [`scan`] | Issue directory and asset discovery |
//! | [`process`] | Per-issue plan → rename → thumbnail → package, and the run loop |
//! | [`imaging`] | Thumbnail backend trait and the ImageMagick backend |
//! | [`manifest`] | Fixed-schema `manifest.xml` rendering |
//! | [`package`] | Archive writer trait and zip packaging |
//! | [`config`] | `config.toml` loading and the immutable run configuration |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Plan Before Rename
//!
//! All target names of an issue are resolved before the first file moves. A
//! filename that does not fit the convention, two files claiming the same
//! page, or a target held by a file the plan does not move, fail the issue
//! with the directory untouched. Renames go through temporary names, so files
//! trading names within an issue never block each other. Later failures (a
//! thumbnail error, a missing background image) leave the renames in place.
//!
//! Packages are written to a temporary file next to the destination and
//! moved over it only once complete, so a failed package never replaces a
//! previous one.
//!
//! ## Sorted Listings
//!
//! Ringier files carry no page number, so their order *is* the numbering.
//! Listings are sorted by filename instead of trusting the platform's
//! directory order.
//!
//! ## Collaborators Behind Traits
//!
//! Rasterizing PDFs ([`imaging::ThumbnailBackend`]) and writing archives
//! ([`package::ArchiveWriter`]) are injected, so the processing logic is
//! tested with recording fakes.

pub mod config;
pub mod imaging;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod package;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
