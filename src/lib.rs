//! # film-exif
//!
//! Batch-apply film photography metadata (camera make/model, lens, film stock)
//! to scanned JPEGs and their XMP sidecars, using `exiftool` as the writer.
//!
//! Each directory carries a `metadata.json`:
//!
//! ```json
//! {
//!   "cameraMake": "Nikon",
//!   "cameraModel": "FM2",
//!   "lensMake": "Nikon",
//!   "lensModel": "Nikkor 50mm f/1.8",
//!   "film": "Kodak Portra 400"
//! }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use film_exif::config::Config;
//! use film_exif::exif::{ExifTool, TagWriter};
//! use film_exif::pipeline::process_directories;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!
//!     // Fails up front if exiftool is not installed
//!     let writer: Arc<dyn TagWriter> = Arc::new(ExifTool::locate(&config.exiftool)?);
//!
//!     let dirs = vec![PathBuf::from("./roll-041"), PathBuf::from("./roll-042")];
//!     for report in process_directories(&dirs, writer, &config).await {
//!         println!("{}: {}", report.directory().display(), report.message());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Tags written
//!
//! | Target | Tags |
//! |--------|------|
//! | JPEG | `Make`, `Model`, `ImageDescription`, `XMP:Description`, `LensMake`\*, `LensModel`\* |
//! | XMP sidecar | `XMP:Make`, `XMP:Model`, `XMP:Description`, `XMP:LensMake`\*, `XMP:LensModel`\* |
//!
//! \* only when the lens field is non-empty.
//!
//! ## Modules
//!
//! - [`config`] — Configuration types and loading/saving
//! - [`error`] — Error kinds shared by the library
//! - [`exif`] — Tag requests and the exiftool writer
//! - [`metadata`] — `metadata.json` loading and validation
//! - [`pipeline`] — Enumeration, sidecar lookup, bounded-concurrency batch, directory runner

pub mod config;
pub mod error;
pub mod exif;
pub mod metadata;
pub mod pipeline;

pub use error::{Error, Result};
