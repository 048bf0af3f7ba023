//! # photo-date-updater
//!
//! Set the filesystem creation date of photo and video files to the capture
//! date stored in their embedded metadata (macOS, via `SetFile`), and inspect
//! which metadata tags a file actually carries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use photo_date_updater::exif::ExifReader;
//! use photo_date_updater::pipeline::{process_directory, UpdateOptions};
//! use photo_date_updater::setfile::SetFile;
//! use std::path::Path;
//!
//! let options = UpdateOptions { dry_run: false, recursive: true };
//! let setter = SetFile::new("SetFile");
//!
//! if let Some(report) = process_directory(Path::new("./photos"), &options, &ExifReader, &setter) {
//!     println!(
//!         "updated {}, skipped {}, errors {}",
//!         report.tally.updated, report.tally.skipped, report.tally.errors
//!     );
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! ```rust,no_run
//! use photo_date_updater::exif::{read_capture_date, ExifReader};
//! use photo_date_updater::inspect::{inspect_file, render_summary};
//! use std::path::Path;
//!
//! let path = Path::new("IMG_0042.jpg");
//!
//! // Capture date by tag priority
//! if let Some(date) = read_capture_date(&ExifReader, path) {
//!     println!("Captured at {date}");
//! }
//!
//! // Every tag, grouped for display
//! if let Some(inspection) = inspect_file(&ExifReader, path) {
//!     print!("{}", render_summary(path, &inspection));
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Kind | Extensions |
//! |------|------------|
//! | JPEG | `.jpg`, `.jpeg` |
//! | TIFF | `.tif`, `.tiff` |
//! | PNG  | `.png` |
//! | HEIF | `.heic`, `.heif` |
//! | RAW  | `.cr2`, `.nef`, `.arw` |
//! | Video | `.mp4`, `.mov`, `.avi`, `.mkv` |
//!
//! ## Modules
//!
//! - [`config`] — Configuration types and loading/saving
//! - [`exif`] — Tag decoding and capture-date lookup
//! - [`inspect`] — Tag categorization and summaries
//! - [`pipeline`] — Format filter, directory walk, and the update pass
//! - [`setfile`] — Invoking `SetFile` to rewrite creation dates

pub mod config;
pub mod exif;
pub mod inspect;
pub mod pipeline;
pub mod setfile;

#[cfg(test)]
mod testlog;
