//! Read-only tag inspection.
//!
//! Buckets every decoded tag into one of four display categories so a human
//! can see which tags carry dates for a given file type. Nothing here writes
//! to disk.

use anyhow::{bail, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::exif::{is_unrecognized_format, TagSource, Tags};
use crate::pipeline::{collect_files, is_supported_format, validate_directory};

/// Substrings that put a tag in [`Category::Date`].
pub const DATE_KEYWORDS: &[&str] = &["date", "time", "create", "original"];
/// Substrings that put a tag in [`Category::Camera`].
pub const CAMERA_KEYWORDS: &[&str] = &["make", "model", "lens", "focal", "aperture", "iso", "exposure"];
/// Substrings that put a tag in [`Category::Video`].
pub const VIDEO_KEYWORDS: &[&str] = &["quicktime", "video", "audio", "codec", "bitrate", "frame"];

/// Maximum number of "other" tags shown in a text summary.
const OTHER_PREVIEW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Date,
    Camera,
    Video,
    Other,
}

/// Categorize a tag by case-insensitive substring match on its name.
///
/// Date beats camera beats video; anything unmatched is other.
pub fn categorize(tag: &str) -> Category {
    let name = tag.to_lowercase();

    if contains_any(&name, DATE_KEYWORDS) {
        Category::Date
    } else if contains_any(&name, CAMERA_KEYWORDS) {
        Category::Camera
    } else if contains_any(&name, VIDEO_KEYWORDS) {
        Category::Video
    } else {
        Category::Other
    }
}

fn contains_any(name: &str, words: &[&str]) -> bool {
    words.iter().any(|w| name.contains(*w))
}

/// Categorized tags of one file. Each list is sorted by tag name, then value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub date_tags: Vec<(String, String)>,
    pub camera_tags: Vec<(String, String)>,
    pub video_tags: Vec<(String, String)>,
    pub other_tags: Vec<(String, String)>,
    pub total_tags: usize,
}

impl Inspection {
    pub fn from_tags(tags: &Tags) -> Self {
        let mut inspection = Self {
            total_tags: tags.len(),
            ..Self::default()
        };

        for (tag, value) in tags {
            let bucket = match categorize(tag) {
                Category::Date => &mut inspection.date_tags,
                Category::Camera => &mut inspection.camera_tags,
                Category::Video => &mut inspection.video_tags,
                Category::Other => &mut inspection.other_tags,
            };
            bucket.push((tag.clone(), value.clone()));
        }

        for bucket in [
            &mut inspection.date_tags,
            &mut inspection.camera_tags,
            &mut inspection.video_tags,
            &mut inspection.other_tags,
        ] {
            bucket.sort();
        }

        inspection
    }
}

/// Decode and categorize the tags of one file.
///
/// Returns `None` (after logging) when the file has no tags or cannot be read.
pub fn inspect_file(source: &dyn TagSource, path: &Path) -> Option<Inspection> {
    log::debug!("Attempting to read metadata from: {}", path.display());

    let tags = match source.read_tags(path) {
        Ok(tags) => tags,
        Err(e) if is_unrecognized_format(&e) => {
            log::warn!("File format not recognized: {}", path.display());
            log::debug!("Full error: {e:#}");
            return None;
        }
        Err(e) => {
            log::error!("Error reading metadata from {}: {e:#}", path.display());
            return None;
        }
    };

    if tags.is_empty() {
        log::warn!("No metadata tags found in {}", path.display());
        return None;
    }

    Some(Inspection::from_tags(&tags))
}

/// Inspect every supported file in `dir`, handing each result to `report`.
///
/// Files that yield no inspection are logged by [`inspect_file`] and not
/// reported. Returns the number of supported files found, or `None` (after
/// logging) if `dir` is missing or not a directory.
pub fn inspect_directory(
    dir: &Path,
    recursive: bool,
    source: &dyn TagSource,
    mut report: impl FnMut(&Path, &Inspection),
) -> Option<usize> {
    if let Err(e) = validate_directory(dir) {
        log::error!("{e}");
        return None;
    }

    let files = collect_files(dir, recursive);
    if files.is_empty() {
        log::info!("No supported files found in {}", dir.display());
        return Some(0);
    }

    log::info!("Found {} supported files to inspect", files.len());

    for path in &files {
        if let Some(inspection) = inspect_file(source, path) {
            report(path, &inspection);
        }
    }

    Some(files.len())
}

/// Inspect `path`, which may be a single file or a directory.
///
/// A single file must have a supported extension. An `Err` (unsupported
/// file, nonexistent path) is what the inspector turns into exit status 1;
/// per-file decode problems are only logged.
pub fn run(
    path: &Path,
    recursive: bool,
    source: &dyn TagSource,
    mut report: impl FnMut(&Path, &Inspection),
) -> Result<()> {
    if path.is_file() {
        if !is_supported_format(path) {
            bail!("Unsupported file format: {}", path.display());
        }
        if let Some(inspection) = inspect_file(source, path) {
            report(path, &inspection);
        }
    } else if path.is_dir() {
        inspect_directory(path, recursive, source, report);
    } else {
        bail!("Path does not exist: {}", path.display());
    }
    Ok(())
}

/// Render the human-readable summary printed by the inspector.
pub fn render_summary(path: &Path, inspection: &Inspection) -> String {
    Summary { path, inspection }.to_string()
}

struct Summary<'a> {
    path: &'a Path,
    inspection: &'a Inspection,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(80);
        writeln!(f, "\n{rule}")?;
        writeln!(f, "METADATA INSPECTION: {}", self.path.display())?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Total tags found: {}", self.inspection.total_tags)?;

        write_section(f, "📅 DATE/TIME TAGS", &self.inspection.date_tags, None)?;
        write_section(f, "📷 CAMERA TAGS", &self.inspection.camera_tags, None)?;
        write_section(f, "🎥 VIDEO TAGS", &self.inspection.video_tags, None)?;
        write_section(f, "📋 OTHER TAGS", &self.inspection.other_tags, Some(OTHER_PREVIEW))
    }
}

fn write_section(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    tags: &[(String, String)],
    limit: Option<usize>,
) -> fmt::Result {
    if tags.is_empty() {
        return writeln!(f, "\n{title}: None found");
    }

    writeln!(f, "\n{title} ({}):", tags.len())?;
    writeln!(f, "{}", "-".repeat(40))?;

    let shown = limit.unwrap_or(tags.len()).min(tags.len());
    for (tag, value) in &tags[..shown] {
        writeln!(f, "  {tag}: {value}")?;
    }
    if shown < tags.len() {
        writeln!(f, "  ... and {} more tags", tags.len() - shown)?;
    }
    Ok(())
}
