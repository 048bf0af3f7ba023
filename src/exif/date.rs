use chrono::NaiveDateTime;
use std::path::Path;

use super::reader::{is_unrecognized_format, TagSource, Tags};
use crate::pipeline::MediaKind;

/// Image date tags, most trustworthy first.
///
/// The two `SubSecTime*` entries normally hold bare sub-second counters and
/// only match if a writer stored a full timestamp there.
pub const IMAGE_DATE_TAGS: &[&str] = &[
    "EXIF DateTimeOriginal",
    "EXIF DateTime",
    "Image DateTime",
    "EXIF SubSecTimeOriginal",
    "EXIF SubSecTime",
];

/// Video date tags, checked before [`IMAGE_DATE_TAGS`] for video files.
pub const VIDEO_DATE_TAGS: &[&str] = &[
    "QuickTime CreateDate",
    "QuickTime DateTimeOriginal",
    "QuickTime DateTime",
    "QuickTime CreationDate",
];

/// EXIF date layout.
pub const IMAGE_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Layouts accepted for video dates, in order.
pub const VIDEO_DATE_FORMATS: &[&str] = &[
    "%Y:%m:%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Read the tags of `path` and pick its capture date.
///
/// Decode failures are logged as warnings and treated as "no date".
pub fn read_capture_date(source: &dyn TagSource, path: &Path) -> Option<NaiveDateTime> {
    match source.read_tags(path) {
        Ok(tags) => find_capture_date(path, &tags),
        Err(e) if is_unrecognized_format(&e) => {
            log::warn!("File format not recognized: {}", path.display());
            log::debug!("Full error: {e:#}");
            None
        }
        Err(e) => {
            log::warn!("Error reading metadata from {}: {e:#}", path.display());
            None
        }
    }
}

/// Pick the capture date from already decoded tags.
///
/// Video files try [`VIDEO_DATE_TAGS`] first with every layout in
/// [`VIDEO_DATE_FORMATS`]; then (or for images) [`IMAGE_DATE_TAGS`] are tried
/// with [`IMAGE_DATE_FORMAT`]. The first tag that parses wins. Tags that are
/// present but unparsable are logged and skipped.
pub fn find_capture_date(path: &Path, tags: &Tags) -> Option<NaiveDateTime> {
    let kind = MediaKind::from_path(path);

    if kind.is_some_and(MediaKind::is_video) {
        for tag in VIDEO_DATE_TAGS {
            let Some(value) = tags.get(*tag) else {
                continue;
            };
            match parse_video_date(value) {
                Some(date) => {
                    log::debug!("Using {tag} = {value} for {}", path.display());
                    return Some(date);
                }
                None => log::warn!(
                    "Could not parse video date '{value}' from {}",
                    path.display()
                ),
            }
        }
    }

    for tag in IMAGE_DATE_TAGS {
        let Some(value) = tags.get(*tag) else {
            continue;
        };
        match parse_image_date(value) {
            Some(date) => {
                log::debug!("Using {tag} = {value} for {}", path.display());
                return Some(date);
            }
            None => log::warn!("Could not parse date '{value}' from {}", path.display()),
        }
    }

    if kind == Some(MediaKind::Png) {
        log::warn!(
            "No EXIF date found in PNG file {} - PNG files typically don't contain EXIF metadata",
            path.display()
        );
    } else {
        log::warn!("No valid date metadata found in {}", path.display());
    }
    None
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` date.
pub fn parse_image_date(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), IMAGE_DATE_FORMAT).ok()
}

/// Parse a video date in any of [`VIDEO_DATE_FORMATS`].
pub fn parse_video_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    VIDEO_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}
