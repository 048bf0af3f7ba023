use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::OutputConfig;
use crate::exif::{self, TagSource};
use crate::setfile::{format_setfile_date, CommandRunner, SetFile};

/// Supported image and video extensions (compared lower-cased).
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    // EXIF-bearing images
    "jpg", "jpeg", "tiff", "tif", "png",
    "heic", "heif",
    // RAW
    "cr2", "nef", "arw",
    // Video
    "mp4", "mov", "avi", "mkv",
];

/// Broad media family of a supported file, determined by its extension.
///
/// Only [`MediaKind::Video`] and [`MediaKind::Png`] change how capture dates
/// are looked up; the other variants exist for reporting.
///
/// # Example
///
/// ```rust
/// use photo_date_updater::pipeline::MediaKind;
/// use std::path::Path;
///
/// assert_eq!(MediaKind::from_path(Path::new("IMG_0001.MOV")), Some(MediaKind::Video));
/// assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Jpeg,
    Tiff,
    Png,
    Heif,
    Raw,
    Video,
}

impl MediaKind {
    /// Determine the media kind from a file path extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "tif" | "tiff" => Some(Self::Tiff),
            "png" => Some(Self::Png),
            "heic" | "heif" => Some(Self::Heif),
            "cr2" | "nef" | "arw" => Some(Self::Raw),
            "mp4" | "mov" | "avi" | "mkv" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn is_video(self) -> bool {
        self == Self::Video
    }
}

/// Check if a file has a supported extension. No I/O.
pub fn is_supported_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Fail unless `dir` exists and is a directory.
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.exists() {
        bail!("Directory does not exist: {}", dir.display());
    }
    if !dir.is_dir() {
        bail!("Path is not a directory: {}", dir.display());
    }
    Ok(())
}

/// Collect supported files under `dir`.
///
/// With `recursive` the whole tree is walked (following symlinks), otherwise
/// only the immediate children. Results are sorted by path within each
/// directory. Unreadable entries are logged and skipped.
pub fn collect_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        let p = entry.path();
        if p.is_file() && is_supported_format(p) {
            files.push(p.to_path_buf());
        }
    }

    files
}

/// Options for one updater run.
#[derive(Debug, Clone, Copy)]
pub struct UpdateOptions {
    /// Log intended changes without invoking the date-setting command.
    pub dry_run: bool,
    /// Walk subdirectories too.
    pub recursive: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            recursive: true,
        }
    }
}

impl UpdateOptions {
    /// Options from the `output` config section; `dry_run_flag` can only
    /// turn dry-run on.
    pub fn from_config(output: &OutputConfig, dry_run_flag: bool) -> Self {
        Self {
            dry_run: output.dry_run || dry_run_flag,
            recursive: output.recursive,
        }
    }
}

/// What happened to one file during an updater run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The creation date was set.
    Updated,
    /// Dry run: the creation date would have been set.
    WouldUpdate,
    /// No usable capture date was found.
    Skipped,
    /// The date-setting command failed.
    Failed,
}

/// Running counters for an updater run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub updated: u64,
    pub skipped: u64,
    pub errors: u64,
}

impl Tally {
    /// Count one outcome. Dry-run files count as updated.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Updated | Outcome::WouldUpdate => self.updated += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.errors += 1,
        }
    }
}

/// Per-file line of an [`UpdateReport`].
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub kind: Option<MediaKind>,
    pub capture_date: Option<NaiveDateTime>,
    pub outcome: Outcome,
}

/// Result of [`process_directory`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateReport {
    pub tally: Tally,
    pub files: Vec<FileReport>,
}

/// Set the creation date of every supported file under `dir` to its capture date.
///
/// Files are handled one at a time: read the capture date through `source`,
/// then either log the intended change (dry run) or invoke `setter`. A file
/// without a date is skipped; a failed invocation is counted as an error. No
/// per-file failure stops the walk.
///
/// Returns `None` (after logging) if `dir` is missing or not a directory.
///
/// # Example
///
/// ```rust,no_run
/// use photo_date_updater::exif::ExifReader;
/// use photo_date_updater::pipeline::{process_directory, UpdateOptions};
/// use photo_date_updater::setfile::SetFile;
/// use std::path::Path;
///
/// let options = UpdateOptions { dry_run: true, recursive: true };
/// let setter = SetFile::new("SetFile");
/// if let Some(report) = process_directory(Path::new("./photos"), &options, &ExifReader, &setter) {
///     println!("{} would be updated", report.tally.updated);
/// }
/// ```
pub fn process_directory<R: CommandRunner>(
    dir: &Path,
    options: &UpdateOptions,
    source: &dyn TagSource,
    setter: &SetFile<R>,
) -> Option<UpdateReport> {
    if let Err(e) = validate_directory(dir) {
        log::error!("{e}");
        return None;
    }

    let files = collect_files(dir, options.recursive);
    let mut report = UpdateReport::default();

    if files.is_empty() {
        log::info!("No supported image files found in {}", dir.display());
        return Some(report);
    }

    log::info!("Found {} image files to process", files.len());

    for path in files {
        log::info!("Processing: {}", path.display());
        let capture_date = exif::read_capture_date(source, &path);
        let outcome = process_file(&path, capture_date, options.dry_run, setter);

        report.tally.record(outcome);
        report.files.push(FileReport {
            kind: MediaKind::from_path(&path),
            path,
            capture_date,
            outcome,
        });
    }

    log::info!("Processing complete:");
    log::info!("  - Files updated: {}", report.tally.updated);
    log::info!("  - Files skipped: {}", report.tally.skipped);
    log::info!("  - Errors: {}", report.tally.errors);

    Some(report)
}

fn process_file<R: CommandRunner>(
    path: &Path,
    capture_date: Option<NaiveDateTime>,
    dry_run: bool,
    setter: &SetFile<R>,
) -> Outcome {
    let Some(date) = capture_date else {
        log::warn!("Skipping {} - no EXIF date found", path.display());
        return Outcome::Skipped;
    };

    if dry_run {
        log::info!(
            "[DRY RUN] Would update {} creation date to {}",
            path.display(),
            format_setfile_date(date)
        );
        return Outcome::WouldUpdate;
    }

    if setter.update_creation_date(path, date) {
        Outcome::Updated
    } else {
        Outcome::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::{tiff_with_dates, ExifReader, Tags};
    use crate::setfile::CommandOutput;
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    /// Hands out the same tags for every file and remembers which files were read.
    struct FixedTags {
        tags: Tags,
        seen: RefCell<Vec<PathBuf>>,
    }

    impl FixedTags {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                tags: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl TagSource for FixedTags {
        fn read_tags(&self, path: &Path) -> anyhow::Result<Tags> {
            self.seen.borrow_mut().push(path.to_path_buf());
            Ok(self.tags.clone())
        }
    }

    /// Records every invocation and answers with a fixed exit status.
    struct Recorder {
        success: bool,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl Recorder {
        fn new(success: bool) -> Self {
            Self {
                success,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for Recorder {
        fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
            let mut call = vec![program.to_string()];
            call.extend(args.iter().cloned());
            self.calls.borrow_mut().push(call);
            Ok(CommandOutput {
                success: self.success,
                stderr: if self.success { String::new() } else { "boom".to_string() },
            })
        }
    }

    const MAY_15: &[(&str, &str)] = &[("EXIF DateTimeOriginal", "2023:05:15 14:30:25")];

    // ── format filter ────────────────────────────────────────────────

    #[test]
    fn supported_extensions_any_case() {
        for ext in SUPPORTED_EXTENSIONS {
            let lower = format!("file.{ext}");
            let upper = format!("file.{}", ext.to_uppercase());
            assert!(is_supported_format(Path::new(&lower)), "{lower}");
            assert!(is_supported_format(Path::new(&upper)), "{upper}");
        }
        assert!(is_supported_format(Path::new("Photo.JpEg")));
    }

    #[test]
    fn unsupported_extensions() {
        for name in ["doc.pdf", "readme.txt", "image.webp", "noext", ".jpg", "archive.jpg.zip"] {
            assert!(!is_supported_format(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn media_kind_from_path() {
        assert_eq!(MediaKind::from_path(Path::new("a.JPG")), Some(MediaKind::Jpeg));
        assert_eq!(MediaKind::from_path(Path::new("a.tif")), Some(MediaKind::Tiff));
        assert_eq!(MediaKind::from_path(Path::new("a.png")), Some(MediaKind::Png));
        assert_eq!(MediaKind::from_path(Path::new("a.HEIF")), Some(MediaKind::Heif));
        assert_eq!(MediaKind::from_path(Path::new("a.nef")), Some(MediaKind::Raw));
        assert_eq!(MediaKind::from_path(Path::new("a.mkv")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path(Path::new("a.gif")), None);
        assert!(MediaKind::Video.is_video());
        assert!(!MediaKind::Raw.is_video());
    }

    // ── collect_files ────────────────────────────────────────────────

    #[test]
    fn collect_filters_unsupported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jpg"), b"fake").unwrap();
        fs::write(dir.path().join("b.png"), b"fake").unwrap();
        fs::write(dir.path().join("c.txt"), b"fake").unwrap();

        let files = collect_files(dir.path(), false);
        assert_eq!(files, vec![dir.path().join("a.jpg"), dir.path().join("b.png")]);
    }

    #[test]
    fn collect_respects_recursive_flag() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("2023");
        fs::create_dir(&sub).unwrap();
        fs::write(dir.path().join("top.jpg"), b"fake").unwrap();
        fs::write(sub.join("deep.mov"), b"fake").unwrap();

        assert_eq!(collect_files(dir.path(), false).len(), 1);
        assert_eq!(collect_files(dir.path(), true).len(), 2);
    }

    #[test]
    fn collect_skips_directories_named_like_media() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("album.jpg")).unwrap();
        assert!(collect_files(dir.path(), true).is_empty());
    }

    #[test]
    fn validate_rejects_missing_and_files() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.jpg");
        fs::write(&file, b"fake").unwrap();

        assert!(validate_directory(dir.path()).is_ok());
        assert!(validate_directory(&file).is_err());
        assert!(validate_directory(&dir.path().join("missing")).is_err());
    }

    // ── process_directory ────────────────────────────────────────────

    #[test]
    fn processes_only_supported_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jpg"), b"fake").unwrap();
        fs::write(dir.path().join("b.png"), b"fake").unwrap();
        fs::write(dir.path().join("c.txt"), b"fake").unwrap();

        let source = FixedTags::new(MAY_15);
        let setter = SetFile::with_runner("SetFile", Recorder::new(true));
        let report = process_directory(dir.path(), &UpdateOptions::default(), &source, &setter).unwrap();

        assert_eq!(source.seen.borrow().len(), 2);
        assert!(source.seen.borrow().iter().all(|p| p.extension().unwrap() != "txt"));
        assert_eq!(report.files.len(), 2);
    }

    #[test]
    fn dry_run_never_invokes_setter() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jpg"), b"fake").unwrap();

        let source = FixedTags::new(MAY_15);
        let setter = SetFile::with_runner("SetFile", Recorder::new(true));
        let options = UpdateOptions { dry_run: true, recursive: true };
        let report = process_directory(dir.path(), &options, &source, &setter).unwrap();

        assert!(setter.runner().calls.borrow().is_empty());
        assert_eq!(report.tally, Tally { updated: 1, skipped: 0, errors: 0 });
        assert_eq!(report.files[0].outcome, Outcome::WouldUpdate);
    }

    #[test]
    fn dry_run_flag_or_config_enables_dry_run() {
        let mut output = OutputConfig::default();
        assert!(!UpdateOptions::from_config(&output, false).dry_run);
        assert!(UpdateOptions::from_config(&output, true).dry_run);

        output.dry_run = true;
        output.recursive = false;
        let options = UpdateOptions::from_config(&output, false);
        assert!(options.dry_run);
        assert!(!options.recursive);
    }

    #[test]
    fn end_to_end_two_images() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpeg");
        fs::write(&a, b"fake").unwrap();
        fs::write(&b, b"fake").unwrap();

        let source = FixedTags::new(MAY_15);
        let setter = SetFile::with_runner("SetFile", Recorder::new(true));
        let report = process_directory(dir.path(), &UpdateOptions::default(), &source, &setter).unwrap();

        let calls = setter.runner().calls.borrow();
        assert_eq!(calls.len(), 2);
        for (call, path) in calls.iter().zip([&a, &b]) {
            assert_eq!(
                call,
                &vec![
                    "SetFile".to_string(),
                    "-d".to_string(),
                    "05/15/2023 14:30:25".to_string(),
                    path.to_string_lossy().into_owned(),
                ]
            );
        }
        assert_eq!(report.tally, Tally { updated: 2, skipped: 0, errors: 0 });
    }

    #[test]
    fn tallies_skips_and_failures() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jpg"), b"fake").unwrap();
        fs::write(dir.path().join("b.jpg"), b"fake").unwrap();

        let failing = SetFile::with_runner("SetFile", Recorder::new(false));
        let report =
            process_directory(dir.path(), &UpdateOptions::default(), &FixedTags::new(MAY_15), &failing)
                .unwrap();
        assert_eq!(report.tally, Tally { updated: 0, skipped: 0, errors: 2 });

        let setter = SetFile::with_runner("SetFile", Recorder::new(true));
        let report = process_directory(
            dir.path(),
            &UpdateOptions::default(),
            &FixedTags::new(&[("Image Make", "Canon")]),
            &setter,
        )
        .unwrap();
        assert_eq!(report.tally, Tally { updated: 0, skipped: 2, errors: 0 });
        assert!(setter.runner().calls.borrow().is_empty());
        assert!(report.files.iter().all(|f| f.capture_date.is_none()));
    }

    #[test]
    fn invalid_directory_returns_none() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.jpg");
        fs::write(&file, b"fake").unwrap();

        let setter = SetFile::with_runner("SetFile", Recorder::new(true));
        let source = FixedTags::new(MAY_15);
        assert!(process_directory(&dir.path().join("nope"), &UpdateOptions::default(), &source, &setter).is_none());
        assert!(process_directory(&file, &UpdateOptions::default(), &source, &setter).is_none());
        assert!(source.seen.borrow().is_empty());
    }

    #[test]
    fn empty_directory_yields_zero_tally() {
        let dir = TempDir::new().unwrap();
        let setter = SetFile::with_runner("SetFile", Recorder::new(true));
        let report =
            process_directory(dir.path(), &UpdateOptions::default(), &FixedTags::new(MAY_15), &setter)
                .unwrap();
        assert_eq!(report.tally, Tally::default());
        assert!(report.files.is_empty());
    }

    #[test]
    fn real_reader_with_unreadable_and_tagged_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("scan.tif"),
            tiff_with_dates("2023:05:15 14:30:25", "2020:01:01 00:00:00"),
        )
        .unwrap();
        fs::write(dir.path().join("broken.jpg"), b"not a jpeg").unwrap();

        let setter = SetFile::with_runner("SetFile", Recorder::new(true));
        let report =
            process_directory(dir.path(), &UpdateOptions::default(), &ExifReader, &setter).unwrap();

        assert_eq!(report.tally, Tally { updated: 1, skipped: 1, errors: 0 });
        let calls = setter.runner().calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][2], "05/15/2023 14:30:25");
    }
}
