use anyhow::{Context, Result};
use exif::{Exif, Field, In, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// All metadata tags decoded from one file, keyed by tag name.
///
/// Names carry their IFD group, e.g. `"EXIF DateTimeOriginal"` or
/// `"Image DateTime"`. Values are the stringified tag values.
pub type Tags = BTreeMap<String, String>;

/// A source of decoded metadata tags.
///
/// [`ExifReader`] is the real implementation; the walker only depends on this
/// trait so that tag data can be substituted without touching the disk.
pub trait TagSource {
    /// Decode every tag in the file at `path`.
    ///
    /// A file that is a recognized container but carries no metadata yields
    /// an empty map. Unrecognized or corrupt files return an error.
    fn read_tags(&self, path: &Path) -> Result<Tags>;
}

/// Reads tags with `kamadak-exif`.
///
/// Handles TIFF (and TIFF-based RAW such as CR2/NEF/ARW), JPEG, HEIF/HEIC,
/// PNG and WebP containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifReader;

impl TagSource for ExifReader {
    fn read_tags(&self, path: &Path) -> Result<Tags> {
        let file = File::open(path).context("Failed to open media file")?;
        let mut reader = BufReader::new(file);

        let exif = match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(container)) => {
                log::debug!("No EXIF data in {container} container: {}", path.display());
                return Ok(Tags::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut tags = Tags::new();
        for field in exif.fields() {
            tags.insert(tag_name(field), field_value(field, &exif));
        }

        log::debug!("Decoded {} tags from {}", tags.len(), path.display());
        Ok(tags)
    }
}

/// Whether a decode error means the decoder did not recognize the container.
///
/// These are expected for formats such as MP4/MOV and are reported as
/// warnings rather than errors.
pub fn is_unrecognized_format(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<exif::Error>(),
        Some(exif::Error::InvalidFormat(_))
    )
}

/// Name a field as `"<group> <TagName>"`.
fn tag_name(field: &Field) -> String {
    let group = match field.tag.context() {
        exif::Context::Tiff => match field.ifd_num {
            In::PRIMARY => "Image".to_string(),
            In::THUMBNAIL => "Thumbnail".to_string(),
            In(n) => format!("IFD{n}"),
        },
        exif::Context::Exif => "EXIF".to_string(),
        exif::Context::Gps => "GPS".to_string(),
        exif::Context::Interop => "Interoperability".to_string(),
        _ => "Unknown".to_string(),
    };
    format!("{group} {}", field.tag)
}

/// ASCII values are kept verbatim (dates stay `YYYY:MM:DD HH:MM:SS`);
/// everything else uses the decoder's display form.
fn field_value(field: &Field, exif: &Exif) -> String {
    match field.value {
        Value::Ascii(ref parts) => parts
            .iter()
            .map(|part| String::from_utf8_lossy(part).trim().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        _ => field.display_value().with_unit(exif).to_string(),
    }
}
