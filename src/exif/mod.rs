//! Metadata decoding and capture-date lookup.
//!
//! - [`TagSource`] / [`ExifReader`] — decode every tag in a file into [`Tags`]
//! - [`read_capture_date`] — pick the capture date using the fixed tag priority tables
//!
//! The priority tables ([`IMAGE_DATE_TAGS`], [`VIDEO_DATE_TAGS`]) are fixed
//! data, not configuration.

mod date;
mod reader;

pub use date::{
    find_capture_date, parse_image_date, parse_video_date, read_capture_date,
    IMAGE_DATE_FORMAT, IMAGE_DATE_TAGS, VIDEO_DATE_FORMATS, VIDEO_DATE_TAGS,
};
pub use reader::{is_unrecognized_format, ExifReader, TagSource, Tags};

#[cfg(test)]
pub(crate) use reader::tests::tiff_with_dates;
