//! Format dispatch and the extractor contract.
//!
//! An extractor reads one container file and hands back its EXIF tags as a
//! flat list of (name, value) strings, nested IFDs included. `Err` means
//! nothing was recovered; the caller then treats the file as metadata-free.

use std::path::Path;

use thiserror::Error;

pub mod heic;
pub mod jpeg;

pub(crate) const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// One decoded tag. ASCII values are passed through verbatim; everything
/// else uses the decoder's display form.
#[derive(Debug, Clone)]
pub struct RawTag {
    pub name: String,
    pub value: String,
}

/// Flat result of one extraction.
#[derive(Debug, Default)]
pub struct TagDump {
    pub tags: Vec<RawTag>,
    /// JPEG sets this when the container held at least one marker segment,
    /// tags or not. HEIC leaves it false; the interpreter raises it when
    /// tags are present.
    pub has_exif: bool,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse even partially")]
    NoStructure,
    #[error("{0}")]
    Malformed(&'static str),
    #[error("no Exif data in container")]
    NoExif,
    #[error("tag decode: {0}")]
    TagDecode(#[from] exif::Error),
}

/// Container formats with a dedicated extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Jpeg,
    Heic,
}

/// Map a lowercase file type to its extractor, if any.
pub fn detect(file_type: &str) -> Option<ContainerFormat> {
    match file_type {
        "jpeg" | "jpg" | "jpe" => Some(ContainerFormat::Jpeg),
        "heic" => Some(ContainerFormat::Heic),
        _ => None,
    }
}

/// File types that are never moved and never opened.
const SKIP_TYPES: &[&str] = &["exe", "bat", "ini", "dropbox", "app"];

pub fn is_skipped(file_type: &str) -> bool {
    SKIP_TYPES.iter().any(|t| t.eq_ignore_ascii_case(file_type))
}

pub fn extract_tags(format: ContainerFormat, path: &Path) -> Result<TagDump, ExtractError> {
    match format {
        ContainerFormat::Jpeg => jpeg::extract(path),
        ContainerFormat::Heic => heic::extract(path),
    }
}

/// Decode a raw TIFF payload into the flat tag list.
pub(crate) fn decode_tags(payload: Vec<u8>) -> Result<Vec<RawTag>, exif::Error> {
    let exif = exif::Reader::new().read_raw(payload)?;
    Ok(exif
        .fields()
        .map(|field| RawTag {
            name: field.tag.to_string(),
            value: formatted_value(field),
        })
        .collect())
}

/// First ASCII component verbatim; `display_value()` would quote it.
fn formatted_value(field: &exif::Field) -> String {
    match &field.value {
        exif::Value::Ascii(components) if !components.is_empty() => {
            String::from_utf8_lossy(&components[0]).into_owned()
        }
        _ => field.display_value().to_string(),
    }
}
