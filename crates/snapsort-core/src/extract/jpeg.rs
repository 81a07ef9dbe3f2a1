//! JPEG metadata extraction.
//!
//! The segment scan is lenient: everything collected before a failure is
//! kept, so a truncated file still yields its tags when the Exif segment
//! was seen in time.

use std::fs;
use std::path::Path;

use super::{decode_tags, ExtractError, TagDump, EXIF_HEADER};

const MARKER_SOI: u8 = 0xD8;
const MARKER_EOI: u8 = 0xD9;
const MARKER_SOS: u8 = 0xDA;
const MARKER_APP1: u8 = 0xE1;
const MARKER_TEM: u8 = 0x01;

struct Segment {
    marker: u8,
    payload: Vec<u8>,
}

struct Scan {
    segments: Vec<Segment>,
    error: Option<ExtractError>,
}

pub fn extract(path: &Path) -> Result<TagDump, ExtractError> {
    let data = fs::read(path)?;
    let Scan { segments, error: scan_error } = scan_segments(&data);

    if segments.is_empty() {
        return Err(scan_error.unwrap_or(ExtractError::NoStructure));
    }

    // Marker structure was present, whether or not tags turn up.
    let mut dump = TagDump { tags: Vec::new(), has_exif: true };

    if let Some(payload) = exif_payload(&segments) {
        match decode_tags(payload.to_vec()) {
            Ok(tags) => {
                if let Some(err) = &scan_error {
                    log::debug!("{}: scan stopped early ({err}), tags recovered", path.display());
                }
                dump.tags = tags;
            }
            // Scan errors take precedence over decode errors.
            Err(decode_err) => {
                return Err(scan_error.unwrap_or(ExtractError::TagDecode(decode_err)))
            }
        }
    } else if let Some(err) = scan_error {
        return Err(err);
    }

    Ok(dump)
}

/// Walk the marker stream, collecting segments until SOS, EOI, or failure.
/// SOI itself is not a segment; a clean scan of a bare SOI/EOI pair comes
/// back empty with no error.
fn scan_segments(data: &[u8]) -> Scan {
    let mut segments = Vec::new();

    if data.len() < 2 || data[0] != 0xFF || data[1] != MARKER_SOI {
        return Scan {
            segments,
            error: Some(ExtractError::Malformed("missing SOI marker")),
        };
    }

    let mut pos = 2;
    let error = loop {
        if pos >= data.len() {
            break Some(ExtractError::Malformed("truncated stream"));
        }
        if data[pos] != 0xFF {
            break Some(ExtractError::Malformed("expected marker byte"));
        }
        // Any number of 0xFF fill bytes may pad before the marker id.
        while pos < data.len() && data[pos] == 0xFF {
            pos += 1;
        }
        if pos >= data.len() {
            break Some(ExtractError::Malformed("truncated stream"));
        }
        let marker = data[pos];
        pos += 1;

        match marker {
            MARKER_EOI => break None,
            // Standalone markers carry no length field.
            MARKER_TEM | 0xD0..=0xD7 => {
                segments.push(Segment { marker, payload: Vec::new() });
                continue;
            }
            _ => {}
        }

        if pos + 2 > data.len() {
            break Some(ExtractError::Malformed("truncated segment"));
        }
        let len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        if len < 2 {
            break Some(ExtractError::Malformed("segment length below header size"));
        }
        let end = pos + len;
        if end > data.len() {
            break Some(ExtractError::Malformed("truncated segment"));
        }
        segments.push(Segment {
            marker,
            payload: data[pos + 2..end].to_vec(),
        });
        pos = end;

        if marker == MARKER_SOS {
            // Entropy-coded data follows; nothing beyond it matters here.
            break None;
        }
    };

    Scan { segments, error }
}

/// TIFF payload of the first APP1 segment with an Exif header. XMP also
/// rides in APP1, hence the header check.
fn exif_payload(segments: &[Segment]) -> Option<&[u8]> {
    segments.iter().find_map(|seg| {
        if seg.marker != MARKER_APP1 {
            return None;
        }
        seg.payload.strip_prefix(EXIF_HEADER)
    })
}
