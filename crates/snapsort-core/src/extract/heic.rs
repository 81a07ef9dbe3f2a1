//! HEIC metadata extraction.
//!
//! ISO-BMFF box walk: `meta` holds `iinf` (which item is the Exif blob)
//! and `iloc` (where its bytes live). The extent then feeds the same
//! flat-tag decode as JPEG.

use std::fs;
use std::path::Path;

use super::{decode_tags, ExtractError, TagDump, EXIF_HEADER};

pub fn extract(path: &Path) -> Result<TagDump, ExtractError> {
    let data = fs::read(path)?;
    let blob = exif_blob(&data)?;
    let tags = decode_tags(blob)?;
    // has_exif stays down here; the interpreter raises it when tags exist
    Ok(TagDump { tags, has_exif: false })
}

fn exif_blob(data: &[u8]) -> Result<Vec<u8>, ExtractError> {
    if data.is_empty() {
        return Err(ExtractError::NoStructure);
    }

    let meta = find_child(data, b"meta")?.ok_or(ExtractError::Malformed("missing meta box"))?;
    // meta is a full box: version and flags precede the children
    let meta = meta.get(4..).ok_or(ExtractError::Malformed("truncated meta box"))?;

    let iinf = find_child(meta, b"iinf")?.ok_or(ExtractError::Malformed("missing iinf box"))?;
    let item_id = exif_item_id(iinf)?.ok_or(ExtractError::NoExif)?;

    let iloc = find_child(meta, b"iloc")?.ok_or(ExtractError::Malformed("missing iloc box"))?;
    let (offset, length) = item_extent(iloc, item_id)?.ok_or(ExtractError::NoExif)?;

    let end = offset
        .checked_add(length)
        .filter(|&e| e <= data.len() as u64)
        .ok_or(ExtractError::Malformed("exif extent out of range"))?;
    let blob = &data[offset as usize..end as usize];

    // ExifDataBlock: u32 offset to the TIFF header within the payload
    if blob.len() < 4 {
        return Err(ExtractError::Malformed("exif item too short"));
    }
    let tiff_at = u32::from_be_bytes([blob[0], blob[1], blob[2], blob[3]]) as usize;
    // 4 + offset can exceed usize on 32-bit targets
    let payload = 4usize
        .checked_add(tiff_at)
        .and_then(|at| blob.get(at..))
        .ok_or(ExtractError::Malformed("exif item too short"))?;
    let payload = payload.strip_prefix(EXIF_HEADER).unwrap_or(payload);
    Ok(payload.to_vec())
}

struct BoxIter<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

/// Iterate the boxes laid out back to back in `data`.
fn walk_boxes(data: &[u8]) -> BoxIter<'_> {
    BoxIter { data, pos: 0, failed: false }
}

impl<'a> Iterator for BoxIter<'a> {
    type Item = Result<([u8; 4], &'a [u8]), ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }
        let rest = &self.data[self.pos..];
        if rest.len() < 8 {
            self.failed = true;
            return Some(Err(ExtractError::Malformed("truncated box header")));
        }
        let size32 = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as u64;
        let kind = [rest[4], rest[5], rest[6], rest[7]];
        let (header_len, size) = match size32 {
            // size 0: the box runs to the end of the enclosing space
            0 => (8u64, rest.len() as u64),
            1 => {
                if rest.len() < 16 {
                    self.failed = true;
                    return Some(Err(ExtractError::Malformed("truncated box header")));
                }
                let large = u64::from_be_bytes([
                    rest[8], rest[9], rest[10], rest[11], rest[12], rest[13], rest[14], rest[15],
                ]);
                (16, large)
            }
            n => (8, n),
        };
        if size < header_len || size > rest.len() as u64 {
            self.failed = true;
            return Some(Err(ExtractError::Malformed("box size out of range")));
        }
        let payload = &rest[header_len as usize..size as usize];
        self.pos += size as usize;
        Some(Ok((kind, payload)))
    }
}

/// Payload of the first direct child box of the given type.
fn find_child<'a>(data: &'a [u8], kind: &[u8; 4]) -> Result<Option<&'a [u8]>, ExtractError> {
    for item in walk_boxes(data) {
        let (k, payload) = item?;
        if &k == kind {
            return Ok(Some(payload));
        }
    }
    Ok(None)
}

/// Item id of the `Exif` entry in the item info box, if any.
fn exif_item_id(iinf: &[u8]) -> Result<Option<u32>, ExtractError> {
    if iinf.len() < 4 {
        return Err(ExtractError::Malformed("truncated iinf box"));
    }
    // entry_count is 16 bits in version 0, 32 bits after
    let entries_at = if iinf[0] == 0 { 6 } else { 8 };
    let entries = iinf
        .get(entries_at..)
        .ok_or(ExtractError::Malformed("truncated iinf box"))?;

    for item in walk_boxes(entries) {
        let (kind, payload) = item?;
        if &kind != b"infe" {
            continue;
        }
        if let Some(id) = exif_infe_id(payload)? {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

/// Item id if this `infe` describes the Exif item. Versions 0 and 1
/// predate item_type and can never match.
fn exif_infe_id(infe: &[u8]) -> Result<Option<u32>, ExtractError> {
    let version = *infe.first().ok_or(ExtractError::Malformed("truncated infe box"))?;
    match version {
        2 => {
            let id = u32::from(be16(infe, 4)?);
            Ok((slice4(infe, 8)? == *b"Exif").then_some(id))
        }
        3 => {
            let id = be32(infe, 4)?;
            Ok((slice4(infe, 10)? == *b"Exif").then_some(id))
        }
        _ => Ok(None),
    }
}

/// First extent (absolute offset, length) of the item in the location box.
fn item_extent(iloc: &[u8], item_id: u32) -> Result<Option<(u64, u64)>, ExtractError> {
    let version = *iloc.first().ok_or(ExtractError::Malformed("truncated iloc box"))?;
    if version > 2 {
        return Err(ExtractError::Malformed("unsupported iloc version"));
    }

    let sizes = be16(iloc, 4)?;
    let offset_size = (sizes >> 12 & 0xF) as usize;
    let length_size = (sizes >> 8 & 0xF) as usize;
    let base_offset_size = (sizes >> 4 & 0xF) as usize;
    let index_size = if version >= 1 { (sizes & 0xF) as usize } else { 0 };

    let (count, mut at) = if version < 2 {
        (u32::from(be16(iloc, 6)?), 8)
    } else {
        (be32(iloc, 6)?, 10)
    };

    for _ in 0..count {
        let id = if version < 2 {
            let v = u32::from(be16(iloc, at)?);
            at += 2;
            v
        } else {
            let v = be32(iloc, at)?;
            at += 4;
            v
        };
        let construction = if version >= 1 {
            let v = be16(iloc, at)? & 0xF;
            at += 2;
            v
        } else {
            0
        };
        at += 2; // data_reference_index
        let base = be_uint(iloc, at, base_offset_size)?;
        at += base_offset_size;
        let extent_count = be16(iloc, at)? as usize;
        at += 2;

        for e in 0..extent_count {
            at += index_size;
            let offset = be_uint(iloc, at, offset_size)?;
            at += offset_size;
            let length = be_uint(iloc, at, length_size)?;
            at += length_size;

            if e == 0 && id == item_id {
                if construction != 0 {
                    return Err(ExtractError::Malformed("unsupported iloc construction method"));
                }
                let abs = base
                    .checked_add(offset)
                    .ok_or(ExtractError::Malformed("exif extent out of range"))?;
                return Ok(Some((abs, length)));
            }
        }
    }
    Ok(None)
}

fn be16(data: &[u8], at: usize) -> Result<u16, ExtractError> {
    data.get(at..at + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or(ExtractError::Malformed("truncated box payload"))
}

fn be32(data: &[u8], at: usize) -> Result<u32, ExtractError> {
    data.get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(ExtractError::Malformed("truncated box payload"))
}

/// Big-endian unsigned integer of 0 to 8 bytes; 0 bytes reads as 0.
fn be_uint(data: &[u8], at: usize, len: usize) -> Result<u64, ExtractError> {
    if len > 8 {
        return Err(ExtractError::Malformed("integer field too wide"));
    }
    let bytes = data
        .get(at..at + len)
        .ok_or(ExtractError::Malformed("truncated box payload"))?;
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

fn slice4(data: &[u8], at: usize) -> Result<[u8; 4], ExtractError> {
    data.get(at..at + 4)
        .map(|b| [b[0], b[1], b[2], b[3]])
        .ok_or(ExtractError::Malformed("truncated box payload"))
}
