//! Hand-assembled container fixtures for tests: a minimal TIFF with real
//! IFDs, a JPEG wrapping it in APP1, and a HEIC locating it through
//! meta/iinf/iloc.

/// Little-endian TIFF with ASCII entries in IFD0 and, when non-empty, an
/// Exif sub-IFD reached through tag 0x8769. Pass entries in ascending tag
/// order.
pub(crate) fn tiff_with(ifd0: &[(u16, &str)], exif_ifd: &[(u16, &str)]) -> Vec<u8> {
    const EXIF_IFD_POINTER: u16 = 0x8769;

    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());

    if exif_ifd.is_empty() {
        out.extend_from_slice(&ifd_bytes(ifd0, 8, None));
    } else {
        let ifd0_count = ifd0.len() + 1;
        let ifd0_len = 2 + 12 * ifd0_count + 4 + ascii_overflow_len(ifd0);
        let exif_offset = (8 + ifd0_len) as u32;
        out.extend_from_slice(&ifd_bytes(ifd0, 8, Some((EXIF_IFD_POINTER, exif_offset))));
        out.extend_from_slice(&ifd_bytes(exif_ifd, exif_offset, None));
    }
    out
}

/// Bytes of ASCII values too long for the 4-byte inline slot.
fn ascii_overflow_len(entries: &[(u16, &str)]) -> usize {
    entries
        .iter()
        .map(|(_, v)| {
            let n = v.len() + 1;
            if n > 4 {
                n
            } else {
                0
            }
        })
        .sum()
}

/// One IFD at the given absolute offset: entry table, optional sub-IFD
/// pointer entry, no next IFD, then the spilled ASCII values.
fn ifd_bytes(entries: &[(u16, &str)], ifd_offset: u32, pointer: Option<(u16, u32)>) -> Vec<u8> {
    let count = entries.len() + usize::from(pointer.is_some());
    let table_len = (2 + 12 * count + 4) as u32;

    let mut table: Vec<u8> = Vec::new();
    let mut data: Vec<u8> = Vec::new();

    table.extend_from_slice(&(count as u16).to_le_bytes());
    for (tag, value) in entries {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        table.extend_from_slice(&tag.to_le_bytes());
        table.extend_from_slice(&2u16.to_le_bytes()); // ASCII
        table.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        if bytes.len() <= 4 {
            bytes.resize(4, 0);
            table.extend_from_slice(&bytes);
        } else {
            let offset = ifd_offset + table_len + data.len() as u32;
            table.extend_from_slice(&offset.to_le_bytes());
            data.extend_from_slice(&bytes);
        }
    }
    if let Some((tag, target)) = pointer {
        table.extend_from_slice(&tag.to_le_bytes());
        table.extend_from_slice(&4u16.to_le_bytes()); // LONG
        table.extend_from_slice(&1u32.to_le_bytes());
        table.extend_from_slice(&target.to_le_bytes());
    }
    table.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
    table.extend_from_slice(&data);
    table
}

/// Minimal JPEG: SOI, one Exif APP1 around the given TIFF, EOI.
pub(crate) fn jpeg_bytes(tiff: &[u8]) -> Vec<u8> {
    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(tiff);

    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// JPEG with marker structure but no Exif segment (a JFIF APP0 instead).
pub(crate) fn jpeg_plain() -> Vec<u8> {
    let payload = b"JFIF\0";
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE0];
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// A good Exif APP1 followed by a segment whose declared length runs past
/// the end of the file.
pub(crate) fn jpeg_truncated_after_exif(tiff: &[u8]) -> Vec<u8> {
    let mut out = jpeg_bytes(tiff);
    out.truncate(out.len() - 2); // drop EOI
    out.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x40, 0x01]);
    out
}

/// Minimal HEIC: ftyp, meta with iinf (one Exif item) and iloc (one
/// absolute-offset extent), then the Exif item bytes.
pub(crate) fn heic_bytes(tiff: &[u8]) -> Vec<u8> {
    // ExifDataBlock: tiff header offset 6, past the Exif\0\0 marker
    let mut item = vec![0, 0, 0, 6];
    item.extend_from_slice(b"Exif\0\0");
    item.extend_from_slice(tiff);
    heic_container(b"Exif", &item)
}

/// Same structure, but the single item is not Exif.
pub(crate) fn heic_without_exif_item() -> Vec<u8> {
    heic_container(b"mime", b"")
}

/// Exif item whose declared TIFF offset is the caller's, however wrong.
pub(crate) fn heic_with_tiff_offset(offset: u32, tail: &[u8]) -> Vec<u8> {
    let mut item = offset.to_be_bytes().to_vec();
    item.extend_from_slice(tail);
    heic_container(b"Exif", &item)
}

fn heic_container(item_type: &[u8; 4], item: &[u8]) -> Vec<u8> {
    let mut ftyp_payload = b"heic".to_vec();
    ftyp_payload.extend_from_slice(&0u32.to_be_bytes());
    ftyp_payload.extend_from_slice(b"mif1");
    let ftyp = boxed(b"ftyp", &ftyp_payload);

    // infe version 2: item 1, unprotected, with an empty name
    let mut infe_payload = vec![2, 0, 0, 0];
    infe_payload.extend_from_slice(&1u16.to_be_bytes());
    infe_payload.extend_from_slice(&0u16.to_be_bytes());
    infe_payload.extend_from_slice(item_type);
    infe_payload.push(0);
    let infe = boxed(b"infe", &infe_payload);

    let mut iinf_payload = vec![0, 0, 0, 0];
    iinf_payload.extend_from_slice(&1u16.to_be_bytes());
    iinf_payload.extend_from_slice(&infe);
    let iinf = boxed(b"iinf", &iinf_payload);

    // One item with one 4-byte-offset extent: the iloc size is fixed, so
    // the absolute item offset is known before building it.
    let iloc_len = 8 + 4 + 2 + 2 + 2 + 2 + 2 + 4 + 4;
    let meta_len = 8 + 4 + iinf.len() + iloc_len;
    let item_offset = (ftyp.len() + meta_len) as u32;

    let mut iloc_payload = vec![0, 0, 0, 0];
    iloc_payload.extend_from_slice(&0x4400u16.to_be_bytes()); // offset/length size 4, no base
    iloc_payload.extend_from_slice(&1u16.to_be_bytes()); // item count
    iloc_payload.extend_from_slice(&1u16.to_be_bytes()); // item id
    iloc_payload.extend_from_slice(&0u16.to_be_bytes()); // data reference
    iloc_payload.extend_from_slice(&1u16.to_be_bytes()); // extent count
    iloc_payload.extend_from_slice(&item_offset.to_be_bytes());
    iloc_payload.extend_from_slice(&(item.len() as u32).to_be_bytes());
    let iloc = boxed(b"iloc", &iloc_payload);
    debug_assert_eq!(iloc.len(), iloc_len);

    let mut meta_payload = vec![0, 0, 0, 0];
    meta_payload.extend_from_slice(&iinf);
    meta_payload.extend_from_slice(&iloc);
    let meta = boxed(b"meta", &meta_payload);

    let mut out = ftyp;
    out.extend_from_slice(&meta);
    out.extend_from_slice(item);
    out
}

fn boxed(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut b = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    b.extend_from_slice(kind);
    b.extend_from_slice(payload);
    b
}
