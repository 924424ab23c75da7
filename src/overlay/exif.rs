//! Targeted EXIF orientation scan.
//!
//! Reads exactly one tag (0x0112, Orientation) from the first IFD of a JPEG
//! APP1/Exif segment. Not a general EXIF reader: anything malformed or
//! missing yields `None`, which callers treat as "no rotation needed".

const ORIENTATION_TAG: u16 = 0x0112;

/// Extract the EXIF orientation value (1..=8) from raw image bytes, if any
pub(crate) fn orientation_value(bytes: &[u8]) -> Option<u16> {
    let tiff = exif_payload(bytes)?;
    parse_tiff_orientation(tiff)
}

/// Walk JPEG segments until the APP1/Exif payload
fn exif_payload(bytes: &[u8]) -> Option<&[u8]> {
    // SOI marker
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];

        // Start-of-scan: no metadata past this point
        if marker == 0xDA {
            return None;
        }

        let len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        if len < 2 || pos + 2 + len > bytes.len() {
            return None;
        }
        let payload = &bytes[pos + 4..pos + 2 + len];

        if marker == 0xE1 && payload.len() > 6 && &payload[..6] == b"Exif\0\0" {
            return Some(&payload[6..]);
        }

        pos += 2 + len;
    }

    None
}

/// Parse the TIFF header and scan IFD0 for the orientation tag
fn parse_tiff_orientation(tiff: &[u8]) -> Option<u16> {
    if tiff.len() < 8 {
        return None;
    }

    let big_endian = match &tiff[..2] {
        b"MM" => true,
        b"II" => false,
        _ => return None,
    };

    let read_u16 = |data: &[u8], at: usize| -> Option<u16> {
        let raw: [u8; 2] = data.get(at..at + 2)?.try_into().ok()?;
        Some(if big_endian {
            u16::from_be_bytes(raw)
        } else {
            u16::from_le_bytes(raw)
        })
    };
    let read_u32 = |data: &[u8], at: usize| -> Option<u32> {
        let raw: [u8; 4] = data.get(at..at + 4)?.try_into().ok()?;
        Some(if big_endian {
            u32::from_be_bytes(raw)
        } else {
            u32::from_le_bytes(raw)
        })
    };

    if read_u16(tiff, 2)? != 42 {
        return None;
    }

    let ifd_offset = read_u32(tiff, 4)? as usize;
    let entry_count = read_u16(tiff, ifd_offset)? as usize;

    for i in 0..entry_count {
        let entry = ifd_offset + 2 + i * 12;
        if read_u16(tiff, entry)? == ORIENTATION_TAG {
            // SHORT value lives inline in the first two value bytes
            return read_u16(tiff, entry + 8);
        }
    }

    None
}

#[cfg(test)]
pub(crate) mod test_support {
    /// Build a minimal JPEG carrying only an Exif APP1 segment with the
    /// given orientation value
    pub(crate) fn jpeg_with_orientation(orientation: u16, big_endian: bool) -> Vec<u8> {
        let mut tiff = Vec::new();
        if big_endian {
            tiff.extend_from_slice(b"MM");
            tiff.extend_from_slice(&42u16.to_be_bytes());
            tiff.extend_from_slice(&8u32.to_be_bytes());
            tiff.extend_from_slice(&1u16.to_be_bytes());
            tiff.extend_from_slice(&super::ORIENTATION_TAG.to_be_bytes());
            tiff.extend_from_slice(&3u16.to_be_bytes()); // SHORT
            tiff.extend_from_slice(&1u32.to_be_bytes());
            tiff.extend_from_slice(&orientation.to_be_bytes());
            tiff.extend_from_slice(&[0, 0]);
        } else {
            tiff.extend_from_slice(b"II");
            tiff.extend_from_slice(&42u16.to_le_bytes());
            tiff.extend_from_slice(&8u32.to_le_bytes());
            tiff.extend_from_slice(&1u16.to_le_bytes());
            tiff.extend_from_slice(&super::ORIENTATION_TAG.to_le_bytes());
            tiff.extend_from_slice(&3u16.to_le_bytes());
            tiff.extend_from_slice(&1u32.to_le_bytes());
            tiff.extend_from_slice(&orientation.to_le_bytes());
            tiff.extend_from_slice(&[0, 0]);
        }

        let mut payload = Vec::from(&b"Exif\0\0"[..]);
        payload.extend_from_slice(&tiff);

        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
        jpeg.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        jpeg.extend_from_slice(&payload);
        jpeg
    }
}
