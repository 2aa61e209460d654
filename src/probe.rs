//! Header probing.
//!
//! Reads format, dimensions, alpha, animation, and bit depth from the leading
//! bytes of a PNG or WebP file. Pure byte parsing: no pixel data is decoded
//! and nothing is allocated, so probing works on truncated input and with the
//! `webp` feature disabled.

use crate::error::CodecError;
use crate::format::ImageFormat;

/// Bytes needed for a full PNG probe: signature plus the IHDR chunk.
const PNG_PROBE_BYTES: usize = 33;
/// Bytes needed for a full WebP probe: RIFF header plus the first chunk header.
const WEBP_PROBE_BYTES: usize = 30;

/// Metadata read from an image header.
///
/// Every field except `format` is optional because a truncated header may
/// not contain it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ProbeResult {
    pub format: ImageFormat,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Whether the image carries alpha (an alpha channel or a tRNS chunk).
    pub has_alpha: Option<bool>,
    pub has_animation: Option<bool>,
    /// Frame count, when the header states it.
    pub frame_count: Option<u32>,
    /// Bits per sample as stored, before normalization to 8-bit.
    pub bit_depth: Option<u8>,
    /// How many input bytes the probe looked at.
    pub bytes_examined: usize,
}

impl ProbeResult {
    fn empty(format: ImageFormat) -> Self {
        Self {
            format,
            width: None,
            height: None,
            has_alpha: None,
            has_animation: None,
            frame_count: None,
            bit_depth: None,
            bytes_examined: 0,
        }
    }

    /// Both dimensions, when the header was long enough to hold them.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.width?, self.height?))
    }

    pub(crate) fn for_format(data: &[u8], format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => probe_png(data),
            ImageFormat::WebP => probe_webp(data),
        }
    }
}

/// Probe the leading bytes of an image.
///
/// Fails with `InvalidSignature` when the bytes are neither PNG nor WebP.
pub fn probe(data: &[u8]) -> Result<ProbeResult, CodecError> {
    let format = ImageFormat::detect(data).ok_or(CodecError::InvalidSignature)?;
    Ok(ProbeResult::for_format(data, format))
}

// PNG: 8-byte signature, then IHDR (4 len + 4 type + 13 data + 4 CRC).
// Ancillary chunks before the first IDAT may add tRNS (alpha) or acTL (APNG).

fn probe_png(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult::empty(ImageFormat::Png);
    result.bytes_examined = data.len().min(PNG_PROBE_BYTES);

    if data.len() < PNG_PROBE_BYTES || &data[12..16] != b"IHDR" {
        return result;
    }

    let bit_depth = data[24];
    let color_type = data[25];
    result.width = Some(be_u32(&data[16..20]));
    result.height = Some(be_u32(&data[20..24]));
    result.bit_depth = Some(bit_depth);
    // Color type 4 = gray+alpha, 6 = RGBA.
    result.has_alpha = Some(color_type == 4 || color_type == 6);

    // Walk chunk headers up to the image data. Stops quietly on truncation.
    let mut pos = PNG_PROBE_BYTES;
    while let Some(header) = pos.checked_add(8).and_then(|end| data.get(pos..end)) {
        let len = be_u32(&header[..4]) as usize;
        let kind = &header[4..8];
        match kind {
            b"IDAT" | b"IEND" => {
                result.has_animation.get_or_insert(false);
                result.frame_count.get_or_insert(1);
                break;
            }
            b"tRNS" => result.has_alpha = Some(true),
            b"acTL" => {
                if let Some(body) = data.get(pos + 8..pos + 12) {
                    let frames = be_u32(body);
                    result.frame_count = Some(frames);
                    result.has_animation = Some(frames > 1);
                }
            }
            _ => {}
        }
        pos = match pos.checked_add(len).and_then(|p| p.checked_add(12)) {
            Some(next) => next,
            None => break,
        };
        result.bytes_examined = pos.min(data.len());
    }

    result
}

// WebP: RIFF header (12 bytes) then the first chunk at offset 12.
// - VP8X (extended): flags at byte 20, canvas size at 24..30 (24-bit LE, +1)
// - VP8  (lossy): keyframe start code at 23..26, 14-bit sizes at 26..30
// - VP8L (lossless): signature 0x2F at byte 20, sizes bit-packed in 21..25

fn probe_webp(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult::empty(ImageFormat::WebP);
    result.bytes_examined = data.len().min(WEBP_PROBE_BYTES);

    let Some(chunk) = data.get(12..16) else {
        return result;
    };

    match chunk {
        b"VP8X" if data.len() >= 30 => {
            let flags = data[20];
            result.width = Some(le_u24(&data[24..27]) + 1);
            result.height = Some(le_u24(&data[27..30]) + 1);
            result.has_alpha = Some(flags & 0x10 != 0);
            result.has_animation = Some(flags & 0x02 != 0);
            if flags & 0x02 == 0 {
                result.frame_count = Some(1);
            }
            result.bit_depth = Some(8);
        }
        b"VP8 " if data.len() >= 30 && data[23..26] == [0x9D, 0x01, 0x2A] => {
            let width = u16::from_le_bytes([data[26], data[27]]) & 0x3FFF;
            let height = u16::from_le_bytes([data[28], data[29]]) & 0x3FFF;
            result.width = Some(u32::from(width));
            result.height = Some(u32::from(height));
            result.has_alpha = Some(false);
            result.has_animation = Some(false);
            result.frame_count = Some(1);
            result.bit_depth = Some(8);
        }
        b"VP8L" if data.len() >= 25 && data[20] == 0x2F => {
            let bits = u32::from_le_bytes([data[21], data[22], data[23], data[24]]);
            result.width = Some((bits & 0x3FFF) + 1);
            result.height = Some(((bits >> 14) & 0x3FFF) + 1);
            // Bit 28 is the alpha_is_used hint.
            result.has_alpha = Some(bits & (1 << 28) != 0);
            result.has_animation = Some(false);
            result.frame_count = Some(1);
            result.bit_depth = Some(8);
        }
        _ => {}
    }

    result
}

fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

fn le_u24(b: &[u8]) -> u32 {
    u32::from(b[0]) | u32::from(b[1]) << 8 | u32::from(b[2]) << 16
}
