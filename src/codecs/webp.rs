//! WebP adapter over `image-webp`.
//!
//! Lossy, lossless, and extended still images decode to RGBA8. Animated files
//! are rejected.

use std::io::{self, Cursor};

use image_webp::{DecodingError, WebPDecoder};

use super::{DecodedFrame, Layout, Stage, to_rgba8};
use crate::pixel::try_alloc_zeroed;
use crate::{CodecError, ImageFormat, Limits};

pub(crate) fn decode_error(stage: Stage, err: DecodingError) -> CodecError {
    match err {
        DecodingError::IoError(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            CodecError::ReadingPastEnd(ImageFormat::WebP)
        }
        other if stage == Stage::Header => CodecError::invalid_format(format!("webp: {other}")),
        other => CodecError::failed(ImageFormat::WebP, other.to_string()),
    }
}

/// Decode a still WebP image to straight-alpha RGBA8.
pub(crate) fn decode(data: &[u8], limits: &Limits) -> Result<DecodedFrame, CodecError> {
    let mut decoder =
        WebPDecoder::new(Cursor::new(data)).map_err(|e| decode_error(Stage::Header, e))?;

    if decoder.is_animated() {
        return Err(CodecError::invalid_format(
            "animated WebP is not supported",
        ));
    }

    let (width, height) = decoder.dimensions();
    let has_alpha = decoder.has_alpha();
    tracing::debug!(width, height, has_alpha, "webp header");
    limits.validate(width, height)?;

    let buffer_size = decoder
        .output_buffer_size()
        .ok_or_else(|| CodecError::no_memory("webp output buffer size overflows usize"))?;
    let mut raw = try_alloc_zeroed(buffer_size)?;
    decoder
        .read_image(&mut raw)
        .map_err(|e| decode_error(Stage::Data, e))?;

    let layout = if has_alpha { Layout::Rgba } else { Layout::Rgb };
    let rgba = to_rgba8(ImageFormat::WebP, raw, layout, width, height)?;
    Ok(DecodedFrame {
        width,
        height,
        rgba,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    fn lossless(width: u32, height: u32, pixels: &[u8], color: image_webp::ColorType) -> Vec<u8> {
        let mut out = Vec::new();
        image_webp::WebPEncoder::new(&mut out)
            .encode(pixels, width, height, color)
            .unwrap();
        out
    }

    #[test]
    fn rgba_round_trip() {
        let pixels: Vec<u8> = (0..6 * 5 * 4).map(|i| (i * 11) as u8).collect();
        let webp = lossless(6, 5, &pixels, image_webp::ColorType::Rgba8);
        let frame = decode(&webp, &Limits::none()).unwrap();
        assert_eq!((frame.width, frame.height), (6, 5));
        assert_eq!(frame.rgba, pixels);
    }

    #[test]
    fn rgb_gains_opaque_alpha() {
        let pixels = [10u8, 20, 30, 40, 50, 60];
        let webp = lossless(2, 1, &pixels, image_webp::ColorType::Rgb8);
        let frame = decode(&webp, &Limits::none()).unwrap();
        assert_eq!(frame.rgba, [10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn truncated_stream() {
        let pixels: Vec<u8> = (0..32 * 32 * 4).map(|i| (i % 251) as u8).collect();
        let webp = lossless(32, 32, &pixels, image_webp::ColorType::Rgba8);
        let err = decode(&webp[..webp.len() / 2], &Limits::none()).unwrap_err();
        assert!(matches!(
            err.status(),
            Status::ReadingPastEnd | Status::Failed | Status::InvalidFormat
        ));
    }

    #[test]
    fn limits_apply() {
        let webp = lossless(4, 4, &[0; 64], image_webp::ColorType::Rgba8);
        let limits = Limits {
            max_pixels: Some(8),
            ..Limits::default()
        };
        assert_eq!(
            decode(&webp, &limits).unwrap_err().status(),
            Status::NoMemory
        );
    }
}
