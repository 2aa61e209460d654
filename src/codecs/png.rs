//! PNG adapter over the `png` crate: normalizing decoder and the general
//! encoder.

use std::io::{self, Cursor, Write};

use super::{DecodedFrame, Layout, Stage, to_rgba8};
use crate::config::{EncodeConfig, filter_for_mask};
use crate::output::GrowableOutput;
use crate::pixel::try_alloc_zeroed;
use crate::{CodecError, ImageFormat, Limits};

/// White in RGB16, the bKGD payload for a direct-color image.
const WHITE_BKGD: [u8; 6] = [0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF];

/// Map a `png` decoding error to a codec error.
///
/// Running out of input is always `ReadingPastEnd`. Malformed data is
/// `InvalidFormat` while the header is being read and `Failed` afterwards.
pub(crate) fn decode_error(stage: Stage, err: png::DecodingError) -> CodecError {
    match err {
        png::DecodingError::IoError(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            CodecError::ReadingPastEnd(ImageFormat::Png)
        }
        png::DecodingError::LimitsExceeded => {
            CodecError::no_memory("png decoder memory limit exceeded")
        }
        png::DecodingError::Format(e) if stage == Stage::Header => {
            CodecError::invalid_format(format!("png: {e}"))
        }
        other => CodecError::failed(ImageFormat::Png, other.to_string()),
    }
}

/// Map a `png` encoding error to a codec error.
pub(crate) fn encode_error(err: png::EncodingError) -> CodecError {
    match err {
        png::EncodingError::IoError(e) => io_error(e),
        other => CodecError::write_error(format!("png: {other}")),
    }
}

/// A failed write to the output sink.
pub(crate) fn io_error(err: io::Error) -> CodecError {
    if err.kind() == io::ErrorKind::OutOfMemory {
        CodecError::no_memory("png output buffer could not grow")
    } else {
        CodecError::write_error(format!("png: {err}"))
    }
}

/// Decode a PNG to straight-alpha RGBA8.
///
/// The `png` crate expands palettes, tRNS, and sub-byte depths, strips
/// 16-bit samples to their high byte, and resolves Adam7. Whatever color type
/// comes out is then widened to RGBA.
pub(crate) fn decode(data: &[u8], limits: &Limits) -> Result<DecodedFrame, CodecError> {
    let png_limits = png::Limits {
        bytes: limits
            .max_memory_bytes
            .map_or(usize::MAX, |b| usize::try_from(b).unwrap_or(usize::MAX)),
    };
    let mut decoder = png::Decoder::new_with_limits(Cursor::new(data), png_limits);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

    let mut reader = decoder
        .read_info()
        .map_err(|e| decode_error(Stage::Header, e))?;

    let info = reader.info();
    let (width, height) = (info.width, info.height);
    tracing::debug!(
        width,
        height,
        color_type = ?info.color_type,
        bit_depth = ?info.bit_depth,
        interlaced = info.interlaced,
        "png header"
    );
    limits.validate(width, height)?;

    let buffer_size = reader
        .output_buffer_size()
        .ok_or_else(|| CodecError::no_memory("png output buffer size overflows usize"))?;
    let mut raw = try_alloc_zeroed(buffer_size)?;
    let frame = reader
        .next_frame(&mut raw)
        .map_err(|e| decode_error(Stage::Data, e))?;
    raw.truncate(frame.buffer_size());

    let layout = match reader.output_color_type().0 {
        png::ColorType::Grayscale => Layout::Gray,
        png::ColorType::GrayscaleAlpha => Layout::GrayAlpha,
        png::ColorType::Rgb => Layout::Rgb,
        png::ColorType::Rgba => Layout::Rgba,
        png::ColorType::Indexed => {
            return Err(CodecError::failed(
                ImageFormat::Png,
                "palette was not expanded",
            ));
        }
    };

    let rgba = to_rgba8(ImageFormat::Png, raw, layout, width, height)?;
    Ok(DecodedFrame {
        width,
        height,
        rgba,
    })
}

/// Encode straight RGBA8 rows with the configurable writer.
///
/// Each scanline is handed to the stream as a slice of `pixels`; nothing is
/// copied. Any failed write aborts the encode and no bytes are returned.
pub(crate) fn encode(
    width: u32,
    height: u32,
    pixels: &[u8],
    level: u8,
    config: &EncodeConfig,
) -> Result<Vec<u8>, CodecError> {
    let mut out = GrowableOutput::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_deflate_compression(png::DeflateCompression::Level(level));
        encoder.set_filter(filter_for_mask(config.filters));
        if let Some(ppm) = config.pixels_per_meter() {
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));
        }

        let mut writer = encoder.write_header().map_err(encode_error)?;
        writer
            .write_chunk(png::chunk::ChunkType(*b"bKGD"), &WHITE_BKGD)
            .map_err(encode_error)?;

        let stride = width as usize * 4;
        let mut stream = writer.stream_writer().map_err(encode_error)?;
        for row in pixels.chunks_exact(stride) {
            stream.write_all(row).map_err(io_error)?;
        }
        stream.finish().map_err(encode_error)?;
        writer.finish().map_err(encode_error)?;
    }
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    fn encoded(width: u32, height: u32, pixels: &[u8], config: &EncodeConfig) -> Vec<u8> {
        encode(width, height, pixels, 6, config).unwrap()
    }

    #[test]
    fn writes_white_background() {
        let png = encoded(1, 1, &[1, 2, 3, 255], &EncodeConfig::default());
        let pos = png.windows(4).position(|w| w == b"bKGD").unwrap();
        assert_eq!(&png[pos - 4..pos], &6u32.to_be_bytes());
        assert_eq!(&png[pos + 4..pos + 10], &WHITE_BKGD);
    }

    #[test]
    fn resolution_becomes_phys() {
        let config = EncodeConfig::new().with_resolution(300);
        let png = encoded(2, 1, &[0; 8], &config);
        let reader = png::Decoder::new(Cursor::new(&png[..])).read_info().unwrap();
        let dims = reader.info().pixel_dims.unwrap();
        assert_eq!(dims.xppu, 11811);
        assert_eq!(dims.yppu, 11811);
        assert_eq!(dims.unit, png::Unit::Meter);
    }

    #[test]
    fn no_phys_without_resolution() {
        let png = encoded(2, 1, &[0; 8], &EncodeConfig::default());
        assert!(!png.windows(4).any(|w| w == b"pHYs"));
    }

    #[test]
    fn decode_round_trip() {
        let pixels: Vec<u8> = (0..48).map(|i| (i * 5) as u8).collect();
        let png = encoded(4, 3, &pixels, &EncodeConfig::default());
        let frame = decode(&png, &Limits::none()).unwrap();
        assert_eq!((frame.width, frame.height), (4, 3));
        assert_eq!(frame.rgba, pixels);
    }

    #[test]
    fn truncated_header_reads_past_end() {
        let png = encoded(4, 4, &[9; 64], &EncodeConfig::default());
        let err = decode(&png[..20], &Limits::none()).unwrap_err();
        assert_eq!(err.status(), Status::ReadingPastEnd);
    }

    #[test]
    fn limits_checked_before_pixels() {
        let png = encoded(8, 8, &[0; 256], &EncodeConfig::default());
        let limits = Limits {
            max_width: Some(4),
            ..Limits::default()
        };
        let err = decode(&png, &limits).unwrap_err();
        assert_eq!(err.status(), Status::NoMemory);
    }

    #[test]
    fn out_of_memory_write_is_no_memory() {
        let err = io_error(io::Error::from(io::ErrorKind::OutOfMemory));
        assert_eq!(err.status(), Status::NoMemory);
        let err = io_error(io::Error::from(io::ErrorKind::BrokenPipe));
        assert_eq!(err.status(), Status::WriteError);
    }
}
