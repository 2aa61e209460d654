//! Image encoding.

use crate::codecs;
use crate::config::{EncodeConfig, PNG_ALL_FILTERS, Strategy};
use crate::{CodecError, PixelBuffer};

/// Encode straight RGBA8 pixels to PNG.
///
/// `pixels` must hold exactly `width * height * 4` bytes. Zero dimensions
/// fail with `WriteError` before anything is written; the configuration is
/// validated next, so a bad palette never reaches the encoder.
///
/// # Example
///
/// ```
/// use agcodecs::{EncodeConfig, decode_image, encode_image};
///
/// let red = [255u8, 0, 0, 255].repeat(4);
/// let png = encode_image(2, 2, red.clone(), &EncodeConfig::default())?;
/// assert_eq!(decode_image(&png, false)?.as_bytes(), &red[..]);
/// # Ok::<(), agcodecs::CodecError>(())
/// ```
pub fn encode_image(
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    config: &EncodeConfig,
) -> Result<Vec<u8>, CodecError> {
    if width == 0 || height == 0 {
        return Err(CodecError::write_error(format!(
            "image dimensions must be non-zero (got {width}x{height})"
        )));
    }
    config.validate()?;
    let image = PixelBuffer::new(width, height, pixels)?;
    encode_validated(&image, config)
}

/// Encode a [`PixelBuffer`] to PNG.
///
/// Premultiplied buffers are written as-is; PNG has no premultiplied mode.
pub fn encode_pixels(image: &PixelBuffer, config: &EncodeConfig) -> Result<Vec<u8>, CodecError> {
    config.validate()?;
    encode_validated(image, config)
}

fn encode_validated(image: &PixelBuffer, config: &EncodeConfig) -> Result<Vec<u8>, CodecError> {
    let (width, height) = (image.width(), image.height());
    if image.is_premultiplied() {
        tracing::debug!("encoding premultiplied samples without conversion");
    }

    let strategy = config.strategy();
    tracing::debug!(width, height, ?strategy, "encoding png");

    let result = match strategy {
        Strategy::General { level } => {
            if let Some(colors) = config.palette_len() {
                tracing::debug!(
                    colors,
                    background_index = ?config.background_index,
                    "palette accepted but not written"
                );
                if config.background_out_of_range() {
                    tracing::debug!(
                        colors,
                        background_index = ?config.background_index,
                        "background index outside palette"
                    );
                }
            }
            codecs::png::encode(width, height, image.as_bytes(), level, config)
        }
        Strategy::Fast { fastest } => {
            log_ignored_options(config);
            codecs::fast_png::encode(width, height, image.as_bytes(), fastest)
        }
    };

    if let Err(e) = &result {
        tracing::debug!(error = %e, "png encode failed");
    }
    result
}

fn log_ignored_options(config: &EncodeConfig) {
    if config.filters != PNG_ALL_FILTERS {
        tracing::debug!(filters = config.filters, "fast encoder ignores filter mask");
    }
    if config.resolution != 0 {
        tracing::debug!(
            resolution = config.resolution,
            "fast encoder ignores resolution"
        );
    }
    if config.palette.is_some() {
        tracing::debug!("fast encoder ignores palette");
    }
}
