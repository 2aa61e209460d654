//! Fixed-format RGBA8 PNG writer tuned for speed.
//!
//! Always Up-filtered, 8-bit RGBA, non-interlaced. The only knob is how hard
//! deflate works.

use super::png::{encode_error, io_error};
use crate::CodecError;
use crate::output::GrowableOutput;

pub(crate) fn encode(
    width: u32,
    height: u32,
    pixels: &[u8],
    fastest: bool,
) -> Result<Vec<u8>, CodecError> {
    let mut out = GrowableOutput::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_filter(png::Filter::Up);
        if fastest {
            encoder.set_deflate_compression(png::DeflateCompression::FdeflateUltraFast);
        } else {
            encoder.set_compression(png::Compression::Fast);
        }

        let mut writer = encoder.write_header().map_err(encode_error)?;
        writer.write_image_data(pixels).map_err(encode_error)?;
        writer.finish().map_err(encode_error)?;
    }
    let bytes = out.into_inner();
    tracing::debug!(width, height, fastest, bytes = bytes.len(), "fast png encoded");
    Ok(bytes)
}
