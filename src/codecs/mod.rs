//! Format adapters.
//!
//! Each adapter turns one codec crate's output into straight-alpha RGBA8 and
//! its errors into [`CodecError`]. Premultiplication and alpha-mode checks
//! happen in the decode engine, not here.

use crate::error::CodecError;
use crate::format::ImageFormat;
use crate::pixel::{BYTES_PER_PIXEL, byte_len, try_alloc_zeroed};

pub(crate) mod fast_png;
pub(crate) mod png;

#[cfg(feature = "webp")]
pub(crate) mod webp;

/// Where in the stream a decoder error surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stage {
    /// Signature and header chunks, before any pixel data.
    Header,
    /// Image data.
    Data,
}

/// Straight-alpha RGBA8 pixels straight out of an adapter.
#[derive(Debug)]
pub(crate) struct DecodedFrame {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

/// Interleaved 8-bit sample layouts an adapter may produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Layout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl Layout {
    pub(crate) fn channels(self) -> usize {
        match self {
            Layout::Gray => 1,
            Layout::GrayAlpha => 2,
            Layout::Rgb => 3,
            Layout::Rgba => 4,
        }
    }
}

/// Widen `src` to RGBA8. Gray is replicated into R, G and B; missing alpha
/// becomes 0xFF.
pub(crate) fn to_rgba8(
    format: ImageFormat,
    mut src: Vec<u8>,
    layout: Layout,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, CodecError> {
    let len = byte_len(width, height)
        .ok_or_else(|| CodecError::no_memory("image byte size overflows usize"))?;
    let pixels = len / BYTES_PER_PIXEL;
    if src.len() < pixels * layout.channels() {
        return Err(CodecError::failed(format, "decoder produced a short buffer"));
    }

    let mut out = match layout {
        Layout::Rgba => {
            src.truncate(len);
            return Ok(src);
        }
        _ => try_alloc_zeroed(len)?,
    };
    let dst = out.chunks_exact_mut(BYTES_PER_PIXEL);
    match layout {
        Layout::Rgba => {}
        Layout::Gray => {
            for (d, &g) in dst.zip(&src) {
                d.copy_from_slice(&[g, g, g, 0xFF]);
            }
        }
        Layout::GrayAlpha => {
            for (d, s) in dst.zip(src.chunks_exact(2)) {
                d.copy_from_slice(&[s[0], s[0], s[0], s[1]]);
            }
        }
        Layout::Rgb => {
            for (d, s) in dst.zip(src.chunks_exact(3)) {
                d.copy_from_slice(&[s[0], s[1], s[2], 0xFF]);
            }
        }
    }
    Ok(out)
}
