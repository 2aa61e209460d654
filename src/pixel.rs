//! Owned RGBA8 pixel buffer.
//!
//! Typed views use `imgref::ImgRef` over `rgb::Rgba<u8>` pixels.

pub use imgref::{ImgRef, ImgVec};
pub use rgb::Rgba;

use crate::error::CodecError;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// A decoded image: interleaved RGBA8, row-major, no row padding.
///
/// `data.len() == width * height * 4` always holds; the constructor rejects
/// anything else. The buffer is owned and moves between stages.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
    premultiplied: bool,
}

impl PixelBuffer {
    /// Wrap straight-alpha RGBA8 bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CodecError> {
        Self::with_alpha_mode(width, height, data, false)
    }

    /// Wrap RGBA8 bytes whose alpha association is already known.
    pub fn with_alpha_mode(
        width: u32,
        height: u32,
        data: Vec<u8>,
        premultiplied: bool,
    ) -> Result<Self, CodecError> {
        if width == 0 || height == 0 {
            return Err(CodecError::write_error(format!(
                "image dimensions must be non-zero (got {width}x{height})"
            )));
        }
        let expected = byte_len(width, height)
            .ok_or_else(|| CodecError::no_memory("image byte size overflows usize"))?;
        if data.len() != expected {
            return Err(CodecError::write_error(format!(
                "buffer holds {} bytes, {width}x{height} RGBA8 needs {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Whether color channels are already scaled by alpha.
    pub fn is_premultiplied(&self) -> bool {
        self.premultiplied
    }

    /// Raw RGBA8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Borrow each scanline without copying.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[u8]> {
        self.data.chunks_exact(self.stride())
    }

    /// Typed 2D view of the pixels.
    pub fn as_imgref(&self) -> ImgRef<'_, Rgba<u8>> {
        let pixels: &[Rgba<u8>] = bytemuck::cast_slice(&self.data);
        ImgRef::new(pixels, self.width as usize, self.height as usize)
    }

    /// Convert straight alpha to premultiplied alpha. No-op if already
    /// premultiplied.
    pub fn premultiply(&mut self) {
        if !self.premultiplied {
            crate::alpha::premultiply_rgba8(&mut self.data);
            self.premultiplied = true;
        }
    }

    /// Whether every pixel has alpha 255.
    pub fn is_opaque(&self) -> bool {
        self.data.chunks_exact(BYTES_PER_PIXEL).all(|px| px[3] == 255)
    }
}

impl core::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .field("premultiplied", &self.premultiplied)
            .finish()
    }
}

/// `width * height * 4`, or None on overflow.
pub(crate) fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}

/// Zeroed byte buffer, reporting allocation failure instead of aborting.
pub(crate) fn try_alloc_zeroed(len: usize) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| CodecError::no_memory(format!("cannot allocate {len} bytes")))?;
    buf.resize(len, 0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    #[test]
    fn rejects_wrong_length() {
        let err = PixelBuffer::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(err.status(), Status::WriteError);
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(PixelBuffer::new(0, 4, Vec::new()).is_err());
        assert!(PixelBuffer::new(4, 0, Vec::new()).is_err());
    }

    #[test]
    fn rows_follow_stride() {
        let data: Vec<u8> = (0..24).collect();
        let buf = PixelBuffer::new(3, 2, data).unwrap();
        let rows: Vec<&[u8]> = buf.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], 12);
        assert_eq!(buf.stride(), 12);
    }

    #[test]
    fn typed_view() {
        let buf = PixelBuffer::new(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let img = buf.as_imgref();
        assert_eq!(img.width(), 1);
        assert_eq!(img.height(), 2);
        assert_eq!(img.buf()[1], Rgba { r: 5, g: 6, b: 7, a: 8 });
    }

    #[test]
    fn premultiply_once() {
        let mut buf = PixelBuffer::new(1, 1, vec![255, 128, 0, 128]).unwrap();
        buf.premultiply();
        assert!(buf.is_premultiplied());
        assert_eq!(buf.as_bytes(), &[128, 64, 0, 128]);
        buf.premultiply();
        assert_eq!(buf.as_bytes(), &[128, 64, 0, 128]);
        assert!(!buf.is_opaque());
    }

    #[test]
    fn impossible_allocation_is_no_memory() {
        let err = try_alloc_zeroed(usize::MAX).unwrap_err();
        assert_eq!(err.status(), Status::NoMemory);
        assert_eq!(try_alloc_zeroed(16).unwrap(), vec![0; 16]);
    }
}
