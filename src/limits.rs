//! Resource limits for decoding.

use crate::error::CodecError;

/// Largest width or height accepted by default, as in libpng.
pub const DEFAULT_MAX_DIMENSION: u32 = 1_000_000;

/// Largest decoded RGBA8 buffer accepted by default (512 MiB).
pub const DEFAULT_MAX_MEMORY_BYTES: u64 = 512 * 1024 * 1024;

/// Resource limits for decode operations.
///
/// They are checked once the header has been read and before the output
/// buffer is allocated, so a small file declaring huge dimensions fails with
/// `NoMemory` instead of allocating. [`Limits::default`] caps dimensions at
/// [`DEFAULT_MAX_DIMENSION`] and the output at
/// [`DEFAULT_MAX_MEMORY_BYTES`]; [`Limits::none`] lifts every cap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: Option<u32>,
    /// Maximum image height in pixels.
    pub max_height: Option<u32>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum size of the decoded RGBA8 buffer in bytes. Also bounds the
    /// decoder's own working buffers.
    pub max_memory_bytes: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_width: Some(DEFAULT_MAX_DIMENSION),
            max_height: Some(DEFAULT_MAX_DIMENSION),
            max_pixels: None,
            max_memory_bytes: Some(DEFAULT_MAX_MEMORY_BYTES),
        }
    }
}

impl Limits {
    /// Create a new Limits with no restrictions.
    pub fn none() -> Self {
        Self {
            max_width: None,
            max_height: None,
            max_pixels: None,
            max_memory_bytes: None,
        }
    }

    /// Check if dimensions are within limits.
    ///
    /// Returns `Err` with a description if any limit is exceeded.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), &'static str> {
        if let Some(max_width) = self.max_width {
            if width > max_width {
                return Err("width exceeds limit");
            }
        }

        if let Some(max_height) = self.max_height {
            if height > max_height {
                return Err("height exceeds limit");
            }
        }

        if let Some(max_pixels) = self.max_pixels {
            let pixels = u64::from(width).saturating_mul(u64::from(height));
            if pixels > max_pixels {
                return Err("pixel count exceeds limit");
            }
        }

        Ok(())
    }

    /// Check if a memory allocation is within limits.
    pub fn check_memory(&self, bytes: u64) -> Result<(), &'static str> {
        if let Some(max_memory) = self.max_memory_bytes {
            if bytes > max_memory {
                return Err("memory allocation exceeds limit");
            }
        }
        Ok(())
    }

    /// Validate an RGBA8 output of the given size, as a codec error.
    pub(crate) fn validate(&self, width: u32, height: u32) -> Result<(), CodecError> {
        self.check_dimensions(width, height)
            .map_err(CodecError::no_memory)?;
        let bytes = u64::from(width)
            .saturating_mul(u64::from(height))
            .saturating_mul(4);
        self.check_memory(bytes).map_err(CodecError::no_memory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    #[test]
    fn limits_none() {
        let limits = Limits::none();
        assert!(limits.check_dimensions(u32::MAX, u32::MAX).is_ok());
        assert!(limits.check_memory(u64::MAX).is_ok());
    }

    #[test]
    fn limits_dimensions() {
        let limits = Limits {
            max_width: Some(1000),
            max_height: Some(1000),
            max_pixels: Some(500_000),
            ..Default::default()
        };

        assert!(limits.check_dimensions(1000, 1000).is_err()); // 1M pixels > 500k
        assert!(limits.check_dimensions(500, 500).is_ok()); // 250k pixels
        assert!(limits.check_dimensions(2000, 500).is_err()); // width > 1000
    }

    #[test]
    fn limits_memory() {
        let limits = Limits {
            max_memory_bytes: Some(1_000_000),
            ..Default::default()
        };

        assert!(limits.check_memory(500_000).is_ok());
        assert!(limits.check_memory(2_000_000).is_err());
    }

    #[test]
    fn default_caps_dimensions_and_memory() {
        let limits = Limits::default();
        assert!(limits.validate(4096, 4096).is_ok());
        assert!(limits.check_dimensions(1_000_001, 1).is_err());
        let err = limits.validate(16384, 16384).unwrap_err();
        assert_eq!(err.status(), Status::NoMemory);
        assert!(Limits::none().validate(16384, 16384).is_ok());
    }

    #[test]
    fn validate_reports_no_memory() {
        let limits = Limits {
            max_memory_bytes: Some(1024),
            ..Default::default()
        };
        assert!(limits.validate(16, 16).is_ok());
        let err = limits.validate(17, 16).unwrap_err();
        assert_eq!(err.status(), Status::NoMemory);
    }
}
