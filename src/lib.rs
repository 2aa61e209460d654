//! # agcodecs
//!
//! PNG and WebP decoding to RGBA8, and RGBA8 encoding to PNG.
//!
//! Decoding normalizes every source (palette, grayscale, tRNS, 16-bit,
//! sub-byte depths, Adam7, lossy or lossless WebP) to 8-bit RGBA, with
//! optional alpha premultiplication. Encoding has a configurable writer for
//! compression levels 1–9 and a fixed-format fast writer for levels 0 and
//! below.
//!
//! WebP support is behind the default `webp` feature.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use agcodecs::{EncodeConfig, PNG_FILTER_PAETH, decode_image, encode_image};
//!
//! let data: &[u8] = &[]; // your image bytes
//! let image = decode_image(data, true)?;
//!
//! let config = EncodeConfig::new()
//!     .with_compression_level(9)
//!     .with_filters(PNG_FILTER_PAETH)
//!     .with_resolution(300);
//! let png = encode_image(image.width(), image.height(), image.into_bytes(), &config)?;
//! # Ok::<(), agcodecs::CodecError>(())
//! ```
//!
//! Every failure carries a [`Status`]:
//!
//! ```
//! use agcodecs::{Status, decode_image};
//!
//! let err = decode_image(b"GIF89a", false).unwrap_err();
//! assert_eq!(err.status(), Status::InvalidSignature);
//! ```

#![forbid(unsafe_code)]

mod alpha;
mod codecs;
mod config;
mod decode;
mod encode;
mod error;
mod format;
mod limits;
mod output;
pub mod pixel;
mod probe;

pub use alpha::init;
pub use config::{
    COMPRESSION_FASTEST, DEFAULT_COMPRESSION_LEVEL, EncodeConfig, INCHES_PER_METER,
    PNG_ALL_FILTERS, PNG_FILTER_AVG, PNG_FILTER_NONE, PNG_FILTER_PAETH, PNG_FILTER_SUB,
    PNG_FILTER_UP, PNG_NO_FILTERS, Strategy,
};
pub use decode::{DecodeRequest, decode_image, decode_png, decode_webp};
pub use encode::{encode_image, encode_pixels};
pub use error::{CodecError, Status};
pub use format::{ImageFormat, PNG_SIGNATURE};
pub use limits::{DEFAULT_MAX_DIMENSION, DEFAULT_MAX_MEMORY_BYTES, Limits};
pub use pixel::PixelBuffer;
pub use probe::{ProbeResult, probe};
