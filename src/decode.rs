//! Image decoding.

use crate::codecs::{self, DecodedFrame};
use crate::{CodecError, ImageFormat, Limits, PixelBuffer, alpha};

/// Image decode request builder.
///
/// # Example
///
/// ```no_run
/// use agcodecs::DecodeRequest;
///
/// let data: &[u8] = &[]; // your image bytes
/// let image = DecodeRequest::new(data).with_premultiplied(true).decode()?;
/// println!("{}x{}", image.width(), image.height());
/// # Ok::<(), agcodecs::CodecError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    premultiplied: bool,
    format: Option<ImageFormat>,
    limits: Option<&'a Limits>,
}

impl<'a> DecodeRequest<'a> {
    /// Create a new decode request for straight-alpha output.
    ///
    /// Format will be auto-detected from magic bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            premultiplied: false,
            format: None,
            limits: None,
        }
    }

    /// Request premultiplied (`true`) or straight (`false`) alpha.
    pub fn with_premultiplied(mut self, premultiplied: bool) -> Self {
        self.premultiplied = premultiplied;
        self
    }

    /// Only accept input of this format.
    ///
    /// The signature is still checked; bytes of any other format fail with
    /// `InvalidSignature`.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set resource limits. Without this, [`Limits::default`] applies.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Decode the image to RGBA8.
    pub fn decode(self) -> Result<PixelBuffer, CodecError> {
        let detected = ImageFormat::detect(self.data).ok_or(CodecError::InvalidSignature)?;
        if self.format.is_some_and(|f| f != detected) {
            return Err(CodecError::InvalidSignature);
        }

        let default_limits = Limits::default();
        let limits = self.limits.unwrap_or(&default_limits);
        let frame = decode_format(self.data, detected, limits)?;
        tracing::debug!(
            format = ?detected,
            width = frame.width,
            height = frame.height,
            premultiplied = self.premultiplied,
            "decoded"
        );

        finish(frame, detected, self.premultiplied)
    }
}

/// Dispatch to format-specific decoder.
fn decode_format(
    data: &[u8],
    format: ImageFormat,
    limits: &Limits,
) -> Result<DecodedFrame, CodecError> {
    match format {
        ImageFormat::Png => codecs::png::decode(data, limits),

        #[cfg(feature = "webp")]
        ImageFormat::WebP => codecs::webp::decode(data, limits),
        #[cfg(not(feature = "webp"))]
        ImageFormat::WebP => Err(CodecError::InvalidSignature),
    }
}

/// Apply the requested alpha mode and check the result carries it.
fn finish(
    frame: DecodedFrame,
    format: ImageFormat,
    premultiplied: bool,
) -> Result<PixelBuffer, CodecError> {
    let mut image = PixelBuffer::new(frame.width, frame.height, frame.rgba)?;
    if premultiplied {
        image.premultiply();
    }

    let mode_holds = image.is_premultiplied() == premultiplied
        && (!premultiplied || alpha::is_premultiplied_rgba8(image.as_bytes()));
    if !mode_holds {
        return Err(CodecError::failed(
            format,
            "decoded buffer does not carry the requested alpha mode",
        ));
    }
    Ok(image)
}

/// Decode PNG or WebP bytes to RGBA8, premultiplied or straight.
///
/// [`Limits::default`] applies; use [`DecodeRequest::with_limits`] to change
/// it.
pub fn decode_image(data: &[u8], premultiplied: bool) -> Result<PixelBuffer, CodecError> {
    DecodeRequest::new(data)
        .with_premultiplied(premultiplied)
        .decode()
}

/// Decode PNG bytes only.
pub fn decode_png(data: &[u8], premultiplied: bool) -> Result<PixelBuffer, CodecError> {
    DecodeRequest::new(data)
        .with_format(ImageFormat::Png)
        .with_premultiplied(premultiplied)
        .decode()
}

/// Decode WebP bytes only.
///
/// Lossy (VP8) and lossless (VP8L) files decode, and so do still images in
/// the extended (VP8X) container, including those carrying an ALPH chunk.
/// Animated files fail with `InvalidFormat`.
pub fn decode_webp(data: &[u8], premultiplied: bool) -> Result<PixelBuffer, CodecError> {
    DecodeRequest::new(data)
        .with_format(ImageFormat::WebP)
        .with_premultiplied(premultiplied)
        .decode()
}
