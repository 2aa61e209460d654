//! Container sniffing.

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Containers the decoder understands.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    WebP,
}

impl ImageFormat {
    /// Detect format from magic bytes. Returns None if unrecognized.
    ///
    /// This only looks at the leading bytes and never allocates, so it is the
    /// fast-reject path for foreign or empty input.
    pub fn detect(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.len() >= 8 && data[..8] == PNG_SIGNATURE {
            return Some(ImageFormat::Png);
        }

        // WebP: "RIFF....WEBP"
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }

    /// Detect format from file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Common file extensions.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Png => &["png"],
            ImageFormat::WebP => &["webp"],
        }
    }

    /// Whether this crate can produce this format.
    pub fn can_encode(self) -> bool {
        matches!(self, ImageFormat::Png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_png() {
        let data = [
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
        ];
        assert_eq!(ImageFormat::detect(&data), Some(ImageFormat::Png));
    }

    #[test]
    fn detect_png_exact_signature_length() {
        assert_eq!(ImageFormat::detect(&PNG_SIGNATURE), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::detect(&PNG_SIGNATURE[..7]), None);
    }

    #[test]
    fn detect_webp() {
        let data = b"RIFF\x00\x00\x00\x00WEBP";
        assert_eq!(ImageFormat::detect(data), Some(ImageFormat::WebP));
    }

    #[test]
    fn detect_webp_needs_twelve_bytes() {
        assert_eq!(ImageFormat::detect(b"RIFF\x00\x00\x00\x00WEB"), None);
        assert_eq!(ImageFormat::detect(b"RIFF\x00\x00\x00\x00AVI "), None);
    }

    #[test]
    fn detect_unknown() {
        assert_eq!(ImageFormat::detect(&[]), None);
        assert_eq!(ImageFormat::detect(&[0, 1, 2, 3]), None);
        assert_eq!(ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]), None);
    }

    #[test]
    fn from_extension_case_insensitive() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("WebP"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_extension("jpg"), None);
    }
}
