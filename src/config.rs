//! PNG encoder configuration.
//!
//! Filter constants carry libpng's bit values so masks produced by other
//! tools can be passed through unchanged.

use crate::error::CodecError;

/// Disable row filtering.
pub const PNG_NO_FILTERS: u32 = 0x00;
/// Allow the None filter.
pub const PNG_FILTER_NONE: u32 = 0x08;
/// Allow the Sub filter.
pub const PNG_FILTER_SUB: u32 = 0x10;
/// Allow the Up filter.
pub const PNG_FILTER_UP: u32 = 0x20;
/// Allow the Average filter.
pub const PNG_FILTER_AVG: u32 = 0x40;
/// Allow the Paeth filter.
pub const PNG_FILTER_PAETH: u32 = 0x80;
/// Allow every filter.
pub const PNG_ALL_FILTERS: u32 =
    PNG_FILTER_NONE | PNG_FILTER_SUB | PNG_FILTER_UP | PNG_FILTER_AVG | PNG_FILTER_PAETH;

/// Compression level selecting the fastest, lowest-ratio fast encoder mode.
pub const COMPRESSION_FASTEST: i32 = -1;

/// Default deflate effort for the general encoder.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 6;

/// Pixels per meter in one pixel per inch.
pub const INCHES_PER_METER: f64 = 39.3701;

/// Which encoder a configuration selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Configurable writer: deflate level 1–9, filter mask, pHYs.
    General { level: u8 },
    /// Fixed-format RGBA8 writer tuned for speed.
    Fast { fastest: bool },
}

/// Options for [`encode_image`](crate::encode_image).
///
/// # Example
///
/// ```
/// use agcodecs::{EncodeConfig, PNG_FILTER_SUB, PNG_FILTER_UP};
///
/// let config = EncodeConfig::new()
///     .with_compression_level(9)
///     .with_filters(PNG_FILTER_SUB | PNG_FILTER_UP)
///     .with_resolution(300);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeConfig {
    /// 1–9 selects deflate effort; 0 or below selects the fast encoder.
    /// Values above 9 use the default level.
    pub compression_level: i32,
    /// libpng filter heuristic mask.
    pub filters: u32,
    /// Pixels per inch; 0 omits the pHYs chunk.
    pub resolution: u32,
    /// RGBA palette records, four bytes each.
    pub palette: Option<Vec<u8>>,
    /// Background color index into `palette`.
    pub background_index: Option<u8>,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            filters: PNG_ALL_FILTERS,
            resolution: 0,
            palette: None,
            background_index: None,
        }
    }
}

impl EncodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    pub fn with_filters(mut self, filters: u32) -> Self {
        self.filters = filters;
        self
    }

    /// Set the resolution in pixels per inch.
    pub fn with_resolution(mut self, ppi: u32) -> Self {
        self.resolution = ppi;
        self
    }

    pub fn with_palette(mut self, palette: Vec<u8>) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn with_background_index(mut self, index: u8) -> Self {
        self.background_index = Some(index);
        self
    }

    /// Check the configuration without touching any pixels.
    ///
    /// Only the palette length can make a configuration invalid. Levels above
    /// 9 fall back to [`DEFAULT_COMPRESSION_LEVEL`], and the background index
    /// is kept as given.
    pub fn validate(&self) -> Result<(), CodecError> {
        if let Some(palette) = &self.palette {
            if palette.len() % 4 != 0 {
                return Err(CodecError::invalid_format(
                    "palette length must be a multiple of 4",
                ));
            }
        }
        Ok(())
    }

    /// Encoder selected by `compression_level`.
    pub fn strategy(&self) -> Strategy {
        match self.compression_level {
            level @ 1..=9 => Strategy::General { level: level as u8 },
            10.. => Strategy::General {
                level: DEFAULT_COMPRESSION_LEVEL as u8,
            },
            COMPRESSION_FASTEST => Strategy::Fast { fastest: true },
            _ => Strategy::Fast { fastest: false },
        }
    }

    /// Whether `background_index` points outside the palette.
    pub(crate) fn background_out_of_range(&self) -> bool {
        match (self.palette_len(), self.background_index) {
            (Some(colors), Some(index)) => usize::from(index) >= colors,
            _ => false,
        }
    }

    /// pHYs value for the configured resolution, if any.
    pub fn pixels_per_meter(&self) -> Option<u32> {
        if self.resolution == 0 {
            return None;
        }
        Some((f64::from(self.resolution) * INCHES_PER_METER).round() as u32)
    }

    /// Number of palette colors, if a palette is set.
    pub fn palette_len(&self) -> Option<usize> {
        self.palette.as_ref().map(|p| p.len() / 4)
    }
}

/// Row filter for a libpng filter mask.
///
/// The encoder never writes a filter outside the mask. With all five allowed
/// it picks per row; with a subset it uses the strongest allowed filter
/// (Paeth, then Avg, Up, Sub, None) for every row. The bare filter values
/// 1–4 select Sub, Up, Avg and Paeth as in `png_set_filter`.
pub(crate) fn filter_for_mask(mask: u32) -> png::Filter {
    match mask & (PNG_ALL_FILTERS | 0x07) {
        0 => return png::Filter::NoFilter,
        1 => return png::Filter::Sub,
        2 => return png::Filter::Up,
        3 => return png::Filter::Avg,
        4 => return png::Filter::Paeth,
        _ => {}
    }

    let allowed = mask & PNG_ALL_FILTERS;
    if allowed == PNG_ALL_FILTERS {
        png::Filter::Adaptive
    } else if allowed & PNG_FILTER_PAETH != 0 {
        png::Filter::Paeth
    } else if allowed & PNG_FILTER_AVG != 0 {
        png::Filter::Avg
    } else if allowed & PNG_FILTER_UP != 0 {
        png::Filter::Up
    } else if allowed & PNG_FILTER_SUB != 0 {
        png::Filter::Sub
    } else {
        png::Filter::NoFilter
    }
}
