//! Alpha premultiplication.
//!
//! Premultiplied color is `round(color * alpha / 255)`. The products are
//! served from a 64 KiB table built once per process.

use std::sync::OnceLock;

static PREMULTIPLY: OnceLock<Box<[u8]>> = OnceLock::new();

/// Build process-wide codec tables.
///
/// Idempotent and thread-safe; later calls return immediately. Calling it at
/// startup moves the one-time cost out of the first decode.
pub fn init() {
    let _ = table();
}

fn table() -> &'static [u8] {
    PREMULTIPLY.get_or_init(|| {
        tracing::debug!("building premultiply table");
        let mut table = vec![0u8; 256 * 256].into_boxed_slice();
        for alpha in 0..256u32 {
            for color in 0..256u32 {
                table[(alpha as usize) << 8 | color as usize] = mul_div_255(color, alpha);
            }
        }
        table
    })
}

/// `round(color * alpha / 255)` without floating point.
#[inline]
pub(crate) fn mul_div_255(color: u32, alpha: u32) -> u8 {
    let t = color * alpha + 128;
    ((t + (t >> 8)) >> 8) as u8
}

/// Premultiply interleaved RGBA8 pixels in place.
pub(crate) fn premultiply_rgba8(data: &mut [u8]) {
    let table = table();
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        if a == 255 {
            continue;
        }
        let row = &table[(a as usize) << 8..][..256];
        px[0] = row[px[0] as usize];
        px[1] = row[px[1] as usize];
        px[2] = row[px[2] as usize];
    }
}

/// Whether every color sample is bounded by its alpha, which holds for any
/// correctly premultiplied buffer.
pub(crate) fn is_premultiplied_rgba8(data: &[u8]) -> bool {
    data.chunks_exact(4)
        .all(|px| px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_float_rounding() {
        for a in 0..=255u32 {
            for c in 0..=255u32 {
                let expected = (c as f64 * a as f64 / 255.0).round() as u8;
                assert_eq!(mul_div_255(c, a), expected, "c={c} a={a}");
            }
        }
    }

    #[test]
    fn premultiply_pixels() {
        let mut data = [200, 100, 50, 128, 10, 20, 30, 255, 255, 255, 255, 0];
        premultiply_rgba8(&mut data);
        assert_eq!(data, [100, 50, 25, 128, 10, 20, 30, 255, 0, 0, 0, 0]);
        assert!(is_premultiplied_rgba8(&data));
    }

    #[test]
    fn straight_alpha_is_detected() {
        assert!(!is_premultiplied_rgba8(&[255, 0, 0, 10]));
    }

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        assert_eq!(table().len(), 65536);
    }
}
