#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    width: u8,
    height: u8,
    level: i8,
    filters: u8,
    resolution: u16,
    pixels: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let width = u32::from(input.width % 64) + 1;
    let height = u32::from(input.height % 64) + 1;
    let len = width as usize * height as usize * 4;
    if input.pixels.is_empty() {
        return;
    }
    let pixels: Vec<u8> = input.pixels.iter().copied().cycle().take(len).collect();

    let level = i32::from(input.level).clamp(-3, 9);
    let config = agcodecs::EncodeConfig::new()
        .with_compression_level(level)
        .with_filters(u32::from(input.filters) & agcodecs::PNG_ALL_FILTERS)
        .with_resolution(u32::from(input.resolution));

    let png = agcodecs::encode_image(width, height, pixels.clone(), &config)
        .expect("valid input must encode");
    let decoded = agcodecs::decode_image(&png, false).expect("own output must decode");

    assert_eq!((decoded.width(), decoded.height()), (width, height));
    assert_eq!(decoded.as_bytes(), &pixels[..]);
});
