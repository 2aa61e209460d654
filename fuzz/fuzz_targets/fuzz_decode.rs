#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Probe must never panic and must agree with decode on dimensions.
    let probed = agcodecs::probe(data);

    let limits = agcodecs::Limits {
        max_pixels: Some(1 << 22),
        ..agcodecs::Limits::default()
    };
    for premultiplied in [false, true] {
        let result = agcodecs::DecodeRequest::new(data)
            .with_premultiplied(premultiplied)
            .with_limits(&limits)
            .decode();
        let Ok(image) = result else { continue };

        assert_eq!(
            image.as_bytes().len(),
            image.width() as usize * image.height() as usize * 4
        );
        assert_eq!(image.is_premultiplied(), premultiplied);
        if let Ok(Some((w, h))) = probed.as_ref().map(|p| p.dimensions()) {
            assert_eq!((w, h), (image.width(), image.height()));
        }
    }
});
