#![no_main]
use libfuzzer_sys::fuzz_target;
use zenilbm::*;

fuzz_target!(|data: &[u8]| {
    // First byte picks the depth and width, the rest are pixel indices
    let Some((&shape, indices)) = data.split_first() else {
        return;
    };
    let planes = (shape & 7) + 1;
    let width = u32::from(shape >> 3) + 1;
    let height = indices.len() as u32 / width;
    if height == 0 || height > 512 {
        return;
    }
    let mask = ((1u16 << planes) - 1) as u8;
    let indices: Vec<u8> = indices[..(width * height) as usize]
        .iter()
        .map(|&i| i & mask)
        .collect();

    for rle_mode in [RleMode::Compatible, RleMode::Tight] {
        let image = IndexedImage::new(&indices, width, height).unwrap();
        let config = EncodeConfig::new(width, height).with_palette_size(1 << planes);
        let request = EncodeRequest::new(config).with_rle_mode(rle_mode);
        let ilbm = request.encode(image, &[], enough::Unstoppable).unwrap();

        let bitmap = IlbmFile::parse(&ilbm).unwrap().planar().unwrap();
        for y in 0..height {
            for x in 0..width {
                assert_eq!(
                    bitmap.pixel_value(x, y),
                    indices[(y * width + x) as usize],
                    "roundtrip pixel mismatch at ({x}, {y})"
                );
            }
        }
    }
});
