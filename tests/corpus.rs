//! Test corpus: encode/read-back across patterns, sizes and modes.

use enough::Unstoppable;
use zenilbm::*;

fn checkerboard(w: usize, h: usize, hi: u8) -> Vec<u8> {
    let mut indices = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            indices[y * w + x] = if (x + y) % 2 == 0 { hi } else { 0 };
        }
    }
    indices
}

fn noise_pattern(len: usize, mask: u8) -> Vec<u8> {
    let mut out = vec![0u8; len];
    let mut state: u32 = 0xDEAD_BEEF;
    for p in out.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *p = state as u8 & mask;
    }
    out
}

fn gradient_rgb(w: usize, h: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let off = (y * w + x) * 3;
            pixels[off] = (x * 255 / w.max(2).saturating_sub(1)) as u8;
            pixels[off + 1] = (y * 255 / h.max(2).saturating_sub(1)) as u8;
            pixels[off + 2] = ((x + y) * 7) as u8;
        }
    }
    pixels
}

/// Encode indices, read the file back and compare every pixel.
fn indexed_roundtrip(indices: &[u8], w: u32, h: u32, palette_size: usize, compress: bool) {
    let image = IndexedImage::new(indices, w, h).unwrap();
    let config = EncodeConfig::new(w, h)
        .with_palette_size(palette_size)
        .with_compression(compress);
    let ilbm = EncodeRequest::new(config)
        .encode(image, &[], Unstoppable)
        .unwrap();

    let file = IlbmFile::parse(&ilbm).unwrap();
    assert_eq!(file.form_len as usize, ilbm.len() - 8);
    assert_eq!(file.cmap.len(), palette_size);
    assert_eq!(file.header.is_compressed(), compress);
    let bitmap = file.planar().unwrap();
    assert_eq!(bitmap.planes(), bitplane_count(palette_size).unwrap());
    for y in 0..h {
        for x in 0..w {
            assert_eq!(
                bitmap.pixel_value(x, y),
                indices[(y * w + x) as usize],
                "pixel ({x}, {y})"
            );
        }
    }
}

// ── Indexed ─────────────────────────────────────────────────────────

#[test]
fn checkerboard_every_depth() {
    for planes in 1..=8u32 {
        let size = 1usize << planes;
        let pixels = checkerboard(24, 9, (size - 1) as u8);
        indexed_roundtrip(&pixels, 24, 9, size, true);
        indexed_roundtrip(&pixels, 24, 9, size, false);
    }
}

#[test]
fn noise_every_depth() {
    for planes in 1..=8u32 {
        let size = 1usize << planes;
        let pixels = noise_pattern(53 * 11, (size - 1) as u8);
        indexed_roundtrip(&pixels, 53, 11, size, true);
    }
}

#[test]
fn single_pixel() {
    indexed_roundtrip(&[1], 1, 1, 2, true);
    indexed_roundtrip(&[1], 1, 1, 2, false);
}

#[test]
fn odd_widths_pad_to_words() {
    for w in [1u32, 7, 15, 16, 17, 31, 33] {
        let pixels = noise_pattern(w as usize * 3, 0x0F);
        indexed_roundtrip(&pixels, w, 3, 16, true);
        let file_len = encode_indexed(&pixels, w, 3, &[], 16, false, Unstoppable)
            .unwrap()
            .len();
        // FORM + BMHD + 16-entry CMAP + BODY header, then 4 planes x 3 rows
        assert_eq!(file_len, 12 + 28 + 56 + 8 + row_bytes(w) * 4 * 3);
    }
}

#[test]
fn wide_image_long_runs() {
    let pixels = vec![3u8; 1000];
    indexed_roundtrip(&pixels, 1000, 1, 4, true);
    let packed = encode_indexed(&pixels, 1000, 1, &[], 4, true, Unstoppable).unwrap();
    // per plane: one 125-byte run of 0xFF, then the zero pad byte as a literal
    assert_eq!(
        IlbmFile::parse(&packed).unwrap().body().unwrap(),
        &[132, 0xFF, 0, 0, 132, 0xFF, 0, 0]
    );
}

#[test]
fn tall_image() {
    let pixels = noise_pattern(3 * 500, 0x1F);
    indexed_roundtrip(&pixels, 3, 500, 32, true);
}

#[test]
fn strided_input() {
    let mut buf = vec![0xEEu8; 10 * 4];
    for y in 0..4 {
        for x in 0..6 {
            buf[y * 10 + x] = ((x + y) % 4) as u8;
        }
    }
    let image = IndexedImage::with_stride(&buf, 6, 4, 10).unwrap();
    let bitmap = EncodeRequest::new(EncodeConfig::new(6, 4).with_palette_size(4))
        .planar(image, Unstoppable)
        .unwrap();
    for y in 0..4u32 {
        for x in 0..6u32 {
            assert_eq!(bitmap.pixel_value(x, y), ((x + y) % 4) as u8);
        }
    }
}

// ── HAM ─────────────────────────────────────────────────────────────

/// Rebuild each pixel's held color from its HAM control code.
fn ham_decode_row(bitmap: &PlanarBitmap, y: u32) -> Vec<(u8, u8, u8)> {
    let (mut r, mut g, mut b) = (0u8, 0u8, 0u8);
    (0..bitmap.width())
        .map(|x| {
            let code = bitmap.pixel_value(x, y);
            match code >> 4 {
                0b01 => b = code & 0x0F,
                0b10 => r = code & 0x0F,
                0b11 => g = code & 0x0F,
                _ => panic!("palette code {code} at ({x}, {y})"),
            }
            (r, g, b)
        })
        .collect()
}

#[test]
fn ham_gradient_modifies_one_channel_per_pixel() {
    let (w, h) = (40usize, 6usize);
    let pixels = gradient_rgb(w, h);
    let image = TrueColorImage::new(&pixels, w as u32, h as u32, PixelLayout::Rgb8).unwrap();
    let config = EncodeConfig::new(w as u32, h as u32).with_chipset(Chipset::Ham);
    let ilbm = EncodeRequest::new(config)
        .encode(image, &[], Unstoppable)
        .unwrap();

    let file = IlbmFile::parse(&ilbm).unwrap();
    assert!(file.is_ham());
    let bitmap = file.planar().unwrap();
    assert_eq!(bitmap.planes(), 6);

    for y in 0..h {
        let held = ham_decode_row(&bitmap, y as u32);
        let mut prev = (0u8, 0u8, 0u8);
        for (x, &color) in held.iter().enumerate() {
            let changed = [color.0 != prev.0, color.1 != prev.1, color.2 != prev.2];
            assert!(changed.iter().filter(|&&c| c).count() <= 1, "({x}, {y})");
            prev = color;
        }
    }
}

#[test]
fn ham_rows_restart_from_base() {
    // identical rows must produce identical codes
    let row = [200u8, 10, 90, 10, 250, 40, 90, 90, 90];
    let pixels: Vec<u8> = row.iter().chain(row.iter()).copied().collect();
    let image = TrueColorImage::new(&pixels, 3, 2, PixelLayout::Rgb8).unwrap();
    let bitmap = EncodeRequest::new(EncodeConfig::new(3, 2).with_chipset(Chipset::Ham))
        .planar(image, Unstoppable)
        .unwrap();
    assert_eq!(bitmap.interleaved_row(0), bitmap.interleaved_row(1));
}

#[test]
fn ham_custom_base() {
    let pixels = [255u8, 255, 255];
    let image = TrueColorImage::new(&pixels, 1, 1, PixelLayout::Rgb8).unwrap();
    let bitmap = EncodeRequest::new(EncodeConfig::new(1, 1).with_chipset(Chipset::Ham))
        .with_ham_base(HamState::new(15, 15, 0))
        .planar(image, Unstoppable)
        .unwrap();
    // only blue differs from the base
    assert_eq!(bitmap.pixel_value(0, 0), 0b01_1111);
}

#[test]
fn ham_accepts_every_layout() {
    let rgb = [10u8, 200, 30, 250, 250, 250];
    let expected = {
        let image = TrueColorImage::new(&rgb, 2, 1, PixelLayout::Rgb8).unwrap();
        EncodeRequest::new(EncodeConfig::new(2, 1).with_chipset(Chipset::Ham))
            .planar(image, Unstoppable)
            .unwrap()
    };
    let variants: [(PixelLayout, Vec<u8>); 4] = [
        (PixelLayout::Rgba8, vec![10, 200, 30, 255, 250, 250, 250, 0]),
        (PixelLayout::Bgr8, vec![30, 200, 10, 250, 250, 250]),
        (PixelLayout::Bgra8, vec![30, 200, 10, 9, 250, 250, 250, 9]),
        (PixelLayout::Bgrx8, vec![30, 200, 10, 0, 250, 250, 250, 0]),
    ];
    for (layout, pixels) in variants {
        let image = TrueColorImage::new(&pixels, 2, 1, layout).unwrap();
        let bitmap = EncodeRequest::new(EncodeConfig::new(2, 1).with_chipset(Chipset::Ham))
            .planar(image, Unstoppable)
            .unwrap();
        assert_eq!(bitmap, expected, "{layout:?}");
    }
}

// ── Limits and cancellation ─────────────────────────────────────────

#[test]
fn limits_max_width() {
    let pixels = vec![0u8; 100];
    let image = IndexedImage::new(&pixels, 100, 1).unwrap();
    let limits = Limits {
        max_width: Some(64),
        ..Default::default()
    };
    let result = EncodeRequest::new(EncodeConfig::new(100, 1))
        .with_limits(&limits)
        .encode(image, &[], Unstoppable);
    assert!(matches!(result, Err(IlbmError::LimitExceeded(_))));
}

#[test]
fn limits_max_pixels() {
    let pixels = vec![0u8; 64 * 64];
    let image = IndexedImage::new(&pixels, 64, 64).unwrap();
    let limits = Limits {
        max_pixels: Some(1000),
        ..Default::default()
    };
    let result = EncodeRequest::new(EncodeConfig::new(64, 64))
        .with_limits(&limits)
        .encode(image, &[], Unstoppable);
    assert!(matches!(result, Err(IlbmError::LimitExceeded(_))));
}

struct StopNow;

impl Stop for StopNow {
    fn check(&self) -> Result<(), enough::StopReason> {
        Err(enough::StopReason::Cancelled)
    }
}

#[test]
fn cancellation_is_reported() {
    let pixels = vec![0u8; 16 * 16];
    let image = IndexedImage::new(&pixels, 16, 16).unwrap();
    let result = EncodeRequest::new(EncodeConfig::new(16, 16)).encode(image, &[], StopNow);
    assert!(matches!(result, Err(IlbmError::Cancelled(_))));
}
