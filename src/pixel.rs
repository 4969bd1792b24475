use rgb::RGB8;

/// Memory layout of a true-color raster.
///
/// Alpha and padding bytes are ignored; ILBM has no alpha channel.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// Single channel, 8-bit grayscale.
    Gray8,
    /// 3 channels, 8-bit RGB.
    Rgb8,
    /// 4 channels, 8-bit RGBA.
    Rgba8,
    /// 3 channels, 8-bit BGR.
    Bgr8,
    /// 4 channels, 8-bit BGRA.
    Bgra8,
    /// 4 channels, 8-bit BGRX (4th byte is padding).
    Bgrx8,
}

impl PixelLayout {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb8 | Self::Bgr8 => 3,
            Self::Rgba8 | Self::Bgra8 | Self::Bgrx8 => 4,
        }
    }

    /// Read the pixel starting at byte offset `off` as RGB.
    #[inline]
    pub(crate) fn rgb_at(&self, pixels: &[u8], off: usize) -> RGB8 {
        match self {
            Self::Gray8 => {
                let g = pixels[off];
                RGB8::new(g, g, g)
            }
            Self::Rgb8 | Self::Rgba8 => RGB8::new(pixels[off], pixels[off + 1], pixels[off + 2]),
            Self::Bgr8 | Self::Bgra8 | Self::Bgrx8 => {
                RGB8::new(pixels[off + 2], pixels[off + 1], pixels[off])
            }
        }
    }
}

/// Reduce an 8-bit channel to the 4-bit OCS/ECS range.
#[inline]
pub(crate) fn to_nibble(channel: u8) -> u8 {
    (channel >> 4).min(15)
}

/// Expand a 4-bit channel back to 8 bits (`0xF` becomes `0xFF`).
#[inline]
pub(crate) fn from_nibble(nibble: u8) -> u8 {
    nibble * 17
}
