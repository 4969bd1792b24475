//! Borrowed input rasters: palette indices or true color.

use rgb::RGB8;

use crate::error::IlbmError;
use crate::pixel::PixelLayout;

/// One palette index per pixel, rows `stride` bytes apart.
#[derive(Clone, Copy, Debug)]
pub struct IndexedImage<'a> {
    pixels: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> IndexedImage<'a> {
    /// Tightly packed indices (`stride == width`).
    pub fn new(pixels: &'a [u8], width: u32, height: u32) -> Result<Self, IlbmError> {
        Self::with_stride(pixels, width, height, width as usize)
    }

    pub fn with_stride(
        pixels: &'a [u8],
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Self, IlbmError> {
        check_extent(pixels.len(), width, height, stride, 1)?;
        Ok(Self {
            pixels,
            width,
            height,
            stride,
        })
    }

    /// View an [`imgref::ImgRef`] of indices without copying.
    #[cfg(feature = "imgref")]
    pub fn from_imgref(img: imgref::ImgRef<'a, u8>) -> Result<Self, IlbmError> {
        Self::with_stride(
            img.buf(),
            img.width() as u32,
            img.height() as u32,
            img.stride(),
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The `width` indices of row `y`.
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.stride;
        &self.pixels[start..start + self.width as usize]
    }

    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        self.pixels[y as usize * self.stride + x as usize]
    }
}

/// 24-bit color pixels in any supported [`PixelLayout`].
#[derive(Clone, Copy, Debug)]
pub struct TrueColorImage<'a> {
    pixels: &'a [u8],
    width: u32,
    height: u32,
    /// Row stride in pixels.
    stride: usize,
    layout: PixelLayout,
}

impl<'a> TrueColorImage<'a> {
    pub fn new(
        pixels: &'a [u8],
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<Self, IlbmError> {
        Self::with_stride(pixels, width, height, width as usize, layout)
    }

    /// `stride` is counted in pixels, not bytes.
    pub fn with_stride(
        pixels: &'a [u8],
        width: u32,
        height: u32,
        stride: usize,
        layout: PixelLayout,
    ) -> Result<Self, IlbmError> {
        check_extent(
            pixels.len(),
            width,
            height,
            stride,
            layout.bytes_per_pixel(),
        )?;
        Ok(Self {
            pixels,
            width,
            height,
            stride,
            layout,
        })
    }

    /// View an [`imgref::ImgRef`] of RGB pixels without copying.
    #[cfg(feature = "imgref")]
    pub fn from_imgref(img: imgref::ImgRef<'a, RGB8>) -> Result<Self, IlbmError> {
        use rgb::ComponentBytes as _;
        Self::with_stride(
            img.buf().as_bytes(),
            img.width() as u32,
            img.height() as u32,
            img.stride(),
            PixelLayout::Rgb8,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn rgb_at(&self, x: u32, y: u32) -> RGB8 {
        let off = (y as usize * self.stride + x as usize) * self.layout.bytes_per_pixel();
        self.layout.rgb_at(self.pixels, off)
    }
}

/// Input to the encoder: an already-quantized raster or a true-color one.
#[derive(Clone, Copy, Debug)]
pub enum RasterImage<'a> {
    Indexed(IndexedImage<'a>),
    TrueColor(TrueColorImage<'a>),
}

impl RasterImage<'_> {
    pub fn width(&self) -> u32 {
        match self {
            Self::Indexed(img) => img.width(),
            Self::TrueColor(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Self::Indexed(img) => img.height(),
            Self::TrueColor(img) => img.height(),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Indexed(_) => "indexed",
            Self::TrueColor(_) => "true-color",
        }
    }
}

impl<'a> From<IndexedImage<'a>> for RasterImage<'a> {
    fn from(img: IndexedImage<'a>) -> Self {
        Self::Indexed(img)
    }
}

impl<'a> From<TrueColorImage<'a>> for RasterImage<'a> {
    fn from(img: TrueColorImage<'a>) -> Self {
        Self::TrueColor(img)
    }
}

/// Validate that `len` bytes cover `height` rows of `stride` pixels.
fn check_extent(
    len: usize,
    width: u32,
    height: u32,
    stride: usize,
    bpp: usize,
) -> Result<(), IlbmError> {
    if width == 0 || height == 0 || stride < width as usize {
        return Err(IlbmError::InvalidDimensions { width, height });
    }
    let needed = stride
        .checked_mul(height as usize - 1)
        .and_then(|n| n.checked_add(width as usize))
        .and_then(|n| n.checked_mul(bpp))
        .ok_or(IlbmError::DimensionsTooLarge { width, height })?;
    if len < needed {
        return Err(IlbmError::BufferTooSmall {
            needed,
            actual: len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn indexed_rows_honor_stride() {
        let pixels = vec![1, 2, 9, 3, 4, 9];
        let img = IndexedImage::with_stride(&pixels, 2, 2, 3).unwrap();
        assert_eq!(img.row(0), &[1, 2]);
        assert_eq!(img.row(1), &[3, 4]);
        assert_eq!(img.index_at(1, 1), 4);
    }

    #[test]
    fn last_row_may_be_short() {
        // stride 4, width 2: the final row needs only 2 bytes
        let pixels = vec![0u8; 4 + 2];
        assert!(IndexedImage::with_stride(&pixels, 2, 2, 4).is_ok());
    }

    #[test]
    fn rejects_short_buffer() {
        let pixels = vec![0u8; 11];
        match TrueColorImage::new(&pixels, 2, 2, PixelLayout::Rgb8) {
            Err(IlbmError::BufferTooSmall { needed, actual }) => {
                assert_eq!(needed, 12);
                assert_eq!(actual, 11);
            }
            other => panic!("expected BufferTooSmall, got {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            IndexedImage::new(&[], 0, 1),
            Err(IlbmError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn true_color_reads_layout() {
        let pixels = vec![1, 2, 3, 4, 5, 6];
        let img = TrueColorImage::new(&pixels, 2, 1, PixelLayout::Bgr8).unwrap();
        assert_eq!(img.rgb_at(1, 0), RGB8::new(6, 5, 4));
        let raster = RasterImage::from(img);
        assert_eq!(raster.width(), 2);
        assert_eq!(raster.kind(), "true-color");
    }

    #[cfg(feature = "imgref")]
    #[test]
    fn imgref_views_keep_stride() {
        use crate::planar::{self, ham::HamState};
        use enough::Unstoppable;

        // 3x2 indices in rows of 5, padding filled with an invalid index
        let indices = imgref::Img::new_stride(vec![1u8, 0, 1, 99, 99, 0, 1, 0, 99, 99], 3, 2, 5);
        let img = IndexedImage::from_imgref(indices.as_ref()).unwrap();
        assert_eq!(img.row(1), &[0, 1, 0]);
        let bitmap = planar::indexed::encode(img, 1, &Unstoppable).unwrap();
        assert_eq!(bitmap.as_bytes(), &[0xA0, 0x00, 0x40, 0x00]);

        let red = RGB8::new(255, 0, 0);
        let pad = RGB8::new(1, 2, 3);
        let pixels = imgref::Img::new_stride(vec![red, pad, red, pad], 1, 2, 2);
        let img = TrueColorImage::from_imgref(pixels.as_ref()).unwrap();
        assert_eq!(img.layout(), PixelLayout::Rgb8);
        assert_eq!(img.rgb_at(0, 1), red);
        let bitmap = planar::ham::encode(img, HamState::BLACK, &Unstoppable).unwrap();
        // modify red to 15 on both rows
        assert_eq!(bitmap.pixel_value(0, 0), 0b10_1111);
        assert_eq!(bitmap.pixel_value(0, 1), 0b10_1111);
    }
}
