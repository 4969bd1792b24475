//! Hold-And-Modify (HAM6) delta encoding.
//!
//! Every pixel modifies one 4-bit channel of the color held from the pixel
//! to its left. The 6-bit control value is `01bbbb` (blue), `10rrrr` (red)
//! or `11gggg` (green); palette lookups (`00iiii`) are never emitted.

use enough::Stop;
use rgb::RGB8;

use super::{PlanarBitmap, PlaneRows, pack_row};
use crate::config::EncodingMode;
use crate::error::IlbmError;
use crate::pixel::to_nibble;
use crate::raster::TrueColorImage;

const MODIFY_BLUE: u8 = 0b01_0000;
const MODIFY_RED: u8 = 0b10_0000;
const MODIFY_GREEN: u8 = 0b11_0000;

/// Running 4-bit color held across one scanline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HamState {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HamState {
    pub const BLACK: HamState = HamState { r: 0, g: 0, b: 0 };

    /// Build from nibbles; values above 15 are clamped.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r.min(15),
            g: g.min(15),
            b: b.min(15),
        }
    }

    /// Emit the control value for `pixel` and update the held color.
    ///
    /// The channel with the largest difference is modified; ties go to red,
    /// then green.
    pub fn encode_pixel(&mut self, pixel: RGB8) -> u8 {
        let r = to_nibble(pixel.r);
        let g = to_nibble(pixel.g);
        let b = to_nibble(pixel.b);
        let dr = r.abs_diff(self.r);
        let dg = g.abs_diff(self.g);
        let db = b.abs_diff(self.b);

        if dr >= dg && dr >= db {
            self.r = r;
            MODIFY_RED | r
        } else if dg >= db {
            self.g = g;
            MODIFY_GREEN | g
        } else {
            self.b = b;
            MODIFY_BLUE | b
        }
    }
}

/// Streams HAM6 planar rows from a true-color image.
pub struct HamRows<'a> {
    image: TrueColorImage<'a>,
    base: HamState,
}

impl<'a> HamRows<'a> {
    /// Every row starts from `base`.
    pub fn new(image: TrueColorImage<'a>, base: HamState) -> Self {
        Self { image, base }
    }
}

impl PlaneRows for HamRows<'_> {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn planes(&self) -> u8 {
        EncodingMode::HAM_BITPLANES
    }

    fn fill_row(&mut self, y: u32, out: &mut [u8]) -> Result<(), IlbmError> {
        let mut state = self.base;
        let image = &self.image;
        let codes = (0..image.width()).map(|x| state.encode_pixel(image.rgb_at(x, y)));
        pack_row(codes, EncodingMode::HAM_BITPLANES, out);
        Ok(())
    }
}

/// Convert a whole true-color image to HAM6 bitplanes.
pub fn encode(
    image: TrueColorImage<'_>,
    base: HamState,
    stop: &dyn Stop,
) -> Result<PlanarBitmap, IlbmError> {
    PlanarBitmap::collect(&mut HamRows::new(image, base), stop)
}
