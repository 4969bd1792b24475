//! Planar bitmaps: chunky pixels spread over interleaved bitplanes.
//!
//! Bit `p` of a pixel's value lives in plane `p`, at byte `x / 8`, bit
//! `7 - x % 8` of that plane's row. Rows are padded to a 16-bit word.

pub mod ham;
pub mod indexed;

use alloc::vec;
use alloc::vec::Vec;
use enough::Stop;

use crate::error::IlbmError;

/// Bytes per plane row: `ceil(width / 8)` rounded up to an even count.
#[inline]
pub fn row_bytes(width: u32) -> usize {
    (width as usize).div_ceil(16) * 2
}

/// Source of interleaved planar rows, produced one scanline at a time.
///
/// `fill_row` writes all planes of row `y` into `out`, which is
/// `planes() * row_bytes()` bytes long: plane 0 first, then plane 1, ...
pub trait PlaneRows {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn planes(&self) -> u8;

    fn row_bytes(&self) -> usize {
        row_bytes(self.width())
    }

    fn fill_row(&mut self, y: u32, out: &mut [u8]) -> Result<(), IlbmError>;
}

/// A complete planar image in one contiguous buffer.
///
/// Storage order is row-major, plane-minor, the same order as an
/// uncompressed ILBM BODY.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanarBitmap {
    width: u32,
    height: u32,
    planes: u8,
    row_bytes: usize,
    data: Vec<u8>,
}

impl PlanarBitmap {
    /// Zero-filled bitmap.
    pub fn new(width: u32, height: u32, planes: u8) -> Result<Self, IlbmError> {
        let len = Self::byte_len(width, height, planes)?;
        Ok(Self {
            width,
            height,
            planes,
            row_bytes: row_bytes(width),
            data: vec![0u8; len],
        })
    }

    /// Wrap interleaved plane data, e.g. an uncompressed BODY.
    pub fn from_interleaved(
        width: u32,
        height: u32,
        planes: u8,
        data: Vec<u8>,
    ) -> Result<Self, IlbmError> {
        let needed = Self::byte_len(width, height, planes)?;
        if data.len() != needed {
            return Err(IlbmError::BufferTooSmall {
                needed,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            planes,
            row_bytes: row_bytes(width),
            data,
        })
    }

    /// Drain a row source into a bitmap.
    pub fn collect<R: PlaneRows + ?Sized>(rows: &mut R, stop: &dyn Stop) -> Result<Self, IlbmError> {
        let mut bitmap = Self::new(rows.width(), rows.height(), rows.planes())?;
        let stride = bitmap.interleaved_row_len();
        for (y, chunk) in bitmap.data.chunks_exact_mut(stride).enumerate() {
            if y % 16 == 0 {
                stop.check()?;
            }
            rows.fill_row(y as u32, chunk)?;
        }
        Ok(bitmap)
    }

    pub(crate) fn byte_len(width: u32, height: u32, planes: u8) -> Result<usize, IlbmError> {
        if width == 0 || height == 0 {
            return Err(IlbmError::InvalidDimensions { width, height });
        }
        if !(1..=8).contains(&planes) {
            return Err(IlbmError::InvalidData(alloc::format!(
                "{planes} bitplanes (expected 1..=8)"
            )));
        }
        row_bytes(width)
            .checked_mul(usize::from(planes))
            .and_then(|n| n.checked_mul(height as usize))
            .ok_or(IlbmError::DimensionsTooLarge { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn planes(&self) -> u8 {
        self.planes
    }

    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    /// Bytes for all planes of one row.
    pub fn interleaved_row_len(&self) -> usize {
        self.row_bytes * usize::from(self.planes)
    }

    #[inline]
    fn offset(&self, plane: u8, y: u32) -> usize {
        (y as usize * usize::from(self.planes) + usize::from(plane)) * self.row_bytes
    }

    /// One plane's bytes for row `y`.
    pub fn plane_row(&self, plane: u8, y: u32) -> &[u8] {
        let start = self.offset(plane, y);
        &self.data[start..start + self.row_bytes]
    }

    pub fn plane_row_mut(&mut self, plane: u8, y: u32) -> &mut [u8] {
        let start = self.offset(plane, y);
        let end = start + self.row_bytes;
        &mut self.data[start..end]
    }

    /// All planes of row `y`, plane 0 first.
    pub fn interleaved_row(&self, y: u32) -> &[u8] {
        let start = self.offset(0, y);
        &self.data[start..start + self.interleaved_row_len()]
    }

    /// Reassemble the chunky value of pixel `(x, y)` from its plane bits.
    pub fn pixel_value(&self, x: u32, y: u32) -> u8 {
        (0..self.planes).fold(0u8, |acc, plane| {
            let byte = self.plane_row(plane, y)[x as usize / 8];
            let bit = (byte >> (7 - x % 8)) & 1;
            acc | (bit << plane)
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl PlaneRows for PlanarBitmap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn planes(&self) -> u8 {
        self.planes
    }

    fn fill_row(&mut self, y: u32, out: &mut [u8]) -> Result<(), IlbmError> {
        out.copy_from_slice(self.interleaved_row(y));
        Ok(())
    }
}

/// Spread chunky `values` over one interleaved row of `planes` planes.
///
/// `out` must be `planes * row_bytes` long; it is cleared first so pad bits
/// past the last pixel stay zero.
pub(crate) fn pack_row<I>(values: I, planes: u8, out: &mut [u8])
where
    I: IntoIterator<Item = u8>,
{
    out.fill(0);
    let row_bytes = out.len() / usize::from(planes.max(1));
    for (x, value) in values.into_iter().enumerate() {
        let byte = x / 8;
        let mask = 0x80u8 >> (x % 8);
        let mut bits = value;
        let mut plane = 0usize;
        while bits != 0 && plane < usize::from(planes) {
            if bits & 1 != 0 {
                out[plane * row_bytes + byte] |= mask;
            }
            bits >>= 1;
            plane += 1;
        }
    }
}
