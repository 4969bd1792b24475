//! Chunky palette indices to bitplanes.

use enough::Stop;

use super::{PlanarBitmap, PlaneRows, pack_row};
use crate::error::IlbmError;
use crate::raster::IndexedImage;

/// Streams the planar rows of an indexed image.
pub struct IndexedRows<'a> {
    image: IndexedImage<'a>,
    planes: u8,
}

impl<'a> IndexedRows<'a> {
    /// `planes` must be in `1..=8`.
    pub fn new(image: IndexedImage<'a>, planes: u8) -> Result<Self, IlbmError> {
        if !(1..=8).contains(&planes) {
            return Err(IlbmError::InvalidPaletteSize(1usize << planes.min(16)));
        }
        Ok(Self { image, planes })
    }

    fn palette_size(&self) -> usize {
        1usize << self.planes
    }
}

impl PlaneRows for IndexedRows<'_> {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn planes(&self) -> u8 {
        self.planes
    }

    fn fill_row(&mut self, y: u32, out: &mut [u8]) -> Result<(), IlbmError> {
        let row = self.image.row(y);
        let palette_size = self.palette_size();
        if let Some(x) = row.iter().position(|&i| usize::from(i) >= palette_size) {
            return Err(IlbmError::PaletteIndexOutOfRange {
                index: row[x],
                x: x as u32,
                y,
                palette_size,
            });
        }
        pack_row(row.iter().copied(), self.planes, out);
        Ok(())
    }
}

/// Convert a whole indexed image to `planes` bitplanes.
pub fn encode(image: IndexedImage<'_>, planes: u8, stop: &dyn Stop) -> Result<PlanarBitmap, IlbmError> {
    let mut rows = IndexedRows::new(image, planes)?;
    PlanarBitmap::collect(&mut rows, stop)
}
