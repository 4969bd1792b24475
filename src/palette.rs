//! Palette validation and CMAP color preparation.

use alloc::vec::Vec;
use rgb::RGB8;

use crate::error::IlbmError;
use crate::pixel::{from_nibble, to_nibble};

/// Number of CMAP entries written in HAM6 mode.
pub const HAM_PALETTE_SIZE: usize = 16;

const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// Bitplane count for an indexed palette of `size` entries.
///
/// `size` must be a power of two in `2..=256`.
pub fn bitplane_count(size: usize) -> Result<u8, IlbmError> {
    if !(2..=256).contains(&size) || !size.is_power_of_two() {
        return Err(IlbmError::InvalidPaletteSize(size));
    }
    Ok(size.trailing_zeros() as u8)
}

/// A validated color map, ready to be written as a CMAP chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<RGB8>,
}

impl Palette {
    /// Build an indexed palette of exactly `size` entries.
    ///
    /// Missing entries are black. More colors than `size` is an error.
    pub fn indexed(colors: &[RGB8], size: usize) -> Result<Self, IlbmError> {
        bitplane_count(size)?;
        if colors.len() > size {
            return Err(IlbmError::InvalidPaletteSize(colors.len()));
        }
        let mut out = Vec::with_capacity(size);
        out.extend_from_slice(colors);
        out.resize(size, BLACK);
        Ok(Self { colors: out })
    }

    /// Build the 16 base colors stored alongside HAM6 data.
    ///
    /// Longer palettes are truncated, shorter ones padded with black.
    pub fn ham(colors: &[RGB8]) -> Self {
        let mut out: Vec<RGB8> = colors.iter().copied().take(HAM_PALETTE_SIZE).collect();
        out.resize(HAM_PALETTE_SIZE, BLACK);
        Self { colors: out }
    }

    /// Overwrite entry 0 with black (the Amiga background/border color).
    pub fn force_black_first(&mut self) {
        if let Some(first) = self.colors.first_mut() {
            *first = BLACK;
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[RGB8] {
        &self.colors
    }

    /// CMAP payload: one R,G,B triple per entry, reduced to 12-bit color.
    pub fn cmap_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.colors.len() * 3);
        for c in &self.colors {
            out.push(from_nibble(to_nibble(c.r)));
            out.push(from_nibble(to_nibble(c.g)));
            out.push(from_nibble(to_nibble(c.b)));
        }
        out
    }
}
