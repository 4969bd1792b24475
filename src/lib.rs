//! # zenilbm
//!
//! Amiga IFF ILBM encoder: planar bitmaps, HAM6 and ByteRun1 compression.
//!
//! The input is a raster that has already been resized (and, for indexed
//! output, quantized) to the target size. The crate turns it into
//! interleaved bitplanes and wraps them in a `FORM ILBM` container with
//! `BMHD`, optional `CAMG`, `CMAP` and `BODY` chunks.
//!
//! ## Modes
//!
//! - **Indexed** (OCS/ECS): palette indices in 1 to 8 bitplanes, one plane
//!   per bit of the palette size.
//! - **HAM6**: true-color pixels turned into Hold-And-Modify control codes
//!   against a 16-entry base palette, always 6 bitplanes with `CAMG = 0x800`.
//!
//! AGA (HAM8, 24-bit palettes) is not supported and is rejected with
//! [`IlbmError::UnsupportedChipset`].
//!
//! ## Streaming
//!
//! BODY rows are produced one scanline at a time through [`PlaneRows`], so
//! encoding to a [`SeekSink`] or a file never holds the whole planar image
//! in memory. Chunk lengths are back-patched once each chunk is complete.
//!
//! ## Non-Goals
//!
//! - Quantization, resizing and dithering (bring an indexed raster)
//! - Decoding to chunky pixels; [`IlbmFile`] only reads planes back
//! - Masks, transparency, animation (ANIM) and EHB
//!
//! ## Usage
//!
//! ```
//! use zenilbm::{EncodeConfig, EncodeRequest, IndexedImage, IlbmInfo, Unstoppable};
//! use rgb::RGB8;
//!
//! let indices = [0u8, 1, 2, 3, 3, 2, 1, 0];
//! let palette = [
//!     RGB8::new(0, 0, 0),
//!     RGB8::new(255, 0, 0),
//!     RGB8::new(0, 255, 0),
//!     RGB8::new(0, 0, 255),
//! ];
//! let image = IndexedImage::new(&indices, 4, 2)?;
//! let config = EncodeConfig::new(4, 2)
//!     .with_palette_size(4)
//!     .with_compression(false);
//!
//! let ilbm = EncodeRequest::new(config).encode(image, &palette, Unstoppable)?;
//! assert_eq!(ilbm.len(), 76);
//!
//! let info = IlbmInfo::from_bytes(&ilbm)?;
//! assert_eq!((info.width, info.height, info.planes), (4, 2, 2));
//! # Ok::<(), zenilbm::IlbmError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod config;
mod encode;
mod error;
mod limits;
mod palette;
mod pixel;
mod raster;

pub mod byterun1;
pub mod iff;
pub mod planar;

#[cfg(feature = "std")]
mod io;

use alloc::vec::Vec;

// Re-exports
pub use byterun1::RleMode;
pub use config::{Aspect, Chipset, EncodeConfig, EncodingMode};
pub use encode::EncodeRequest;
pub use enough::{Stop, Unstoppable};
pub use error::IlbmError;
pub use iff::ChunkSink;
pub use iff::ilbm::{BitmapHeader, IlbmSummary, WriteOptions};
pub use iff::read::{IlbmFile, IlbmInfo};
#[cfg(feature = "std")]
pub use io::SeekSink;
pub use limits::Limits;
pub use palette::{HAM_PALETTE_SIZE, Palette, bitplane_count};
pub use pixel::PixelLayout;
pub use planar::ham::HamState;
pub use planar::{PlanarBitmap, PlaneRows, row_bytes};
pub use raster::{IndexedImage, RasterImage, TrueColorImage};
pub use rgb::RGB8;

/// Encode tightly packed palette indices as an indexed ILBM.
///
/// `palette_size` must be a power of two in 2..=256; `palette` is padded
/// with black up to that size.
pub fn encode_indexed(
    indices: &[u8],
    width: u32,
    height: u32,
    palette: &[RGB8],
    palette_size: usize,
    compress: bool,
    stop: impl Stop,
) -> Result<Vec<u8>, IlbmError> {
    let image = IndexedImage::new(indices, width, height)?;
    let config = EncodeConfig::new(width, height)
        .with_palette_size(palette_size)
        .with_compression(compress);
    EncodeRequest::new(config).encode(image, palette, stop)
}

/// Encode true-color pixels as a HAM6 ILBM against a 16-color base palette.
pub fn encode_ham(
    pixels: &[u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
    base_palette: &[RGB8],
    compress: bool,
    stop: impl Stop,
) -> Result<Vec<u8>, IlbmError> {
    let image = TrueColorImage::new(pixels, width, height, layout)?;
    let config = EncodeConfig::new(width, height)
        .with_chipset(Chipset::Ham)
        .with_compression(compress);
    EncodeRequest::new(config).encode(image, base_palette, stop)
}
