use alloc::vec::Vec;
use enough::Stop;
use log::debug;
use rgb::RGB8;

use crate::byterun1::RleMode;
use crate::config::{Aspect, EncodeConfig, EncodingMode};
use crate::error::IlbmError;
use crate::iff::ChunkSink;
use crate::iff::ilbm::{BitmapHeader, IlbmSummary, WriteOptions, write_ilbm};
use crate::limits::Limits;
use crate::palette::Palette;
use crate::planar::ham::{HamRows, HamState};
use crate::planar::indexed::IndexedRows;
use crate::planar::{PlanarBitmap, row_bytes};
use crate::raster::RasterImage;

/// Largest CMAP plus the fixed FORM/BMHD/CAMG/CMAP/BODY framing.
const MAX_HEADER_BYTES: usize = 12 + (8 + BitmapHeader::SIZE) + (8 + 4) + (8 + 256 * 3) + 8;

/// Builder for an ILBM encode.
///
/// The [`EncodeConfig`] is validated once per call; everything after that
/// dispatches on the resulting [`EncodingMode`].
#[derive(Clone, Debug)]
pub struct EncodeRequest<'a> {
    config: EncodeConfig,
    limits: Option<&'a Limits>,
    aspect: Aspect,
    rle_mode: RleMode,
    black_first: bool,
    ham_base: HamState,
}

impl<'a> EncodeRequest<'a> {
    pub fn new(config: EncodeConfig) -> Self {
        Self {
            config,
            limits: None,
            aspect: Aspect::default(),
            rle_mode: RleMode::default(),
            black_first: false,
            ham_base: HamState::BLACK,
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// BMHD pixel aspect. Defaults to [`Aspect::SQUARE`].
    pub fn with_aspect(mut self, aspect: Aspect) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn with_rle_mode(mut self, rle_mode: RleMode) -> Self {
        self.rle_mode = rle_mode;
        self
    }

    /// Force palette entry 0 to black before writing the CMAP.
    pub fn with_black_first(mut self, black_first: bool) -> Self {
        self.black_first = black_first;
        self
    }

    /// Color every HAM scanline starts from. Defaults to black.
    pub fn with_ham_base(mut self, base: HamState) -> Self {
        self.ham_base = base;
        self
    }

    pub fn config(&self) -> &EncodeConfig {
        &self.config
    }

    /// Encode to an in-memory ILBM file.
    pub fn encode<'r>(
        &self,
        raster: impl Into<RasterImage<'r>>,
        palette: &[RGB8],
        stop: impl Stop,
    ) -> Result<Vec<u8>, IlbmError> {
        let raster = raster.into();
        let mode = self.config.validate()?;
        let body_max = PlanarBitmap::byte_len(raster.width(), raster.height(), mode.bitplanes())?;
        let capacity = body_max
            .checked_add(MAX_HEADER_BYTES)
            .ok_or(IlbmError::DimensionsTooLarge {
                width: raster.width(),
                height: raster.height(),
            })?;
        if let Some(limits) = self.limits {
            limits.check_memory(capacity)?;
        }
        // ByteRun1 output is usually smaller; don't reserve the worst case
        let mut out = Vec::with_capacity(if self.config.compress {
            capacity / 2
        } else {
            capacity
        });
        self.write_to(&mut out, raster, palette, stop)?;
        Ok(out)
    }

    /// Encode into any [`ChunkSink`], one scanline at a time.
    pub fn write_to<'r, S: ChunkSink + ?Sized>(
        &self,
        sink: &mut S,
        raster: impl Into<RasterImage<'r>>,
        palette: &[RGB8],
        stop: impl Stop,
    ) -> Result<IlbmSummary, IlbmError> {
        let raster = raster.into();
        let mode = self.config.validate()?;
        self.check_raster(&raster, mode)?;
        stop.check()?;

        debug!(
            "encoding {}x{} {} raster: chipset {}, {} bitplanes, dither hint {}, compression {}",
            raster.width(),
            raster.height(),
            raster.kind(),
            self.config.chipset,
            mode.bitplanes(),
            self.config.dither,
            self.config.compress,
        );

        let options = WriteOptions {
            compress: self.config.compress,
            rle_mode: self.rle_mode,
            aspect: self.aspect,
        };

        match (mode, raster) {
            (EncodingMode::Indexed { bitplanes }, RasterImage::Indexed(img)) => {
                let palette = self.palette(Palette::indexed(palette, self.config.palette_size)?);
                let mut rows = IndexedRows::new(img, bitplanes)?;
                write_ilbm(sink, mode, &mut rows, &palette, &options, &stop)
            }
            (EncodingMode::Ham, RasterImage::TrueColor(img)) => {
                let palette = self.palette(Palette::ham(palette));
                let mut rows = HamRows::new(img, self.ham_base);
                write_ilbm(sink, mode, &mut rows, &palette, &options, &stop)
            }
            (_, raster) => Err(IlbmError::ModeMismatch {
                raster: raster.kind(),
                chipset: self.config.chipset,
            }),
        }
    }

    /// Produce the planar bitmap only, without the IFF container.
    pub fn planar<'r>(
        &self,
        raster: impl Into<RasterImage<'r>>,
        stop: impl Stop,
    ) -> Result<PlanarBitmap, IlbmError> {
        let raster = raster.into();
        let mode = self.config.validate()?;
        self.check_raster(&raster, mode)?;
        match (mode, raster) {
            (EncodingMode::Indexed { bitplanes }, RasterImage::Indexed(img)) => {
                PlanarBitmap::collect(&mut IndexedRows::new(img, bitplanes)?, &stop)
            }
            (EncodingMode::Ham, RasterImage::TrueColor(img)) => {
                PlanarBitmap::collect(&mut HamRows::new(img, self.ham_base), &stop)
            }
            (_, raster) => Err(IlbmError::ModeMismatch {
                raster: raster.kind(),
                chipset: self.config.chipset,
            }),
        }
    }

    fn palette(&self, mut palette: Palette) -> Palette {
        if self.black_first {
            palette.force_black_first();
        }
        palette
    }

    fn check_raster(&self, raster: &RasterImage<'_>, mode: EncodingMode) -> Result<(), IlbmError> {
        let (width, height) = (raster.width(), raster.height());
        if width != self.config.width || height != self.config.height {
            return Err(IlbmError::DimensionMismatch {
                width: self.config.width,
                height: self.config.height,
                actual_width: width,
                actual_height: height,
            });
        }
        if let Some(limits) = self.limits {
            limits.check(width, height)?;
            limits.check_memory(row_bytes(width) * usize::from(mode.bitplanes()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Chipset;
    use crate::pixel::PixelLayout;
    use crate::raster::{IndexedImage, TrueColorImage};
    use alloc::vec;
    use enough::Unstoppable;

    #[test]
    fn rejects_true_color_for_ecs() {
        let pixels = [0u8; 6];
        let img = TrueColorImage::new(&pixels, 2, 1, PixelLayout::Rgb8).unwrap();
        let req = EncodeRequest::new(EncodeConfig::new(2, 1));
        match req.encode(img, &[], Unstoppable) {
            Err(IlbmError::ModeMismatch { raster, chipset }) => {
                assert_eq!(raster, "true-color");
                assert_eq!(chipset, Chipset::Ecs);
            }
            other => panic!("expected ModeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_indexed_for_ham() {
        let pixels = [0u8; 2];
        let img = IndexedImage::new(&pixels, 2, 1).unwrap();
        let req = EncodeRequest::new(EncodeConfig::new(2, 1).with_chipset(Chipset::Ham));
        assert!(matches!(
            req.encode(img, &[], Unstoppable),
            Err(IlbmError::ModeMismatch { .. })
        ));
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let pixels = [0u8; 4];
        let img = IndexedImage::new(&pixels, 2, 2).unwrap();
        let req = EncodeRequest::new(EncodeConfig::new(4, 1).with_palette_size(2));
        assert!(matches!(
            req.encode(img, &[], Unstoppable),
            Err(IlbmError::DimensionMismatch {
                actual_width: 2,
                actual_height: 2,
                ..
            })
        ));
    }

    #[test]
    fn palette_size_checked_before_pixels() {
        let pixels = [0u8; 4];
        let img = IndexedImage::new(&pixels, 2, 2).unwrap();
        let req = EncodeRequest::new(EncodeConfig::new(2, 2).with_palette_size(6));
        assert!(matches!(
            req.encode(img, &[], Unstoppable),
            Err(IlbmError::InvalidPaletteSize(6))
        ));
    }

    #[test]
    fn memory_limit_applies() {
        let pixels = vec![0u8; 64 * 64];
        let img = IndexedImage::new(&pixels, 64, 64).unwrap();
        let limits = Limits {
            max_memory_bytes: Some(100),
            ..Default::default()
        };
        let req = EncodeRequest::new(EncodeConfig::new(64, 64)).with_limits(&limits);
        assert!(matches!(
            req.encode(img, &[], Unstoppable),
            Err(IlbmError::LimitExceeded(_))
        ));
    }

    #[test]
    fn planar_matches_body_order() {
        let pixels = [0u8, 1, 2, 3, 3, 2, 1, 0];
        let img = IndexedImage::new(&pixels, 4, 2).unwrap();
        let req = EncodeRequest::new(EncodeConfig::new(4, 2).with_palette_size(4));
        let bitmap = req.planar(img, Unstoppable).unwrap();
        assert_eq!(
            bitmap.as_bytes(),
            &[0x50, 0x00, 0x30, 0x00, 0xA0, 0x00, 0xC0, 0x00]
        );
    }
}
