//! Explicit encoder configuration, validated once before encoding.

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use crate::error::IlbmError;
use crate::palette::bitplane_count;

/// Amiga display hardware the output targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Chipset {
    /// OCS/ECS indexed color, up to 256 palette entries (8 bitplanes).
    #[default]
    Ecs,
    /// ECS Hold-And-Modify (HAM6), 6 bitplanes.
    Ham,
    /// AGA. Recognized so it can be rejected with a clear error.
    Aga,
}

impl Chipset {
    /// Map the legacy boolean HAM switch onto a chipset.
    pub fn from_ham_flag(ham: bool) -> Self {
        if ham { Self::Ham } else { Self::Ecs }
    }
}

impl fmt::Display for Chipset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ecs => "ECS",
            Self::Ham => "HAM",
            Self::Aga => "AGA",
        })
    }
}

impl FromStr for Chipset {
    type Err = IlbmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ECS" | "OCS" => Ok(Self::Ecs),
            "HAM" | "HAM6" => Ok(Self::Ham),
            "AGA" => Ok(Self::Aga),
            _ => Err(IlbmError::UnsupportedChipset(String::from(s))),
        }
    }
}

/// How pixels are turned into bitplanes, decided once per encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodingMode {
    /// Palette indices spread over `bitplanes` planes.
    Indexed { bitplanes: u8 },
    /// HAM6 control codes in 6 planes.
    Ham,
}

impl EncodingMode {
    pub const HAM_BITPLANES: u8 = 6;

    pub fn bitplanes(&self) -> u8 {
        match self {
            Self::Indexed { bitplanes } => *bitplanes,
            Self::Ham => Self::HAM_BITPLANES,
        }
    }

    pub fn is_ham(&self) -> bool {
        matches!(self, Self::Ham)
    }
}

/// BMHD pixel aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aspect {
    pub x: u8,
    pub y: u8,
}

impl Aspect {
    /// Square pixels. Written by default.
    pub const SQUARE: Aspect = Aspect { x: 1, y: 1 };
    /// 320x200 low-res NTSC pixel shape.
    pub const LORES_NTSC: Aspect = Aspect { x: 10, y: 11 };
}

impl Default for Aspect {
    fn default() -> Self {
        Self::SQUARE
    }
}

/// Recognized conversion options.
///
/// `width`/`height` are the target size the raster was resized to, and
/// `dither` is forwarded to the quantizer; the encoder only records it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    /// Indexed palette size. Ignored in HAM mode (always 16 CMAP entries).
    pub palette_size: usize,
    pub dither: bool,
    /// ByteRun1-compress BODY rows.
    pub compress: bool,
    pub chipset: Chipset,
}

impl EncodeConfig {
    /// Historical defaults: 32 colors, dithering and compression on, ECS.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            palette_size: 32,
            dither: true,
            compress: true,
            chipset: Chipset::Ecs,
        }
    }

    pub fn with_palette_size(mut self, palette_size: usize) -> Self {
        self.palette_size = palette_size;
        self
    }

    pub fn with_dither(mut self, dither: bool) -> Self {
        self.dither = dither;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_chipset(mut self, chipset: Chipset) -> Self {
        self.chipset = chipset;
        self
    }

    /// Check every field and pick the encoding mode.
    pub fn validate(&self) -> Result<EncodingMode, IlbmError> {
        if self.width == 0 || self.height == 0 {
            return Err(IlbmError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(IlbmError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        match self.chipset {
            Chipset::Ecs => Ok(EncodingMode::Indexed {
                bitplanes: bitplane_count(self.palette_size)?,
            }),
            Chipset::Ham => Ok(EncodingMode::Ham),
            Chipset::Aga => Err(IlbmError::UnsupportedChipset(self.chipset.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chipset_names() {
        assert_eq!("ecs".parse::<Chipset>().unwrap(), Chipset::Ecs);
        assert_eq!(" HAM ".parse::<Chipset>().unwrap(), Chipset::Ham);
        assert_eq!("AGA".parse::<Chipset>().unwrap(), Chipset::Aga);
        match "SVGA".parse::<Chipset>() {
            Err(IlbmError::UnsupportedChipset(name)) => assert_eq!(name, "SVGA"),
            other => panic!("expected UnsupportedChipset, got {other:?}"),
        }
    }

    #[test]
    fn ham_flag_maps_to_chipset() {
        assert_eq!(Chipset::from_ham_flag(true), Chipset::Ham);
        assert_eq!(Chipset::from_ham_flag(false), Chipset::Ecs);
    }

    #[test]
    fn defaults_select_five_planes() {
        let mode = EncodeConfig::new(320, 256).validate().unwrap();
        assert_eq!(mode, EncodingMode::Indexed { bitplanes: 5 });
        assert_eq!(mode.bitplanes(), 5);
    }

    #[test]
    fn ham_ignores_palette_size() {
        let mode = EncodeConfig::new(320, 200)
            .with_palette_size(3)
            .with_chipset(Chipset::Ham)
            .validate()
            .unwrap();
        assert_eq!(mode, EncodingMode::Ham);
        assert_eq!(mode.bitplanes(), 6);
    }

    #[test]
    fn rejects_aga_with_name() {
        let err = EncodeConfig::new(320, 200)
            .with_chipset(Chipset::Aga)
            .validate()
            .unwrap_err();
        assert!(matches!(err, IlbmError::UnsupportedChipset(ref s) if s == "AGA"));
    }

    #[test]
    fn rejects_bad_palette_and_dimensions() {
        assert!(matches!(
            EncodeConfig::new(8, 8).with_palette_size(24).validate(),
            Err(IlbmError::InvalidPaletteSize(24))
        ));
        assert!(matches!(
            EncodeConfig::new(0, 8).validate(),
            Err(IlbmError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            EncodeConfig::new(70_000, 8).validate(),
            Err(IlbmError::DimensionsTooLarge { .. })
        ));
    }
}
