use alloc::string::String;
use enough::StopReason;

use crate::config::Chipset;

/// Errors from ILBM encoding, ByteRun1 decoding and IFF probing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum IlbmError {
    #[error("palette size {0} is not a power of two in 2..=256")]
    InvalidPaletteSize(usize),

    #[error("unsupported chipset: {0} (supported: ECS, HAM)")]
    UnsupportedChipset(String),

    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("raster is {actual_width}x{actual_height}, configured for {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("pixel ({x}, {y}) uses index {index}, palette has {palette_size} entries")]
    PaletteIndexOutOfRange {
        index: u8,
        x: u32,
        y: u32,
        palette_size: usize,
    },

    #[error("{raster} raster cannot be encoded with chipset {chipset}")]
    ModeMismatch {
        raster: &'static str,
        chipset: Chipset,
    },

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[cfg(feature = "std")]
    #[error("I/O failure while {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for IlbmError {
    fn from(r: StopReason) -> Self {
        IlbmError::Cancelled(r)
    }
}

#[cfg(feature = "std")]
impl IlbmError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        IlbmError::Io {
            context: context.into(),
            source,
        }
    }
}
