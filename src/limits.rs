use alloc::format;

use crate::error::IlbmError;

/// Caller-imposed bounds on an encode or a BODY decode.
///
/// Every field defaults to `None`. Width and height are additionally capped
/// at 65535 by the BMHD format, whatever is set here.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// `width * height`.
    pub max_pixels: Option<u64>,
    /// Bound on the row buffers, the in-memory output and decoded bitplanes.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), IlbmError> {
        let pixels = u64::from(width) * u64::from(height);
        exceeds("width", u64::from(width), self.max_width)?;
        exceeds("height", u64::from(height), self.max_height)?;
        exceeds("pixel count", pixels, self.max_pixels)
    }

    pub(crate) fn check_memory(&self, bytes: usize) -> Result<(), IlbmError> {
        exceeds("buffer size", bytes as u64, self.max_memory_bytes)
    }
}

fn exceeds(what: &str, value: u64, limit: Option<u64>) -> Result<(), IlbmError> {
    match limit {
        Some(max) if value > max => Err(IlbmError::LimitExceeded(format!(
            "{what} {value} exceeds limit {max}"
        ))),
        _ => Ok(()),
    }
}
