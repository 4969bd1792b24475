//! Reading FORM ILBM files back: chunk walk, header probe, BODY decode.

use alloc::format;
use alloc::vec::Vec;
use rgb::RGB8;

use super::ilbm::{BitmapHeader, CAMG_HAM, COMPRESSION_BYTERUN1, COMPRESSION_NONE, MASKING_NONE};
use super::{BMHD, BODY, CAMG, CMAP, FORM, ILBM};
use crate::byterun1;
use crate::error::IlbmError;
use crate::limits::Limits;
use crate::planar::{PlanarBitmap, row_bytes};

/// Most bytes one ByteRun1 input byte can expand to: a 2-byte repeat block
/// yields 128.
const MAX_EXPANSION: usize = 64;

/// Parsed FORM ILBM, borrowing the BODY from the input.
#[derive(Clone, Debug)]
pub struct IlbmFile<'a> {
    pub header: BitmapHeader,
    pub camg: Option<u32>,
    pub cmap: Vec<RGB8>,
    /// The FORM length field.
    pub form_len: u32,
    body: Option<&'a [u8]>,
}

impl<'a> IlbmFile<'a> {
    /// Walk the chunks of `data`. Unknown chunks are skipped.
    pub fn parse(data: &'a [u8]) -> Result<Self, IlbmError> {
        if data.len() < 12 {
            return Err(IlbmError::UnexpectedEof);
        }
        if data[0..4] != FORM || data[8..12] != ILBM {
            return Err(IlbmError::InvalidData(format!(
                "not a FORM ILBM: {:?} / {:?}",
                &data[0..4],
                &data[8..12]
            )));
        }
        let form_len = read_u32(data, 4)?;
        let end = usize::try_from(form_len)
            .ok()
            .and_then(|n| n.checked_add(8))
            .filter(|&end| end <= data.len())
            .ok_or(IlbmError::UnexpectedEof)?;

        let mut header = None;
        let mut camg = None;
        let mut cmap = Vec::new();
        let mut body = None;

        let mut pos = 12;
        while pos + 8 <= end {
            let tag = &data[pos..pos + 4];
            let len = read_u32(data, pos + 4)? as usize;
            let payload = data
                .get(pos + 8..pos + 8 + len)
                .filter(|_| pos + 8 + len <= end)
                .ok_or(IlbmError::UnexpectedEof)?;
            match tag {
                t if t == BMHD => header = Some(BitmapHeader::parse(payload)?),
                t if t == CAMG => camg = Some(read_u32(payload, 0)?),
                t if t == CMAP => {
                    cmap = payload
                        .chunks_exact(3)
                        .map(|c| RGB8::new(c[0], c[1], c[2]))
                        .collect();
                }
                t if t == BODY => body = Some(payload),
                _ => {}
            }
            pos += 8 + len + (len & 1);
        }

        let header =
            header.ok_or_else(|| IlbmError::InvalidData("BMHD chunk missing".into()))?;
        Ok(Self {
            header,
            camg,
            cmap,
            form_len,
            body,
        })
    }

    pub fn is_ham(&self) -> bool {
        self.camg.is_some_and(|flags| flags & CAMG_HAM != 0)
    }

    /// Raw BODY payload (still compressed if the BMHD says so).
    pub fn body(&self) -> Option<&'a [u8]> {
        self.body
    }

    /// Decode the BODY into bitplanes.
    pub fn planar(&self) -> Result<PlanarBitmap, IlbmError> {
        self.planar_with_limits(None)
    }

    /// [`planar`](Self::planar), checking the BMHD against `limits` before
    /// anything is allocated.
    pub fn planar_with_limits(&self, limits: Option<&Limits>) -> Result<PlanarBitmap, IlbmError> {
        let h = &self.header;
        let body = self
            .body
            .ok_or_else(|| IlbmError::InvalidData("BODY chunk missing".into()))?;
        if h.masking != MASKING_NONE {
            return Err(IlbmError::InvalidData(format!(
                "masking type {} is not supported",
                h.masking
            )));
        }
        let (width, height) = (u32::from(h.width), u32::from(h.height));
        let needed = PlanarBitmap::byte_len(width, height, h.planes)?;
        if let Some(limits) = limits {
            limits.check(width, height)?;
            limits.check_memory(needed)?;
        }

        let data = match h.compression {
            COMPRESSION_NONE => body.get(..needed).ok_or(IlbmError::UnexpectedEof)?.to_vec(),
            COMPRESSION_BYTERUN1 => {
                if needed > body.len().saturating_mul(MAX_EXPANSION) {
                    return Err(IlbmError::InvalidData(format!(
                        "{}-byte ByteRun1 BODY cannot hold {width}x{height}x{} planes",
                        body.len(),
                        h.planes
                    )));
                }
                let plane_rows = height as usize * usize::from(h.planes);
                let rb = row_bytes(width);
                let mut out = Vec::with_capacity(needed);
                let mut pos = 0;
                for _ in 0..plane_rows {
                    let (row, next) = byterun1::decompress_row(body, pos, rb)?;
                    out.extend_from_slice(&row);
                    pos = next;
                }
                out
            }
            other => {
                return Err(IlbmError::InvalidData(format!(
                    "compression type {other} is not supported"
                )));
            }
        };
        PlanarBitmap::from_interleaved(width, height, h.planes, data)
    }
}

/// Header-level facts about an ILBM, without decoding the BODY.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IlbmInfo {
    pub width: u32,
    pub height: u32,
    pub planes: u8,
    pub compressed: bool,
    pub ham: bool,
    pub cmap_entries: usize,
}

impl IlbmInfo {
    pub fn from_bytes(data: &[u8]) -> Result<Self, IlbmError> {
        let file = IlbmFile::parse(data)?;
        Ok(Self {
            width: u32::from(file.header.width),
            height: u32::from(file.header.height),
            planes: file.header.planes,
            compressed: file.header.is_compressed(),
            ham: file.is_ham(),
            cmap_entries: file.cmap.len(),
        })
    }
}

fn read_u32(data: &[u8], at: usize) -> Result<u32, IlbmError> {
    data.get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(IlbmError::UnexpectedEof)
}
