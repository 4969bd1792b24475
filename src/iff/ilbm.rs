//! ILBM chunk layout: BMHD, CAMG, CMAP and the interleaved BODY.

use alloc::vec;
use alloc::vec::Vec;
use enough::Stop;
use log::{debug, trace};

use super::{BMHD, BODY, CAMG, CMAP, ChunkSink, IffWriter, ILBM};
use crate::byterun1::{self, RleMode};
use crate::config::{Aspect, EncodingMode};
use crate::error::IlbmError;
use crate::palette::Palette;
use crate::planar::{PlanarBitmap, PlaneRows};

/// CAMG viewport flag selecting Hold-And-Modify display.
pub const CAMG_HAM: u32 = 0x800;

/// BMHD `masking` values. Only `NONE` is written.
pub const MASKING_NONE: u8 = 0;

/// BMHD `compression` values.
pub const COMPRESSION_NONE: u8 = 0;
pub const COMPRESSION_BYTERUN1: u8 = 1;

/// The 20-byte BMHD payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapHeader {
    pub width: u16,
    pub height: u16,
    pub x: i16,
    pub y: i16,
    pub planes: u8,
    pub masking: u8,
    pub compression: u8,
    pub transparent_color: u16,
    pub x_aspect: u8,
    pub y_aspect: u8,
    pub page_width: i16,
    pub page_height: i16,
}

impl BitmapHeader {
    pub const SIZE: usize = 20;

    /// Header for an unmasked image at the origin whose page is the image.
    pub fn new(width: u16, height: u16, planes: u8, compressed: bool, aspect: Aspect) -> Self {
        Self {
            width,
            height,
            x: 0,
            y: 0,
            planes,
            masking: MASKING_NONE,
            compression: if compressed {
                COMPRESSION_BYTERUN1
            } else {
                COMPRESSION_NONE
            },
            transparent_color: 0,
            x_aspect: aspect.x,
            y_aspect: aspect.y,
            page_width: width as i16,
            page_height: height as i16,
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.compression == COMPRESSION_BYTERUN1
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..2].copy_from_slice(&self.width.to_be_bytes());
        out[2..4].copy_from_slice(&self.height.to_be_bytes());
        out[4..6].copy_from_slice(&self.x.to_be_bytes());
        out[6..8].copy_from_slice(&self.y.to_be_bytes());
        out[8] = self.planes;
        out[9] = self.masking;
        out[10] = self.compression;
        out[11] = 0; // pad1
        out[12..14].copy_from_slice(&self.transparent_color.to_be_bytes());
        out[14] = self.x_aspect;
        out[15] = self.y_aspect;
        out[16..18].copy_from_slice(&self.page_width.to_be_bytes());
        out[18..20].copy_from_slice(&self.page_height.to_be_bytes());
        out
    }

    pub fn parse(data: &[u8]) -> Result<Self, IlbmError> {
        let d: &[u8; Self::SIZE] = data
            .get(..Self::SIZE)
            .and_then(|s| s.try_into().ok())
            .ok_or(IlbmError::UnexpectedEof)?;
        Ok(Self {
            width: u16::from_be_bytes([d[0], d[1]]),
            height: u16::from_be_bytes([d[2], d[3]]),
            x: i16::from_be_bytes([d[4], d[5]]),
            y: i16::from_be_bytes([d[6], d[7]]),
            planes: d[8],
            masking: d[9],
            compression: d[10],
            transparent_color: u16::from_be_bytes([d[12], d[13]]),
            x_aspect: d[14],
            y_aspect: d[15],
            page_width: i16::from_be_bytes([d[16], d[17]]),
            page_height: i16::from_be_bytes([d[18], d[19]]),
        })
    }
}

/// Per-file choices that are not part of the bitmap itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct WriteOptions {
    pub compress: bool,
    pub rle_mode: RleMode,
    pub aspect: Aspect,
}

/// What was written, in place of a console report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IlbmSummary {
    pub width: u32,
    pub height: u32,
    pub planes: u8,
    pub mode: EncodingMode,
    pub compressed: bool,
    pub cmap_entries: usize,
    /// BODY payload length, excluding any pad byte.
    pub body_len: u32,
    /// Total output length, equal to the FORM length + 8.
    pub file_len: u64,
}

/// Write a complete FORM ILBM.
///
/// Chunks are emitted in the order BMHD, CAMG (HAM only), CMAP, BODY. Rows
/// are pulled from `rows` one at a time, so a streaming source never holds
/// more than one interleaved row.
pub fn write_ilbm<S, R>(
    sink: &mut S,
    mode: EncodingMode,
    rows: &mut R,
    palette: &Palette,
    options: &WriteOptions,
    stop: &dyn Stop,
) -> Result<IlbmSummary, IlbmError>
where
    S: ChunkSink + ?Sized,
    R: PlaneRows + ?Sized,
{
    let (width, height) = (rows.width(), rows.height());
    let (w16, h16) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(IlbmError::DimensionsTooLarge { width, height }),
    };
    if rows.planes() != mode.bitplanes() {
        return Err(IlbmError::InvalidData(alloc::format!(
            "row source has {} planes, {mode:?} needs {}",
            rows.planes(),
            mode.bitplanes()
        )));
    }

    let cmap = cmap_bytes(mode, palette)?;
    let cmap_entries = cmap.len() / 3;

    let header = BitmapHeader::new(w16, h16, mode.bitplanes(), options.compress, options.aspect);
    let mut iff = IffWriter::begin_form(sink, ILBM)?;
    iff.chunk(BMHD, &header.to_bytes())?;
    if mode.is_ham() {
        iff.chunk(CAMG, &CAMG_HAM.to_be_bytes())?;
    }
    iff.chunk(CMAP, &cmap)?;
    let body_len = write_body(&mut iff, rows, options, stop)?;
    let file_len = iff.finish()?;

    debug!(
        "wrote {width}x{height} ILBM: {} planes, {} colors, compression {}, {file_len} bytes",
        mode.bitplanes(),
        cmap_entries,
        if options.compress { "ByteRun1" } else { "none" },
    );
    Ok(IlbmSummary {
        width,
        height,
        planes: mode.bitplanes(),
        mode,
        compressed: options.compress,
        cmap_entries,
        body_len,
        file_len,
    })
}

/// CMAP payload for `mode`: the 16 HAM base colors, or exactly one entry
/// per indexed color.
fn cmap_bytes(mode: EncodingMode, palette: &Palette) -> Result<Vec<u8>, IlbmError> {
    match mode {
        EncodingMode::Ham => Ok(Palette::ham(palette.colors()).cmap_bytes()),
        EncodingMode::Indexed { bitplanes } => {
            let colors = 1usize << bitplanes;
            if palette.len() != colors {
                return Err(IlbmError::InvalidData(alloc::format!(
                    "palette has {} entries, {bitplanes} bitplanes need {colors}",
                    palette.len()
                )));
            }
            Ok(palette.cmap_bytes())
        }
    }
}

/// Write a bitmap that is already fully planar.
pub fn write_bitmap<S>(
    sink: &mut S,
    mode: EncodingMode,
    bitmap: &PlanarBitmap,
    palette: &Palette,
    options: &WriteOptions,
    stop: &dyn Stop,
) -> Result<IlbmSummary, IlbmError>
where
    S: ChunkSink + ?Sized,
{
    write_ilbm(sink, mode, &mut BitmapRows(bitmap), palette, options, stop)
}

struct BitmapRows<'a>(&'a PlanarBitmap);

impl PlaneRows for BitmapRows<'_> {
    fn width(&self) -> u32 {
        self.0.width()
    }

    fn height(&self) -> u32 {
        self.0.height()
    }

    fn planes(&self) -> u8 {
        self.0.planes()
    }

    fn fill_row(&mut self, y: u32, out: &mut [u8]) -> Result<(), IlbmError> {
        out.copy_from_slice(self.0.interleaved_row(y));
        Ok(())
    }
}

/// Row-major, plane-minor BODY, each plane row raw or ByteRun1-packed.
fn write_body<S, R>(
    iff: &mut IffWriter<'_, S>,
    rows: &mut R,
    options: &WriteOptions,
    stop: &dyn Stop,
) -> Result<u32, IlbmError>
where
    S: ChunkSink + ?Sized,
    R: PlaneRows + ?Sized,
{
    let row_bytes = rows.row_bytes();
    let planes = usize::from(rows.planes());
    let mut row = vec![0u8; row_bytes * planes];
    let mut packed: Vec<u8> = Vec::with_capacity(row_bytes + row_bytes / 64 + 2);

    let body = iff.begin_chunk(BODY)?;
    for y in 0..rows.height() {
        if y % 16 == 0 {
            stop.check()?;
        }
        rows.fill_row(y, &mut row)?;
        for (plane, plane_row) in row.chunks_exact(row_bytes).enumerate() {
            let bytes = if options.compress {
                packed.clear();
                byterun1::compress_into(plane_row, options.rle_mode, &mut packed);
                &packed[..]
            } else {
                plane_row
            };
            iff.write(bytes, &format_args!("writing BODY row {y} plane {plane}"))?;
        }
        trace!("BODY row {y} of {}", rows.height());
    }
    iff.end_chunk(body)
}
