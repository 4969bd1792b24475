//! `std::io` sinks and file output.

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use enough::Stop;
use log::{debug, warn};
use rgb::RGB8;

use crate::encode::EncodeRequest;
use crate::error::IlbmError;
use crate::iff::ChunkSink;
use crate::iff::ilbm::IlbmSummary;
use crate::raster::RasterImage;

/// [`ChunkSink`] over any seekable writer.
///
/// Chunk lengths are back-patched by seeking, so the output is never
/// buffered in memory as a whole.
#[derive(Debug)]
pub struct SeekSink<W: Write + Seek> {
    inner: W,
}

impl<W: Write + Seek> SeekSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Seek> ChunkSink for SeekSink<W> {
    fn position(&mut self) -> Result<u64, IlbmError> {
        self.inner
            .stream_position()
            .map_err(|e| IlbmError::io("querying the output position", e))
    }

    fn write_all(&mut self, bytes: &[u8], what: &dyn core::fmt::Display) -> Result<(), IlbmError> {
        Write::write_all(&mut self.inner, bytes).map_err(|e| IlbmError::io(what.to_string(), e))
    }

    fn patch_u32(&mut self, offset: u64, value: u32) -> Result<(), IlbmError> {
        let patch = |w: &mut W| -> io::Result<()> {
            let end = w.stream_position()?;
            w.seek(SeekFrom::Start(offset))?;
            Write::write_all(w, &value.to_be_bytes())?;
            w.seek(SeekFrom::Start(end))?;
            Ok(())
        };
        patch(&mut self.inner)
            .map_err(|e| IlbmError::io(format!("patching the length at offset {offset}"), e))
    }
}

impl<'a> EncodeRequest<'a> {
    /// Encode into a seekable writer such as a [`File`] or `Cursor<Vec<u8>>`.
    pub fn write_seekable<'r, W: Write + Seek>(
        &self,
        writer: W,
        raster: impl Into<RasterImage<'r>>,
        palette: &[RGB8],
        stop: impl Stop,
    ) -> Result<(IlbmSummary, W), IlbmError> {
        let mut sink = SeekSink::new(writer);
        let summary = self.write_to(&mut sink, raster, palette, stop)?;
        Ok((summary, sink.into_inner()))
    }

    /// Encode straight to `path`.
    ///
    /// On any failure the partially written file is removed, so a failed
    /// encode never leaves a truncated ILBM behind.
    pub fn write_file<'r>(
        &self,
        path: impl AsRef<Path>,
        raster: impl Into<RasterImage<'r>>,
        palette: &[RGB8],
        stop: impl Stop,
    ) -> Result<IlbmSummary, IlbmError> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| IlbmError::io(format!("creating {}", path.display()), e))?;

        let result = self
            .write_seekable(BufWriter::new(file), raster, palette, stop)
            .and_then(|(summary, mut writer)| {
                writer
                    .flush()
                    .map_err(|e| IlbmError::io(format!("flushing {}", path.display()), e))?;
                Ok(summary)
            });

        match result {
            Ok(summary) => {
                debug!("wrote {} ({} bytes)", path.display(), summary.file_len);
                Ok(summary)
            }
            Err(err) => {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!("could not remove partial output {}: {e}", path.display());
                }
                Err(err)
            }
        }
    }
}
