//! IFF-85 container plumbing: chunk framing, length back-patching, padding.
//!
//! Chunks are a 4-byte tag, a big-endian `u32` payload length and the
//! payload, followed by one zero byte when the payload length is odd. The
//! pad byte is not counted in the length.

pub mod ilbm;
pub mod read;

use alloc::format;
use alloc::vec::Vec;
use log::debug;

use crate::error::IlbmError;

pub const FORM: [u8; 4] = *b"FORM";
pub const ILBM: [u8; 4] = *b"ILBM";
pub const BMHD: [u8; 4] = *b"BMHD";
pub const CMAP: [u8; 4] = *b"CMAP";
pub const CAMG: [u8; 4] = *b"CAMG";
pub const BODY: [u8; 4] = *b"BODY";

/// Append-only byte sink that can overwrite a `u32` it already wrote.
///
/// `what` describes the write for error reporting (chunk, row, plane).
pub trait ChunkSink {
    /// Current write offset from the start of the output.
    fn position(&mut self) -> Result<u64, IlbmError>;

    fn write_all(&mut self, bytes: &[u8], what: &dyn core::fmt::Display) -> Result<(), IlbmError>;

    /// Overwrite 4 bytes at `offset` with `value` (big-endian), then return
    /// to the end of the output.
    fn patch_u32(&mut self, offset: u64, value: u32) -> Result<(), IlbmError>;
}

impl ChunkSink for Vec<u8> {
    fn position(&mut self) -> Result<u64, IlbmError> {
        Ok(self.len() as u64)
    }

    fn write_all(&mut self, bytes: &[u8], _what: &dyn core::fmt::Display) -> Result<(), IlbmError> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    fn patch_u32(&mut self, offset: u64, value: u32) -> Result<(), IlbmError> {
        let start = offset as usize;
        let slot = self.get_mut(start..start + 4).ok_or_else(|| {
            IlbmError::InvalidData(format!("patch offset {offset} is past the end of output"))
        })?;
        slot.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }
}

/// A chunk whose length field has not been written yet.
#[derive(Debug)]
#[must_use = "an open chunk must be closed with IffWriter::end_chunk"]
pub struct OpenChunk {
    tag: [u8; 4],
    /// Offset of the tag; the length field follows it.
    start: u64,
}

impl OpenChunk {
    pub fn tag(&self) -> &str {
        core::str::from_utf8(&self.tag).unwrap_or("????")
    }
}

/// Writes a FORM and its chunks to a [`ChunkSink`].
pub struct IffWriter<'s, S: ChunkSink + ?Sized> {
    sink: &'s mut S,
    form: Option<OpenChunk>,
}

impl<'s, S: ChunkSink + ?Sized> IffWriter<'s, S> {
    /// Write `FORM`, a placeholder length and the form type.
    pub fn begin_form(sink: &'s mut S, form_type: [u8; 4]) -> Result<Self, IlbmError> {
        let mut writer = Self { sink, form: None };
        let form = writer.begin_chunk(FORM)?;
        writer.sink.write_all(&form_type, &"writing the FORM type")?;
        writer.form = Some(form);
        Ok(writer)
    }

    /// Start a chunk with a placeholder length; payload follows.
    pub fn begin_chunk(&mut self, tag: [u8; 4]) -> Result<OpenChunk, IlbmError> {
        let mut header = [0u8; 8];
        header[..4].copy_from_slice(&tag);
        let start = self.sink.position()?;
        let chunk = OpenChunk { tag, start };
        self.sink
            .write_all(&header, &format_args!("writing the {} header", chunk.tag()))?;
        Ok(chunk)
    }

    pub fn write(&mut self, bytes: &[u8], what: &dyn core::fmt::Display) -> Result<(), IlbmError> {
        self.sink.write_all(bytes, what)
    }

    /// Patch the chunk length and pad an odd payload. Returns the length.
    pub fn end_chunk(&mut self, chunk: OpenChunk) -> Result<u32, IlbmError> {
        let end = self.sink.position()?;
        let len = chunk_len(end - (chunk.start + 8), chunk.tag())?;
        self.sink.patch_u32(chunk.start + 4, len)?;
        if len % 2 == 1 {
            self.sink
                .write_all(&[0], &format_args!("padding {}", chunk.tag()))?;
        }
        debug!("{} chunk: {len} bytes", chunk.tag());
        Ok(len)
    }

    /// Write a whole chunk whose payload is already in memory.
    pub fn chunk(&mut self, tag: [u8; 4], payload: &[u8]) -> Result<u32, IlbmError> {
        let chunk = self.begin_chunk(tag)?;
        self.write(payload, &format_args!("writing the {} payload", chunk.tag()))?;
        self.end_chunk(chunk)
    }

    /// Patch the FORM length (`file length - 8`). Returns the file length.
    pub fn finish(mut self) -> Result<u64, IlbmError> {
        let form = self
            .form
            .take()
            .ok_or_else(|| IlbmError::InvalidData("FORM was not opened".into()))?;
        // FORM payloads are even: every chunk inside is padded
        let form_len = self.end_chunk(form)?;
        Ok(u64::from(form_len) + 8)
    }
}

fn chunk_len(len: u64, tag: &str) -> Result<u32, IlbmError> {
    u32::try_from(len).map_err(|_| {
        IlbmError::LimitExceeded(format!("{tag} payload of {len} bytes exceeds 4 GiB"))
    })
}
