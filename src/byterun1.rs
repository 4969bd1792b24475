//! ByteRun1 run-length coding, as used by ILBM BODY rows.
//!
//! Each control byte `n` is read as a signed value:
//! - `0..=127`: copy the next `n + 1` bytes literally
//! - `-127..=-1`: repeat the next byte `-n + 1` times
//! - `-128`: no-op
//!
//! Rows are compressed independently; nothing spans a row boundary.

use alloc::format;
use alloc::vec::Vec;

use crate::error::IlbmError;

/// Longest literal or repeat block either encoder emits.
const MAX_BLOCK: usize = 127;
/// Shortest run worth a repeat block.
const MIN_RUN: usize = 3;
const NOOP: u8 = 0x80;

/// Which ByteRun1 encoder to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RleMode {
    /// Byte-identical to the historical converter: a lone final byte is
    /// always its own literal, and literal scans stop in front of a
    /// trailing pair.
    #[default]
    Compatible,
    /// Literal runs absorb everything that is not a run of 3 or more, so
    /// output is never larger than [`RleMode::Compatible`].
    Tight,
}

/// Compress one row.
pub fn compress(row: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(row.len() + row.len() / MAX_BLOCK + 1);
    compress_into(row, RleMode::Compatible, &mut out);
    out
}

/// Compress one row, appending to `out`.
pub fn compress_into(row: &[u8], mode: RleMode, out: &mut Vec<u8>) {
    match mode {
        RleMode::Compatible => compress_compatible(row, out),
        RleMode::Tight => compress_tight(row, out),
    }
}

/// Length of the run of bytes equal to `row[i]`, capped at [`MAX_BLOCK`].
#[inline]
fn run_at(row: &[u8], i: usize) -> usize {
    let first = row[i];
    row[i..]
        .iter()
        .take(MAX_BLOCK)
        .take_while(|&&b| b == first)
        .count()
}

#[inline]
fn push_repeat(out: &mut Vec<u8>, run: usize, byte: u8) {
    // 257 - run is -(run - 1) as a two's-complement byte
    out.push((257 - run) as u8);
    out.push(byte);
}

#[inline]
fn push_literal(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push((bytes.len() - 1) as u8);
    out.extend_from_slice(bytes);
}

fn compress_compatible(row: &[u8], out: &mut Vec<u8>) {
    let len = row.len();
    let mut i = 0;
    while i < len {
        if i == len - 1 {
            push_literal(out, &row[i..]);
            break;
        }

        let run = run_at(row, i);
        if run >= MIN_RUN {
            push_repeat(out, run, row[i]);
            i += run;
            continue;
        }

        // Extend while the next bytes do not open a run of three. The byte
        // right before the end is always taken; a trailing equal pair is not.
        let mut count = 1;
        while i + count < len && count < MAX_BLOCK {
            let k = i + count;
            let keep = k == len - 1
                || row[k] != row[k + 1]
                || (k + 2 < len && row[k + 1] != row[k + 2]);
            if !keep {
                break;
            }
            count += 1;
        }
        push_literal(out, &row[i..i + count]);
        i += count;
    }
}

fn compress_tight(row: &[u8], out: &mut Vec<u8>) {
    let len = row.len();
    let mut i = 0;
    while i < len {
        let run = run_at(row, i);
        if run >= MIN_RUN {
            push_repeat(out, run, row[i]);
            i += run;
            continue;
        }

        let start = i;
        while i < len && i - start < MAX_BLOCK {
            if i > start && run_at(row, i) >= MIN_RUN {
                break;
            }
            i += 1;
        }
        push_literal(out, &row[start..i]);
    }
}

/// Decompress a whole ByteRun1 stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, IlbmError> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut pos = 0;
    while pos < data.len() {
        pos = decode_block(data, pos, &mut out)?;
    }
    Ok(out)
}

/// Decompress exactly `row_len` bytes starting at `data[start..]`.
///
/// Returns the row and the offset just past the consumed input. A block
/// that would overrun the row is an error.
pub fn decompress_row(
    data: &[u8],
    start: usize,
    row_len: usize,
) -> Result<(Vec<u8>, usize), IlbmError> {
    let mut out = Vec::with_capacity(row_len);
    let mut pos = start;
    while out.len() < row_len {
        if pos >= data.len() {
            return Err(IlbmError::UnexpectedEof);
        }
        pos = decode_block(data, pos, &mut out)?;
    }
    if out.len() > row_len {
        return Err(IlbmError::InvalidData(format!(
            "ByteRun1 block overruns row: {} bytes for a {row_len}-byte row",
            out.len()
        )));
    }
    Ok((out, pos))
}

/// Decode the block at `data[pos]`, returning the next position.
fn decode_block(data: &[u8], pos: usize, out: &mut Vec<u8>) -> Result<usize, IlbmError> {
    let n = data[pos];
    let pos = pos + 1;
    match n {
        0..=127 => {
            let count = usize::from(n) + 1;
            let bytes = data.get(pos..pos + count).ok_or(IlbmError::UnexpectedEof)?;
            out.extend_from_slice(bytes);
            Ok(pos + count)
        }
        NOOP => Ok(pos),
        _ => {
            let byte = *data.get(pos).ok_or(IlbmError::UnexpectedEof)?;
            let count = 257 - usize::from(n);
            out.extend(core::iter::repeat_n(byte, count));
            Ok(pos + 1)
        }
    }
}
