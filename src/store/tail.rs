//! Tail line lookup
//!
//! Finds the last line of the repository file by reading backwards from
//! the end, and derives the next id from it.

use std::io::{Read, Seek, SeekFrom};

use crate::error::{DriverStoreError, Result};
use crate::record::codec::{self, CorruptRecord};

/// Bytes read per backwards step
pub const TAIL_CHUNK_SIZE: u64 = 4096;

/// Last line of the repository file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailLine {
    /// Line content, terminator stripped
    pub text: String,

    /// Whether the file ends with `\n`
    pub terminated: bool,
}

/// Read the last line of a file
///
/// Returns `None` for an empty file. A single trailing `\n` (or `\r\n`) is
/// ignored, so a file ending in a terminator yields the line before it.
/// A file whose last line was written without a terminator still yields
/// that line.
pub fn read_tail_line<F: Read + Seek>(file: &mut F) -> Result<Option<TailLine>> {
    let len = file.seek(SeekFrom::End(0))?;
    if len == 0 {
        return Ok(None);
    }

    // Pieces of the tail line, collected from the end backwards
    let mut pieces: Vec<Vec<u8>> = Vec::new();
    let mut terminated = None;
    let mut pos = len;

    loop {
        let step = TAIL_CHUNK_SIZE.min(pos);
        pos -= step;

        let mut chunk = vec![0u8; step as usize];
        file.seek(SeekFrom::Start(pos))?;
        file.read_exact(&mut chunk)?;

        // only the last byte of the file can be the final terminator
        let mut end = chunk.len();
        if terminated.is_none() {
            let ends_with_newline = chunk.last() == Some(&b'\n');
            if ends_with_newline {
                end -= 1;
            }
            terminated = Some(ends_with_newline);
        }

        match chunk[..end].iter().rposition(|&b| b == b'\n') {
            Some(newline) => {
                pieces.push(chunk[newline + 1..end].to_vec());
                break;
            }
            None => {
                chunk.truncate(end);
                pieces.push(chunk);
                if pos == 0 {
                    break;
                }
            }
        }
    }

    let mut line: Vec<u8> = pieces.into_iter().rev().flatten().collect();
    if line.ends_with(b"\r") {
        line.pop();
    }

    let text = String::from_utf8(line)
        .map_err(|_| DriverStoreError::CorruptTail(CorruptRecord::InvalidUtf8))?;
    Ok(Some(TailLine {
        text,
        terminated: terminated.unwrap_or(false),
    }))
}

/// Next id to assign, given the current tail line
///
/// An empty file starts at 1. Otherwise only the tail line's id field is
/// consulted; earlier lines are never read.
pub fn next_id(tail_line: Option<&str>) -> std::result::Result<u64, CorruptRecord> {
    let Some(line) = tail_line else {
        return Ok(1);
    };
    let last = codec::parse_leading_id(line)?;
    last.checked_add(1)
        .ok_or(CorruptRecord::IdSpaceExhausted(last))
}
