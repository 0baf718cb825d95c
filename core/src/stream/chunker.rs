//! Sequential source chunking.
//!
//! The chunker is owned exclusively by the dispatcher. Granularity is chosen
//! at construction: fixed-size byte blocks for the encode direction,
//! newline-delimited row groups for the decode direction.

use std::io::{self, BufRead, Read};

use bytes::Bytes;

use crate::constants::LINE_TERMINATOR;
use crate::stream::types::{Chunk, Direction};

/// Anything that yields sequence-numbered chunks in reading order.
///
/// `Ok(None)` is end of stream; polling again after that keeps returning
/// `Ok(None)`.
pub trait ChunkSource: Send {
    fn next_chunk(&mut self) -> io::Result<Option<Chunk>>;
}

/// Construction-time granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkMode {
    /// Up to `size` bytes per chunk.
    Block { size: usize },
    /// Up to `records` newline-terminated records per chunk.
    Rows { records: usize },
}

impl ChunkMode {
    /// Mode matching the direction of travel.
    pub fn for_direction(direction: Direction, block_size: usize, rows_per_chunk: usize) -> Self {
        match direction {
            Direction::Encode => ChunkMode::Block { size: block_size },
            Direction::Decode => ChunkMode::Rows { records: rows_per_chunk },
        }
    }
}

pub struct SourceChunker<R: BufRead> {
    /// `None` once end of input was observed and the handle dropped.
    reader: Option<R>,
    mode: ChunkMode,
    next_sequence: u64,
}

impl<R: BufRead> SourceChunker<R> {
    pub fn new(reader: R, mode: ChunkMode) -> Self {
        Self { reader: Some(reader), mode, next_sequence: 0 }
    }

    pub fn mode(&self) -> ChunkMode {
        self.mode
    }

    /// Sequence number the next chunk will carry.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    /// Next chunk, or `None` at end of stream.
    pub fn next(&mut self) -> io::Result<Option<Chunk>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        let buf = match self.mode {
            ChunkMode::Block { size } => read_exact_or_eof(reader, size)?,
            ChunkMode::Rows { records } => read_rows(reader, records)?,
        };

        if buf.is_empty() {
            // Close exactly once; later polls see `reader == None`.
            self.reader = None;
            return Ok(None);
        }

        let chunk = Chunk::new(self.next_sequence, Bytes::from(buf));
        self.next_sequence += 1;
        Ok(Some(chunk))
    }
}

impl<R: BufRead + Send> ChunkSource for SourceChunker<R> {
    fn next_chunk(&mut self) -> io::Result<Option<Chunk>> {
        self.next()
    }
}

/// Fill up to `len` bytes, stopping early only at end of input.
pub fn read_exact_or_eof<R: Read>(r: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let mut off = 0;

    while off < len {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    buf.truncate(off);
    Ok(buf)
}

/// Read up to `records` lines, terminators kept. A final unterminated line counts.
pub fn read_rows<R: BufRead>(r: &mut R, records: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    for _ in 0..records {
        if r.read_until(LINE_TERMINATOR, &mut buf)? == 0 {
            break;
        }
    }
    Ok(buf)
}
