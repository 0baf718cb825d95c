//! transform/framing.rs
//! Line framing between the encode and decode directions.
//!
//! Encode direction: every transformed chunk becomes one self-delimited text
//! block, `STANDARD_BASE64(payload) + "\n"`. Decode direction: a row group is
//! split back into lines and each line is unframed independently, so row
//! groups may hold any number of encoded blocks.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::constants::LINE_TERMINATOR;
use crate::transform::{Transform, TransformError};

/// Frame one transformed payload as a text line.
pub fn frame_line(payload: &[u8]) -> Vec<u8> {
    let mut line = STANDARD.encode(payload).into_bytes();
    line.push(LINE_TERMINATOR);
    line
}

/// Strip the terminator (`\n` or `\r\n`) and base64-decode one line.
pub fn unframe_line(line: &[u8]) -> Result<Vec<u8>, TransformError> {
    let body = trim_terminator(line);
    STANDARD
        .decode(body)
        .map_err(|e| TransformError::Framing(e.to_string()))
}

/// Iterate the non-empty lines of a row group, terminators included.
pub fn lines(group: &[u8]) -> impl Iterator<Item = &[u8]> {
    group
        .split_inclusive(|b| *b == LINE_TERMINATOR)
        .filter(|line| !trim_terminator(line).is_empty())
}

/// Encode direction: transform then frame.
pub fn encode_block(transform: &dyn Transform, block: &[u8]) -> Result<Vec<u8>, TransformError> {
    let encoded = transform.encode(block)?;
    Ok(frame_line(&encoded))
}

/// Decode direction: unframe and invert every line of a row group, in order.
pub fn decode_rows(transform: &dyn Transform, group: &[u8]) -> Result<Vec<u8>, TransformError> {
    let mut out = Vec::new();
    for line in lines(group) {
        let framed = unframe_line(line)?;
        out.extend_from_slice(&transform.decode(&framed)?);
    }
    Ok(out)
}

fn trim_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(&[LINE_TERMINATOR]).unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
