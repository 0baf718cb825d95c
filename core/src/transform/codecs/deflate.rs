//! Deflate (zlib wrapper) via flate2, one independent zlib stream per chunk.

use std::io::{Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use crate::transform::codecs::{seal, unseal, verify};
use crate::transform::{Transform, TransformError};

pub const DEFAULT_LEVEL_DEFLATE: u32 = 6;

#[derive(Debug, Clone, Copy)]
pub struct DeflateTransform {
    level: Compression,
}

impl DeflateTransform {
    pub fn new(level: u32) -> Self {
        let level = match level {
            0..=9 => Compression::new(level),
            _ => Compression::default(),
        };
        Self { level }
    }
}

impl Default for DeflateTransform {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL_DEFLATE)
    }
}

impl Transform for DeflateTransform {
    fn name(&self) -> &'static str {
        "deflate"
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut enc = ZlibEncoder::new(Vec::new(), self.level);
        enc.write_all(input)
            .map_err(|e| TransformError::malformed("deflate", e))?;
        let compressed = enc.finish()
            .map_err(|e| TransformError::malformed("deflate", e))?;
        seal(input, &compressed, "deflate")
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let (orig_len, compressed, expected_crc) = unseal(input, "deflate")?;

        // One byte past the prefix is enough to detect an oversized stream.
        let mut dec = ZlibDecoder::new(compressed).take(orig_len as u64 + 1);
        let mut decompressed = Vec::with_capacity(orig_len);
        dec.read_to_end(&mut decompressed)
            .map_err(|e| TransformError::malformed("deflate", e))?;

        verify(&decompressed, orig_len, expected_crc, "deflate")?;
        Ok(decompressed)
    }
}
