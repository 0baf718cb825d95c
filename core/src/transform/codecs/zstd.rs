//! transform/codecs/zstd.rs
//!
//! Zstd block transform.
//!
//! Design notes:
//! - Uses the zstd block API (`zstd::bulk`), so each chunk is a standalone
//!   compressed block that any worker can decode independently.
//! - Decoding is capped at the length prefix, itself capped at MAX_BLOCK_SIZE,
//!   so a corrupt prefix cannot force an oversized allocation.

use crate::transform::codecs::{seal, unseal, verify};
use crate::transform::{Transform, TransformError};

pub const DEFAULT_LEVEL_ZSTD: i32 = 6;

#[derive(Debug, Clone, Copy)]
pub struct ZstdTransform {
    level: i32,
}

impl ZstdTransform {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdTransform {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL_ZSTD)
    }
}

impl Transform for ZstdTransform {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let compressed = zstd::bulk::compress(input, self.level)
            .map_err(|e| TransformError::malformed("zstd", e))?;
        seal(input, &compressed, "zstd")
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let (orig_len, compressed, expected_crc) = unseal(input, "zstd")?;

        let decompressed = zstd::bulk::decompress(compressed, orig_len)
            .map_err(|e| TransformError::malformed("zstd", e))?;

        verify(&decompressed, orig_len, expected_crc, "zstd")?;
        Ok(decompressed)
    }
}
