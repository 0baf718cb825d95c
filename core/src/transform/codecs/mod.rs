//! transform/codecs/mod.rs
//! Concrete transforms resolvable through the registry.
//!
//! Compression codecs share one self-checking layout:
//! `[orig_len: u32 LE][codec payload][crc32(original): u32 LE]`.

pub mod base64;
pub mod deflate;
pub mod hex;
pub mod identity;
pub mod zstd;

pub use self::base64::Base64Transform;
pub use self::deflate::DeflateTransform;
pub use self::hex::HexTransform;
pub use self::identity::IdentityTransform;
pub use self::zstd::ZstdTransform;

use crate::constants::MAX_BLOCK_SIZE;
use crate::transform::TransformError;

const LEN_PREFIX: usize = 4;
const CRC_TRAILER: usize = 4;

pub(crate) fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Wrap a codec payload with the original length and checksum.
pub(crate) fn seal(original: &[u8], payload: &[u8], codec: &'static str) -> Result<Vec<u8>, TransformError> {
    let orig_len = u32::try_from(original.len())
        .map_err(|_| TransformError::malformed(codec, format!("block of {} bytes exceeds u32 length prefix", original.len())))?;

    let mut out = Vec::with_capacity(LEN_PREFIX + payload.len() + CRC_TRAILER);
    out.extend_from_slice(&orig_len.to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&compute_checksum(original).to_le_bytes());
    Ok(out)
}

/// Split a sealed buffer into `(orig_len, payload, expected_crc)`.
pub(crate) fn unseal<'a>(input: &'a [u8], codec: &'static str) -> Result<(usize, &'a [u8], u32), TransformError> {
    if input.len() < LEN_PREFIX + CRC_TRAILER {
        return Err(TransformError::malformed(codec, "input too short for length+checksum"));
    }

    let (prefix, rest) = input.split_at(LEN_PREFIX);
    let (payload, trailer) = rest.split_at(rest.len() - CRC_TRAILER);

    let mut len_bytes = [0u8; LEN_PREFIX];
    len_bytes.copy_from_slice(prefix);
    let mut crc_bytes = [0u8; CRC_TRAILER];
    crc_bytes.copy_from_slice(trailer);

    // No encoder ever emits a block larger than MAX_BLOCK_SIZE.
    let orig_len = u32::from_le_bytes(len_bytes) as usize;
    if orig_len > MAX_BLOCK_SIZE {
        return Err(TransformError::malformed(
            codec,
            format!("length prefix {orig_len} exceeds max block size {MAX_BLOCK_SIZE}"),
        ));
    }

    Ok((orig_len, payload, u32::from_le_bytes(crc_bytes)))
}

/// Check decoded size and checksum against the sealed values.
pub(crate) fn verify(decoded: &[u8], orig_len: usize, expected_crc: u32, codec: &'static str) -> Result<(), TransformError> {
    if decoded.len() != orig_len {
        return Err(TransformError::malformed(
            codec,
            format!("decoded size {} != prefix {}", decoded.len(), orig_len),
        ));
    }
    let actual = compute_checksum(decoded);
    if actual != expected_crc {
        return Err(TransformError::malformed(
            codec,
            format!("checksum mismatch: expected {expected_crc:08x}, got {actual:08x}"),
        ));
    }
    Ok(())
}
