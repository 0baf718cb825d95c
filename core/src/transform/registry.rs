//! transform/registry.rs
//! Transform registry and factory.

use std::sync::Arc;

use crate::transform::codecs::{Base64Transform, DeflateTransform, HexTransform, IdentityTransform, ZstdTransform};
use crate::transform::Transform;
use crate::types::StreamError;

pub struct TransformInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// Known registry entries, reference entry first.
pub const TRANSFORMS: &[TransformInfo] = &[
    TransformInfo { name: "base64", description: "standard base64 (reference)" },
    TransformInfo { name: "identity", description: "payload unchanged" },
    TransformInfo { name: "hex", description: "lowercase hex" },
    TransformInfo { name: "zstd", description: "zstd block compression with crc32 trailer" },
    TransformInfo { name: "deflate", description: "zlib compression with crc32 trailer" },
];

pub fn names() -> Vec<&'static str> {
    TRANSFORMS.iter().map(|t| t.name).collect()
}

/// Resolve a transform by name.
///
/// # Errors
/// - `StreamError::UnknownTransform` if the name is not registered.
pub fn resolve(name: &str) -> Result<Arc<dyn Transform>, StreamError> {
    match name {
        "base64" => Ok(Arc::new(Base64Transform)),
        "identity" => Ok(Arc::new(IdentityTransform)),
        "hex" => Ok(Arc::new(HexTransform)),
        "zstd" => Ok(Arc::new(ZstdTransform::default())),
        "deflate" => Ok(Arc::new(DeflateTransform::default())),
        other => Err(StreamError::UnknownTransform(other.to_string())),
    }
}
