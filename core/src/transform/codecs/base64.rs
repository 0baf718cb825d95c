//! Reference transform: standard base64 with padding.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::transform::{Transform, TransformError};

#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Transform;

impl Transform for Base64Transform {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(STANDARD.encode(input).into_bytes())
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        STANDARD
            .decode(input)
            .map_err(|e| TransformError::malformed("base64", e))
    }
}
