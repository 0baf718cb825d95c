use crate::transform::{Transform, TransformError};

/// Lowercase hex encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexTransform;

impl Transform for HexTransform {
    fn name(&self) -> &'static str {
        "hex"
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(hex::encode(input).into_bytes())
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        hex::decode(input).map_err(|e| TransformError::malformed("hex", e))
    }
}
