use crate::transform::{Transform, TransformError};

/// Passes payloads through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl Transform for IdentityTransform {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(input.to_vec())
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(input.to_vec())
    }
}
