use thiserror::Error;

/// Failure of a single transform call.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Payload could not be decoded by the codec.
    #[error("codec {codec} rejected payload: {msg}")]
    Malformed { codec: &'static str, msg: String },

    /// Encoded line framing was broken.
    #[error("framing error: {0}")]
    Framing(String),
}

impl TransformError {
    pub fn malformed(codec: &'static str, msg: impl ToString) -> Self {
        TransformError::Malformed { codec, msg: msg.to_string() }
    }
}

/// A reversible byte transform.
///
/// Implementations are shared by reference across worker threads, so they
/// must not keep per-call state.
pub trait Transform: Send + Sync {
    /// Registry name.
    fn name(&self) -> &'static str;

    /// Forward direction.
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, TransformError>;

    /// Inverse of [`Transform::encode`].
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, TransformError>;
}
