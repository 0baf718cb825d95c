//! transform/mod.rs
//! Pluggable reversible byte transforms applied by the worker pool.
//!
//! - Every transform is stateless per call and shared across workers.
//! - The registry resolves names to implementations at construction time.
//! - Line framing is a fixed system behavior applied on top of any transform
//!   so the decode direction can re-read encoded output row by row.

pub mod codecs;
pub mod framing;
pub mod registry;
pub mod types;

pub use registry::{names, resolve};
pub use types::{Transform, TransformError};
