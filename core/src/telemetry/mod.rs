//! telemetry/mod.rs
//! Counters, stage timers, the in-flight gauge, and the immutable report.
//!
//! - Each pipeline component owns its own counters and timers; they are merged
//!   once, after the component's thread has finished.
//! - The in-flight gauge is the only cross-thread value and is write-mostly.

pub mod counters;
pub mod gauge;
pub mod snapshot;
pub mod timers;

pub use counters::*;
pub use gauge::*;
pub use snapshot::*;
pub use timers::*;
