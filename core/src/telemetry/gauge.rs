//! telemetry/gauge.rs
//! Count of chunks pulled from the source but not yet handed to the sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::warn;

/// Shared in-flight gauge.
///
/// The dispatcher calls [`InFlightGauge::acquire`] before handing a chunk to a
/// worker; the worker calls [`InFlightGauge::release`] after the transformed
/// chunk is on the sink channel and before it asks for more work.
#[derive(Clone, Debug, Default)]
pub struct InFlightGauge {
    inner: Arc<GaugeInner>,
}

#[derive(Debug, Default)]
struct GaugeInner {
    current: AtomicU64,
    peak: AtomicU64,
}

impl InFlightGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) {
        let now = self.inner.current.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner.peak.fetch_max(now, Ordering::AcqRel);
    }

    /// Saturates at zero; an unmatched release is logged, never wrapped.
    pub fn release(&self) {
        if self
            .inner
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| v.checked_sub(1))
            .is_err()
        {
            warn!("in-flight gauge released without a matching acquire");
        }
    }

    pub fn current(&self) -> u64 {
        self.inner.current.load(Ordering::Acquire)
    }

    pub fn peak(&self) -> u64 {
        self.inner.peak.load(Ordering::Acquire)
    }
}
