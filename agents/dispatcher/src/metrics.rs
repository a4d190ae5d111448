use prometheus::{IntCounter, IntGauge};

use overlay_base::CoreMetrics;

/// Counters for the dispatch pipeline, mirrored into the facade's stats
/// surface.
#[derive(Clone, Debug)]
pub struct DispatcherMetrics {
    pub(crate) success: IntCounter,
    pub(crate) failure: IntCounter,
    pub(crate) retry: IntCounter,
    pub(crate) pending: IntGauge,
}

impl DispatcherMetrics {
    /// Register the dispatcher metrics on the agent registry.
    pub fn new(metrics: &CoreMetrics) -> prometheus::Result<Self> {
        let outcomes = metrics.new_int_counter_vec(
            "submissions_processed_total",
            "Terminal submission outcomes and sequence retries",
            &["outcome"],
        )?;
        Ok(Self {
            success: outcomes.with_label_values(&["success"]),
            failure: outcomes.with_label_values(&["failure"]),
            retry: outcomes.with_label_values(&["retry"]),
            pending: metrics.new_int_gauge(
                "pending_submissions",
                "Submissions accepted but not yet terminally completed",
            )?,
        })
    }

    /// Counters not attached to any registry, for embedding without a
    /// metrics server.
    pub fn unregistered() -> Self {
        Self {
            success: IntCounter::new("success", "success").expect("static metric"),
            failure: IntCounter::new("failure", "failure").expect("static metric"),
            retry: IntCounter::new("retry", "retry").expect("static metric"),
            pending: IntGauge::new("pending", "pending").expect("static metric"),
        }
    }

    /// Point-in-time snapshot of the counters.
    pub fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            success: self.success.get(),
            failure: self.failure.get(),
            retry: self.retry.get(),
            pending: self.pending.get().max(0) as u64,
        }
    }
}

/// Point-in-time dispatch counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Broadcasts accepted into the mempool.
    pub success: u64,
    /// Terminal errors surfaced to callers.
    pub failure: u64,
    /// Sequence-fault retries.
    pub retry: u64,
    /// Submissions accepted but not yet terminally completed.
    pub pending: u64,
}
