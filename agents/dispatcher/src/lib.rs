//! The overlay dispatcher submits smart-contract messages to the chain on
//! behalf of the locally derived accounts, with strict per-account sequence
//! ordering, priority-aware admission, and recovery from sequence drift.

#![forbid(unsafe_code)]

mod agent;
pub use agent::Dispatcher;

mod dispatch;
pub use dispatch::{AccountSlot, DispatchConfig, SubmitOptions, TxDispatcher};

mod estimator;
pub use estimator::estimate_fee;

mod metrics;
pub use metrics::{DispatchStats, DispatcherMetrics};

mod poller;
pub use poller::InclusionPoller;

mod queue;
pub use queue::{QueuedSubmission, SubmissionQueue};

mod router;
pub use router::RoundRobinRouter;

mod worker;
pub use worker::AccountWorker;

#[cfg(test)]
mod test_utils;
