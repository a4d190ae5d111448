//! Scaffolding shared by overlay agents: settings loading, tracing setup,
//! Prometheus metrics, and the agent lifecycle (startup, task supervision,
//! signal-driven shutdown).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Settings and their loaders
pub mod settings;

mod agent;
pub use agent::*;

mod macros;

mod metrics;
pub use metrics::*;
