use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use eyre::{Report, Result};
use futures_util::future::select_all;
use prometheus::Registry;
use tokio::task::JoinHandle;
use tracing::{info, info_span, instrument::Instrumented, Instrument};

use crate::{cancel_task, metrics::CoreMetrics, settings::Settings};

/// Properties shared across all overlay agents
#[derive(Debug)]
pub struct OverlayAgentCore {
    /// Prometheus metrics
    pub metrics: Arc<CoreMetrics>,
    /// Settings this agent was created with
    pub settings: Settings,
}

/// Settings of an agent, loadable from the standard config locations.
pub trait LoadableFromSettings: AsRef<Settings> + Sized {
    /// Create a new instance of these settings by reading the configs and
    /// env vars.
    fn load(agent_name: &str) -> Result<Self>;
}

impl LoadableFromSettings for Settings {
    fn load(agent_name: &str) -> Result<Self> {
        crate::settings::load_settings_object(agent_name)
    }
}

/// A fundamental agent which does not make any assumptions about the tools
/// which are used.
#[async_trait]
pub trait BaseAgent: Send + Sync + Debug {
    /// The agent's name
    const AGENT_NAME: &'static str;

    /// The settings object for this agent
    type Settings: LoadableFromSettings;

    /// Instantiate the agent from the standard settings object
    async fn from_settings(settings: Self::Settings, metrics: Arc<CoreMetrics>) -> Result<Self>
    where
        Self: Sized;

    /// Start running this agent.
    fn run(&self) -> Instrumented<JoinHandle<Result<()>>>;

    /// Stop the agent's tasks ahead of process exit.
    async fn shutdown(&self) {}
}

/// Call this from `main` to fully initialize and run the agent for its
/// entire lifecycle. This assumes only a single agent is being run, and
/// initializes the metrics server and tracing as well.
///
/// Exits 0 after a shutdown signal (SIGINT/SIGTERM/SIGHUP) has been handled.
pub async fn agent_main<A: BaseAgent>() -> Result<()> {
    color_eyre::install()?;

    let settings = A::Settings::load(A::AGENT_NAME)?;
    let core_settings: &Settings = settings.as_ref();
    core_settings.validate()?;
    core_settings.tracing.start_tracing()?;

    let metrics = Arc::new(CoreMetrics::new(
        A::AGENT_NAME,
        core_settings.metrics_port,
        Registry::new(),
    )?);
    let agent = A::from_settings(settings, metrics.clone()).await?;
    let _metrics_server = metrics.clone().run_http_server();

    tokio::select! {
        res = agent.run() => res??,
        res = shutdown_signal() => {
            res?;
            info!(agent = A::AGENT_NAME, "shutdown signal received, stopping agent");
            agent.shutdown().await;
        }
    }
    Ok(())
}

/// Resolves when SIGINT, SIGTERM, or SIGHUP is delivered.
#[cfg(unix)]
async fn shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    tokio::select! {
        _ = interrupt.recv() => {},
        _ = terminate.recv() => {},
        _ = hangup.recv() => {},
    }
    Ok(())
}

/// Resolves when ctrl-c is delivered.
#[cfg(not(unix))]
async fn shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

/// Utility to run multiple tasks and shutdown if any one task ends.
#[allow(clippy::unit_arg, unused_must_use)]
pub fn run_all(
    tasks: Vec<Instrumented<JoinHandle<Result<(), Report>>>>,
) -> Instrumented<JoinHandle<Result<()>>> {
    debug_assert!(!tasks.is_empty(), "No tasks submitted");
    let span = info_span!("run_all");
    tokio::spawn(async move {
        let (res, _, remaining) = select_all(tasks).await;

        for task in remaining.into_iter() {
            cancel_task!(task);
        }

        res?
    })
    .instrument(span)
}
