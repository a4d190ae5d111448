use eyre::Result;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    prelude::*,
};

/// Logging level. A "higher level" means more will be logged.
#[derive(Default, Debug, Clone, Copy, serde::Deserialize, PartialOrd, Ord, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Level {
    /// Off
    Off = 0,
    /// Error
    Error = 1,
    /// Warn
    Warn = 2,
    /// Debug
    Debug = 3,
    /// Trace
    Trace = 5,
    /// Trace + Additional logs from dependencies
    DependencyTrace = 6,
    /// Info
    #[serde(other)]
    #[default]
    Info = 4,
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> LevelFilter {
        match level {
            Level::Off => LevelFilter::OFF,
            Level::Error => LevelFilter::ERROR,
            Level::Warn => LevelFilter::WARN,
            Level::Debug => LevelFilter::DEBUG,
            Level::Trace | Level::DependencyTrace => LevelFilter::TRACE,
            Level::Info => LevelFilter::INFO,
        }
    }
}

/// Output style of the fmt subscriber layer.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Style {
    /// Pretty print
    Pretty,
    /// JSON
    Json,
    /// Compact
    Compact,
    /// Default style
    #[serde(other)]
    Full,
}

impl Default for Style {
    fn default() -> Self {
        Style::Pretty
    }
}

/// Configuration for the tracing subscribers used by overlay agents
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TracingConfig {
    #[serde(default)]
    fmt: Style,
    #[serde(default)]
    level: Level,
}

impl TracingConfig {
    /// Attempt to instantiate and register a tracing subscriber setup from
    /// settings.
    pub fn start_tracing(&self) -> Result<()> {
        let mut target_layer = Targets::new().with_default(self.level);

        if self.level < Level::DependencyTrace {
            // Reduce log noise from trusted libraries that we can reasonably assume are working correctly
            target_layer = target_layer
                .with_target("hyper", Level::Info)
                .with_target("h2", Level::Info)
                .with_target("tower", Level::Info)
                .with_target("tonic", Level::Debug)
                .with_target("tokio", Level::Debug)
                .with_target("tokio_util", Level::Debug);
        }

        let registry = tracing_subscriber::registry()
            .with(target_layer)
            .with(tracing_error::ErrorLayer::default());

        match self.fmt {
            Style::Json => registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?,
            Style::Pretty => registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?,
            Style::Compact => registry
                .with(tracing_subscriber::fmt::layer().compact())
                .try_init()?,
            Style::Full => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        }

        Ok(())
    }
}
