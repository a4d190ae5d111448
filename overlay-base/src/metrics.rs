use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tokio::task::JoinHandle;

/// Metric namespace prefix shared by all overlay agents.
pub const NAMESPACE: &str = "seda_overlay";

/// Metrics registry for one agent process.
pub struct CoreMetrics {
    agent_name: String,
    registry: Registry,
    listen_port: Option<u16>,
    const_labels: HashMap<String, String>,
}

impl Debug for CoreMetrics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CoreMetrics {{ agent_name: {}, listen_port: {:?} }}",
            self.agent_name, self.listen_port
        )
    }
}

impl CoreMetrics {
    /// Track metrics for a particular agent name.
    ///
    /// - `for_agent` name of the agent these metrics are tracking.
    /// - `listen_port` port to start the HTTP server on. If None the server
    ///   will not be started.
    /// - `registry` prometheus registry to attach the metrics to
    pub fn new(
        for_agent: &str,
        listen_port: Option<u16>,
        registry: Registry,
    ) -> prometheus::Result<Self> {
        let mut const_labels = HashMap::new();
        const_labels.insert("agent".to_string(), for_agent.to_string());

        Ok(Self {
            agent_name: for_agent.to_string(),
            registry,
            listen_port,
            const_labels,
        })
    }

    /// Create and register an int counter vec in the agent namespace.
    pub fn new_int_counter_vec(
        &self,
        metric_name: &str,
        help: &str,
        labels: &[&str],
    ) -> prometheus::Result<IntCounterVec> {
        let counter = IntCounterVec::new(
            Opts::new(format!("{NAMESPACE}_{metric_name}"), help)
                .const_labels(self.const_labels.clone()),
            labels,
        )?;
        self.registry.register(Box::new(counter.clone()))?;
        Ok(counter)
    }

    /// Create and register an int gauge in the agent namespace.
    pub fn new_int_gauge(&self, metric_name: &str, help: &str) -> prometheus::Result<IntGauge> {
        let gauge = IntGauge::with_opts(
            Opts::new(format!("{NAMESPACE}_{metric_name}"), help)
                .const_labels(self.const_labels.clone()),
        )?;
        self.registry.register(Box::new(gauge.clone()))?;
        Ok(gauge)
    }

    /// Gather all metrics in the text exposition format.
    pub fn gather(&self) -> prometheus::Result<Vec<u8>> {
        let collected_metrics = self.registry.gather();
        let mut out_buf = Vec::with_capacity(1024 * 64);
        let encoder = TextEncoder::new();
        encoder.encode(&collected_metrics, &mut out_buf)?;
        Ok(out_buf)
    }

    /// Run an HTTP server serving OpenMetrics format reports on `/metrics`.
    ///
    /// This is compatible with Prometheus, which ought to be configured to
    /// scrape me!
    pub fn run_http_server(self: Arc<Self>) -> JoinHandle<()> {
        use warp::Filter;
        if let Some(port) = self.listen_port {
            tracing::info!(port, "starting prometheus server on 0.0.0.0:{port}");
            tokio::spawn(async move {
                warp::serve(
                    warp::path!("metrics")
                        .map(move || {
                            warp::reply::with_header(
                                self.gather().expect("failed to encode metrics"),
                                "Content-Type",
                                "text/plain; charset=utf-8",
                            )
                        })
                        .or(warp::any().map(|| {
                            warp::reply::with_status(
                                "go look at /metrics",
                                warp::http::StatusCode::NOT_FOUND,
                            )
                        })),
                )
                .run(([0, 0, 0, 0], port))
                .await;
            })
        } else {
            tracing::info!("not starting prometheus server");
            tokio::spawn(std::future::ready(()))
        }
    }

    /// Get the name of this agent, e.g. "dispatcher"
    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn registered_metrics_show_up_in_the_report() {
        let metrics = CoreMetrics::new("test", None, Registry::new()).unwrap();
        let counter = metrics
            .new_int_counter_vec("ops_total", "Operations processed", &["outcome"])
            .unwrap();
        counter.with_label_values(&["success"]).inc();

        let report = String::from_utf8(metrics.gather().unwrap()).unwrap();
        assert!(report.contains("seda_overlay_ops_total"));
        assert!(report.contains("agent=\"test\""));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let metrics = CoreMetrics::new("test", None, Registry::new()).unwrap();
        metrics.new_int_gauge("queued", "Queued submissions").unwrap();
        assert!(metrics.new_int_gauge("queued", "Queued submissions").is_err());
    }
}
