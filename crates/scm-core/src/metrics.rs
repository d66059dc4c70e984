//! Metrics for the datanode registry core.
//!
//! A thin wrapper around a `prometheus::Registry` exposing the counters and
//! gauges named in the registry's observable surface. This crate does not
//! stand up an HTTP exporter; `scm-server` owns exposing `/metrics` against
//! the shared [`prometheus::Registry`] returned by [`RegistryMetrics::registry`].

use crate::config::MetricsConfig;
use prometheus::{Counter, CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Prometheus-backed counters and gauges for the node registry.
#[derive(Clone)]
pub struct RegistryMetrics {
    enabled: bool,
    registry: Arc<Registry>,
    /// Heartbeats for which the identity was unknown (§4.4 step 1).
    hb_processing_failed: Counter,
    /// All heartbeats accepted for a known identity.
    heartbeats_total: Counter,
    /// Commands enqueued, labeled by command type.
    commands_enqueued_total: CounterVec,
    /// Current node counts, labeled by health state.
    nodes_total: GaugeVec,
    /// Scanner ticks skipped while paused (§4.2 test hook).
    scanner_skipped_checks_total: Counter,
}

impl RegistryMetrics {
    /// Builds a fresh metrics set registered against a new `Registry`.
    pub fn new(config: &MetricsConfig) -> Self {
        let registry = Registry::new();

        let hb_processing_failed = Counter::with_opts(Opts::new(
            "scm_hb_processing_failed_total",
            "Heartbeats rejected because the identity was not registered",
        ))
        .expect("static metric opts");
        let heartbeats_total = Counter::with_opts(Opts::new(
            "scm_heartbeats_total",
            "Heartbeats accepted for a known datanode identity",
        ))
        .expect("static metric opts");
        let commands_enqueued_total = CounterVec::new(
            Opts::new(
                "scm_commands_enqueued_total",
                "Commands enqueued onto a datanode's command queue",
            ),
            &["command_type"],
        )
        .expect("static metric opts");
        let nodes_total = GaugeVec::new(
            Opts::new("scm_nodes_total", "Datanodes currently tracked, by health state"),
            &["health"],
        )
        .expect("static metric opts");
        let scanner_skipped_checks_total = Counter::with_opts(Opts::new(
            "scm_scanner_skipped_checks_total",
            "Scanner ticks skipped while the scanner was paused",
        ))
        .expect("static metric opts");

        if config.enabled {
            registry
                .register(Box::new(hb_processing_failed.clone()))
                .expect("single registration");
            registry
                .register(Box::new(heartbeats_total.clone()))
                .expect("single registration");
            registry
                .register(Box::new(commands_enqueued_total.clone()))
                .expect("single registration");
            registry
                .register(Box::new(nodes_total.clone()))
                .expect("single registration");
            registry
                .register(Box::new(scanner_skipped_checks_total.clone()))
                .expect("single registration");
        }

        Self {
            enabled: config.enabled,
            registry: Arc::new(registry),
            hb_processing_failed,
            heartbeats_total,
            commands_enqueued_total,
            nodes_total,
            scanner_skipped_checks_total,
        }
    }

    /// The underlying `prometheus::Registry`, for exporters to scrape.
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Renders the current metrics in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let families = self.registry.gather();
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buf)
            .expect("text encoding never fails for valid metric families");
        String::from_utf8(buf).expect("prometheus text output is valid utf-8")
    }

    pub fn record_hb_processing_failed(&self) {
        if self.enabled {
            self.hb_processing_failed.inc();
        }
    }

    pub fn record_heartbeat(&self) {
        if self.enabled {
            self.heartbeats_total.inc();
        }
    }

    pub fn record_command_enqueued(&self, command_type: &str) {
        if self.enabled {
            self.commands_enqueued_total
                .with_label_values(&[command_type])
                .inc();
        }
    }

    pub fn set_nodes_total(&self, health: &str, count: f64) {
        if self.enabled {
            self.nodes_total.with_label_values(&[health]).set(count);
        }
    }

    pub fn record_scanner_skipped(&self) {
        if self.enabled {
            self.scanner_skipped_checks_total.inc();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_metric_names() {
        let metrics = RegistryMetrics::new(&MetricsConfig { enabled: true });
        metrics.record_heartbeat();
        metrics.record_command_enqueued("closePipelineCommand");
        let text = metrics.render();
        assert!(text.contains("scm_heartbeats_total"));
        assert!(text.contains("scm_commands_enqueued_total"));
    }

    #[test]
    fn disabled_metrics_are_no_ops() {
        let metrics = RegistryMetrics::new(&MetricsConfig { enabled: false });
        metrics.record_heartbeat();
        assert!(metrics.render().is_empty());
    }
}
