//! Tracing subscriber and optional Prometheus recorder for the CLI.

use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, prelude::*};

use crate::cli::TelemetryOptions;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Keeps the subscriber installed for as long as the command runs.
pub(crate) struct TelemetryGuard {
    _default_guard: tracing::subscriber::DefaultGuard,
    metrics: Option<&'static PrometheusHandle>,
}

impl TelemetryGuard {
    /// Render collected metrics to stderr when `--metrics` was given.
    pub(crate) fn dump_metrics(&self) {
        if let Some(handle) = self.metrics {
            eprintln!("{}", handle.render());
        }
    }
}

/// Install the global metrics recorder once and return its handle.
fn init_metrics_recorder() -> Option<&'static PrometheusHandle> {
    if let Some(handle) = PROM_HANDLE.get() {
        return Some(handle);
    }
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    if let Err(err) = metrics::set_global_recorder(recorder) {
        tracing::warn!("metrics recorder already installed: {err}");
        return None;
    }
    Some(PROM_HANDLE.get_or_init(|| handle))
}

/// Install tracing for the current thread. Logs go to stderr so command
/// output on stdout stays machine-readable.
pub(crate) fn enter_runtime(opts: &TelemetryOptions) -> TelemetryGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let default_guard = tracing::subscriber::set_default(
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr)
                    .with_filter(env_filter),
            )
            .with(tracing_error::ErrorLayer::default()),
    );

    let metrics = if opts.metrics {
        init_metrics_recorder()
    } else {
        None
    };

    TelemetryGuard {
        _default_guard: default_guard,
        metrics,
    }
}
