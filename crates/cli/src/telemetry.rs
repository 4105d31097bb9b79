//! Logging and trace export wiring.
//!
//! `RUST_LOG` controls filtering (default `info`). When an OTLP endpoint is
//! configured, spans are batched and exported over gRPC from a dedicated
//! single-worker runtime so the export path never shares threads with the
//! webhook dispatcher.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use tokio::runtime::Runtime;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const SERVICE_NAME: &str = "message-webhook";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Keeps the exporter alive until [`Telemetry::shutdown`].
pub struct Telemetry {
    exporter: Option<(TracerProvider, Runtime)>,
}

impl Telemetry {
    /// Flushes pending spans and stops the export runtime.
    pub fn shutdown(self) {
        if let Some((provider, runtime)) = self.exporter {
            if let Err(error) = provider.shutdown() {
                warn!(%error, "Failed to flush trace exporter");
            }
            runtime.shutdown_timeout(Duration::from_secs(1));
        }
    }
}

pub fn init(format: LogFormat, otlp_endpoint: Option<&str>) -> anyhow::Result<Telemetry> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let exporter = otlp_endpoint.map(build_exporter).transpose()?;
    let otel_layer = exporter.as_ref().map(|(provider, _)| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME))
    });

    let registry = tracing_subscriber::registry().with(filter).with(otel_layer);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
    }
    .context("installing tracing subscriber")?;

    Ok(Telemetry { exporter })
}

fn build_exporter(endpoint: &str) -> anyhow::Result<(TracerProvider, Runtime)> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("telemetry-export")
        .enable_all()
        .build()
        .context("building telemetry runtime")?;

    // The tonic channel and batch processor spawn onto the current runtime.
    let guard = runtime.enter();
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("building OTLP span exporter")?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new("service.name", SERVICE_NAME)]))
        .build();

    drop(guard);
    Ok((provider, runtime))
}
