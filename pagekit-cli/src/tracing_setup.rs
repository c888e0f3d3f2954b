//! Log and trace output for the `pagekit` binary
//!
//! Console output is always on. `--otel` adds an OTLP span exporter when the
//! binary is built with the `telemetry` feature; the endpoint and service
//! name come from `OTEL_EXPORTER_OTLP_ENDPOINT` / `OTEL_SERVICE_NAME`.
//! `RUST_LOG` overrides the built-in directives entirely.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset. sqlx stays at `warn` in both.
const QUIET: &str = "info,sqlx=warn";
const VERBOSE: &str = "info,pagekit=debug,pagekit_server=debug,tower_http=debug,sqlx=warn";

/// What the user asked for on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConfig {
    pub debug: bool,
    pub otel: bool,
}

impl TracingConfig {
    fn directives(self) -> &'static str {
        if self.debug {
            VERBOSE
        } else {
            QUIET
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()))
    }
}

/// Where spans are exported when `--otel` is on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtlpTarget {
    pub endpoint: String,
    pub service_name: String,
}

impl OtlpTarget {
    const DEFAULT_ENDPOINT: &'static str = "http://localhost:4317";
    const DEFAULT_SERVICE: &'static str = "pagekit";

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|| Self::DEFAULT_ENDPOINT.to_owned()),
            service_name: non_empty("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| Self::DEFAULT_SERVICE.to_owned()),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Flushes exported spans when dropped; hold it for the life of `main`.
#[must_use = "dropping the guard stops span export"]
pub struct Telemetry {
    exporting: bool,
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        if self.exporting {
            flush_spans();
        }
    }
}

#[cfg(feature = "telemetry")]
fn flush_spans() {
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(not(feature = "telemetry"))]
fn flush_spans() {}

/// Install the global subscriber.
pub fn init(config: TracingConfig) -> Result<Telemetry> {
    if config.otel {
        return with_otlp(config, OtlpTarget::from_env());
    }

    tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(Telemetry { exporting: false })
}

#[cfg(feature = "telemetry")]
fn with_otlp(config: TracingConfig, target: OtlpTarget) -> Result<Telemetry> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&target.endpoint)
        .build()
        .map_err(|e| anyhow!("OTLP exporter for {}: {e}", target.endpoint))?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(opentelemetry_sdk::Resource::new(vec![KeyValue::new(
            "service.name",
            target.service_name.clone(),
        )]))
        .build();
    let tracer = provider.tracer("pagekit");

    // the global keeps the provider alive until Telemetry drops
    let _ = opentelemetry::global::set_tracer_provider(provider);

    tracing_subscriber::registry()
        .with(config.filter())
        .with(tracing_subscriber::fmt::layer().with_target(config.debug).compact())
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()
        .map_err(|err| anyhow!(err))?;

    tracing::info!(
        endpoint = %target.endpoint,
        service = %target.service_name,
        "exporting spans over OTLP"
    );

    Ok(Telemetry { exporting: true })
}

#[cfg(not(feature = "telemetry"))]
fn with_otlp(config: TracingConfig, target: OtlpTarget) -> Result<Telemetry> {
    let guard = init(TracingConfig { otel: false, ..config })?;
    tracing::warn!(
        endpoint = %target.endpoint,
        "--otel ignored: built without the `telemetry` feature"
    );
    Ok(guard)
}
