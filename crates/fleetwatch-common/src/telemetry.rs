use std::collections::HashMap;

use opentelemetry::trace::TracerProvider as TracerProviderTrait;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where spans go besides the console.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig<'a> {
    pub service_name: &'a str,
    /// OTLP/HTTP base URL; the exporter appends `/v1/traces`.
    pub otlp_endpoint: Option<&'a str>,
    pub otlp_token: Option<&'a str>,
}

/// Install the global subscriber: `RUST_LOG`-driven output on stderr, plus
/// span export when `otlp_endpoint` is set.
///
/// Keep the returned provider until exit and call `shutdown()` on it, or the
/// last batch of spans is lost.
pub fn init_tracing(config: TelemetryConfig<'_>) -> Option<TracerProvider> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (provider, exporter_error) = match config.otlp_endpoint.map(|e| span_provider(&config, e)) {
        Some(Ok(provider)) => (Some(provider), None),
        Some(Err(err)) => (None, Some(err)),
        None => (None, None),
    };
    let otel_layer = provider.as_ref().map(|p| {
        tracing_opentelemetry::layer().with_tracer(p.tracer(config.service_name.to_string()))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(otel_layer)
        .init();

    match (&provider, exporter_error) {
        (Some(_), _) => {
            tracing::info!(endpoint = config.otlp_endpoint, service = config.service_name, "span export on")
        }
        (None, Some(error)) => tracing::warn!(%error, "span exporter unavailable, console logging only"),
        (None, None) => {}
    }
    provider
}

fn span_provider(config: &TelemetryConfig<'_>, endpoint: &str) -> Result<TracerProvider, String> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .with_headers(auth_headers(config.otlp_token))
        .build()
        .map_err(|e| e.to_string())?;
    let resource = Resource::new([KeyValue::new("service.name", config.service_name.to_string())]);
    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(resource)
        .build())
}

fn auth_headers(token: Option<&str>) -> HashMap<String, String> {
    token
        .filter(|t| !t.is_empty())
        .map(|t| ("Authorization".to_string(), format!("Bearer {t}")))
        .into_iter()
        .collect()
}
