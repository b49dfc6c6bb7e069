//! Tracing setup for the registry binaries
//!
//! Console output is human-readable or JSON, optionally mirrored to a rolling file, and
//! spans can be exported over OTLP when `logging.opentelemetry_enabled` is set.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{Sampler, TracerProvider},
    Resource,
};
use std::fs;
use std::time::Duration;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Keeps the file writer and the tracer provider alive. Drop flushes both.
pub struct TelemetryGuard {
    _file_guard: Option<WorkerGuard>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        shutdown_telemetry();
    }
}

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `logging.level`. A failing OTLP exporter is
/// reported once and logging continues without it.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<TelemetryGuard> {
    let (tracer_provider, otel_error) = if config.opentelemetry_enabled {
        match init_tracer_provider(config) {
            Ok(provider) => (Some(provider), None),
            Err(e) => (None, Some(e.to_string())),
        }
    } else {
        (None, None)
    };

    let filter = env_filter(config);

    let file_guard = match &tracer_provider {
        Some(provider) => {
            let otel_layer = tracing_opentelemetry::layer()
                .with_tracer(provider.tracer("cde-registry"))
                .with_tracked_inactivity(true);
            let subscriber = tracing_subscriber::registry().with(filter).with(otel_layer);
            install(subscriber, config)?
        }
        None => install(tracing_subscriber::registry().with(filter), config)?,
    };

    if let Some(provider) = tracer_provider {
        global::set_tracer_provider(provider);
    }

    if let Some(error) = otel_error {
        tracing::warn!(%error, "OpenTelemetry exporter unavailable, spans stay local");
    }

    tracing::info!(
        level = %config.level,
        json = config.json,
        file = config.file_enabled,
        otel = config.opentelemetry_enabled,
        service_name = %config.service_name,
        "Logging initialized"
    );

    Ok(TelemetryGuard {
        _file_guard: file_guard,
    })
}

/// Flush pending spans to the collector.
pub fn shutdown_telemetry() {
    global::shutdown_tracer_provider();
}

fn init_tracer_provider(config: &LoggingConfig) -> anyhow::Result<TracerProvider> {
    use opentelemetry_sdk::trace::Config;

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(&config.otlp_endpoint)
        .with_timeout(Duration::from_secs(config.otlp_timeout_seconds))
        .build_span_exporter()
        .map_err(|e| anyhow::anyhow!("Failed to create OTLP exporter: {}", e))?;

    let sampler = match config.trace_sample_ratio {
        r if r >= 1.0 => Sampler::AlwaysOn,
        r if r <= 0.0 => Sampler::AlwaysOff,
        r => Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(r))),
    };

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_config(
            Config::default()
                .with_sampler(sampler)
                .with_resource(resource(config)),
        )
        .build();

    Ok(provider)
}

fn resource(config: &LoggingConfig) -> Resource {
    let version = config
        .service_version
        .clone()
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", version),
        KeyValue::new(
            "deployment.environment",
            config.deployment_environment.clone(),
        ),
    ])
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "cde_server={level},cde_registry={level},cde_module={level},cde_module_source={level},tower_http=info,sqlx=warn",
            level = config.level.to_ascii_lowercase()
        ))
    })
}

fn install<S>(subscriber: S, config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>>
where
    S: SubscriberExt + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    if config.json {
        let console = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stdout);
        if config.file_enabled {
            let (writer, guard) = file_writer(config)?;
            let file = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(writer);
            subscriber.with(console).with(file).init();
            Ok(Some(guard))
        } else {
            subscriber.with(console).init();
            Ok(None)
        }
    } else {
        let console = fmt::layer().with_target(true).with_writer(std::io::stdout);
        if config.file_enabled {
            let (writer, guard) = file_writer(config)?;
            let file = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer);
            subscriber.with(console).with(file).init();
            Ok(Some(guard))
        } else {
            subscriber.with(console).init();
            Ok(None)
        }
    }
}

fn file_writer(config: &LoggingConfig) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(&config.file_directory)?;

    let dir = &config.file_directory;
    let prefix = &config.file_prefix;
    let appender = match config.file_rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(dir, prefix),
        "minutely" => tracing_appender::rolling::minutely(dir, prefix),
        "never" => tracing_appender::rolling::never(dir, format!("{prefix}.log")),
        _ => tracing_appender::rolling::daily(dir, prefix),
    };

    Ok(tracing_appender::non_blocking(appender))
}
