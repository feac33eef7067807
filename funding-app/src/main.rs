//! # Funding Rate Tracker
//!
//! Binary that wires together all the components:
//! - Load configuration from environment and command line
//! - Initialize the repository adapter
//! - Build the active exchange adapters
//! - Start the tracker loop and the HTTP server

mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use funding_exchanges::build_exchanges;
use funding_hex::{TrackerService, inbound::HttpServer};
use funding_repo::build_repo;
use funding_types::{CancelToken, FundingRepository};

use config::{Config, LogFormat};

#[derive(Parser)]
#[command(name = "funding-server")]
#[command(author, version, about = "Perpetual funding rate tracker", long_about = None)]
struct Cli {
    /// HTTP port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Seconds between fetch cycles (overrides UPDATE_INTERVAL_SECS)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    interval_secs: Option<u64>,

    /// Run one fetch cycle and exit without serving HTTP
    #[arg(long)]
    once: bool,
}

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("funding-tracker"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(secs) = cli.interval_secs {
        config.update_interval = Duration::from_secs(secs);
    }

    // Initialize OpenTelemetry tracing when requested
    let otel = if config.otel_enabled {
        Some(init_tracer()?)
    } else {
        None
    };
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,funding_app=debug,funding_hex=debug".into()),
        )
        .with(fmt_layer)
        .with(telemetry)
        .init();

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    let exchanges = build_exchanges(&config.exchanges)?;
    if exchanges.is_empty() {
        tracing::warn!("no exchanges enabled, cycles will fetch nothing");
    }

    let service = Arc::new(TrackerService::new(repo, exchanges, config.update_interval));
    let cancel = CancelToken::new();

    let result = if cli.once {
        let report = service.fetch_and_store(&cancel).await;
        tracing::info!(
            fetched = report.fetched,
            failed = ?report.failed_exchanges,
            persisted = report.persisted,
            "single cycle finished"
        );
        Ok(())
    } else {
        run(service, &config, cancel).await
    };

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    result
}

/// Runs the tracker loop in the background and serves HTTP until shutdown.
async fn run<R: FundingRepository>(
    service: Arc<TrackerService<R>>,
    config: &Config,
    cancel: CancelToken,
) -> anyhow::Result<()> {
    tracing::info!(
        port = config.port,
        interval_secs = config.update_interval.as_secs(),
        "Starting funding tracker server"
    );

    let tracker = {
        let service = Arc::clone(&service);
        let cancel = cancel.clone();
        tokio::spawn(async move { service.start(cancel).await })
    };

    let server =
        HttpServer::new(Arc::clone(&service)).with_static_dir(config.static_dir.clone());
    let addr = format!("0.0.0.0:{}", config.port);
    let result = server.run(&addr, cancel.clone()).await;

    // Covers a bind or serve failure as well as a normal shutdown.
    service.stop();
    cancel.cancel();
    if let Err(e) = tracker.await {
        tracing::error!(error = %e, "tracker task failed");
    }

    result
}
