//! HTTP Server configuration and startup.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use funding_types::{CancelToken, FundingRepository};

use super::handlers::{self, AppState};
use crate::TrackerService;
use crate::openapi::ApiDoc;

/// HTTP Server for the funding rates API.
pub struct HttpServer<R: FundingRepository> {
    state: Arc<AppState<R>>,
    static_dir: Option<PathBuf>,
}

impl<R: FundingRepository> HttpServer<R> {
    /// Creates a new HTTP server sharing the tracker with the polling loop.
    pub fn new(service: Arc<TrackerService<R>>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            static_dir: None,
        }
    }

    /// Serves a frontend from `dir`, with `index.html` for unknown paths.
    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route(
                "/api/v1/funding-rates",
                get(handlers::get_funding_rates::<R>),
            )
            .route(
                "/api-docs/openapi.json",
                get(|| async { Json(ApiDoc::openapi()) }),
            );

        if let Some(dir) = &self.static_dir {
            let index = ServeFile::new(dir.join("index.html"));
            router = router.fallback_service(ServeDir::new(dir).fallback(index));
        }

        router
            .layer(metrics)
            .layer(cors_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    ///
    /// On Ctrl+C or SIGTERM the tracker is stopped and `cancel` fires before
    /// in-flight requests are drained.
    pub async fn run(self, addr: &str, cancel: CancelToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let service = Arc::clone(&self.state.service);
        let shutdown = async move {
            tokio::select! {
                _ = shutdown_signal() => {},
                _ = cancel.cancelled() => {},
            }
            service.stop();
            cancel.cancel();
        };

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([HeaderName::from(CONTENT_TYPE)])
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
