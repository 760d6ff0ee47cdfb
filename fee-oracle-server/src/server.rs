use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use crate::{
    api::{get_fee_for_tier, get_fees},
    service::FeeCollector,
};

/// Routes answered from the collector's latest fee estimate
fn fee_routes() -> Router<Arc<FeeCollector>> {
    Router::new()
        .route("/fees", get(get_fees))
        .route("/fees/tier/:name", get(get_fee_for_tier))
}

/// Create the Axum application router
pub fn create_app(collector: Arc<FeeCollector>) -> Router {
    Router::new()
        .merge(fee_routes())
        .route("/health", get(health_check))
        .with_state(collector)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Serve the fee API for `collector` until CTRL+C
pub async fn run_server(
    collector: Arc<FeeCollector>,
    host: String,
    port: u16,
) -> Result<(), std::io::Error> {
    let tiers = collector
        .fee_estimator()
        .config()
        .tiers
        .iter()
        .map(|tier| tier.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let app = create_app(collector);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("HTTP server listening on http://{}", addr);
    info!("  GET /fees - Recommendations for every tier");
    info!("  GET /fees/tier/{{name}} - One of: {}", tiers);
    info!("  GET /health - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }

    info!("Received shutdown signal, shutting down gracefully...");
}
