use axum::{Router, routing::get, routing::post};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use obs_proxy::AppState;
use obs_proxy::catalog::Catalog;
use obs_proxy::handlers;
use obs_proxy::prom::PromClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("obs_proxy=debug,tower_http=debug")
        }))
        .init();

    let prom_url =
        std::env::var("PROM_URL").unwrap_or_else(|_| "http://localhost:9090".to_string());
    let queries_file =
        std::env::var("OBS_QUERIES_FILE").unwrap_or_else(|_| "./queries.yaml".to_string());

    tracing::info!("resolved PROM_URL={prom_url}");
    tracing::info!("query catalog at {queries_file}");

    let state = AppState {
        prom: Arc::new(PromClient::new(prom_url)),
        catalog: Arc::new(Catalog::new(queries_file)),
    };

    let app = Router::new()
        .route("/observations", post(handlers::observations::observations))
        .route("/healthz", get(handlers::health::healthz))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    tracing::info!("obs-proxy listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
