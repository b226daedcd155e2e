//! HTTP boundary.
//!
//! One POST route per analytic plus a health probe. Engine failures are
//! returned as `{"error": "<message>"}` bodies with a normal 200 status;
//! callers branch on the presence of the `error` key, not on status codes.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, DataConfig};

pub mod handlers;

/// Shared application state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub data: DataConfig,
}

/// Configure and run the server until the listener fails.
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        data: config.data.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(handlers::health))
        .route("/forecast", post(handlers::forecast))
        .route("/elasticity", post(handlers::elasticity))
        .route("/roi", post(handlers::roi))
        .route("/simulate", post(handlers::simulate))
        .route("/analyze", post(handlers::analyze))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("insight-engines listening on http://{}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
