// src/api.rs
//! HTTP glue over the acquisition engine.

use std::sync::Arc;

use shuttle_axum::axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::acquire::types::AcquisitionRequest;
use crate::acquire::AcquisitionEngine;
use crate::resilience::ProviderState;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AcquisitionEngine>,
}

impl AppState {
    pub fn new(engine: AcquisitionEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/jobs/acquire", post(acquire))
        .route("/debug/breakers", get(debug_breakers))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn acquire(
    State(state): State<AppState>,
    Json(req): Json<AcquisitionRequest>,
) -> impl IntoResponse {
    let result = state.engine.acquire(&req).await;
    ([(header::CACHE_CONTROL, "no-store")], Json(result))
}

/// Every configured provider (closed when never called) plus any other
/// name the breaker has seen.
async fn debug_breakers(State(state): State<AppState>) -> Json<Vec<ProviderState>> {
    let breaker = state.engine.breaker();
    let mut out: Vec<ProviderState> = state
        .engine
        .provider_names()
        .into_iter()
        .map(|name| breaker.state(name))
        .collect();
    for s in breaker.snapshot() {
        if !out.iter().any(|o| o.name == s.name) {
            out.push(s);
        }
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Json(out)
}
