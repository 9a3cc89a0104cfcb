// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod acquire;
pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod resilience;
pub mod skills;

pub use crate::acquire::types::{
    AcquisitionRequest, AcquisitionResult, CandidateProfile, JobRecord, Provenance, ScoredJob,
};
pub use crate::acquire::AcquisitionEngine;
pub use crate::api::router;
pub use crate::config::EngineConfig;

use axum::Router;
use tracing::info;

/// Router for `cfg` without the `/metrics` route.
pub fn build_router(cfg: &EngineConfig) -> anyhow::Result<Router> {
    let engine = AcquisitionEngine::from_config(cfg)?;
    info!(
        providers = ?engine.provider_names(),
        fan_out = cfg.acquire.fan_out,
        "acquisition engine ready"
    );
    Ok(api::router(api::AppState::new(engine)))
}

/// Full app as the binary serves it: config from the default locations,
/// the API routes and `/metrics`.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = config::load_default()?;
    let metrics = metrics::Metrics::init(cfg.acquire.request_deadline_ms)?;
    Ok(build_router(&cfg)?.merge(metrics.router()))
}
