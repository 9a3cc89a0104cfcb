// src/acquire/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use crate::skills::CandidateProfile;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub description: String,
    pub source: String, // adapter name, e.g. "greenhouse", "synthetic"
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredJob {
    #[serde(flatten)]
    pub job: JobRecord,
    pub match_score: u8,
    pub why_fit: Vec<String>,
    pub gaps: Vec<String>,
    pub fix_actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcquisitionRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_desired_count")]
    pub desired_count: usize,
    #[serde(default)]
    pub candidate_profile: CandidateProfile,
    /// Raw resume text; falls back to the flattened profile when absent.
    #[serde(default)]
    pub resume_text: Option<String>,
}

fn default_desired_count() -> usize {
    20
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provenance {
    pub primary_source: String,
    pub total_count: usize,
    /// Records contributed per source, after dedup.
    #[serde(default)]
    pub sources: BTreeMap<String, usize>,
    #[serde(default)]
    pub synthetic_count: usize,
    /// Providers not attempted (disabled, unconfigured or circuit open).
    #[serde(default)]
    pub skipped: Vec<String>,
    /// Providers attempted that failed after retries.
    #[serde(default)]
    pub failed: Vec<String>,
    #[serde(default)]
    pub deadline_hit: bool,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcquisitionResult {
    pub items: Vec<ScoredJob>,
    pub provenance: Provenance,
}

/// Normalized search handed to every adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub location: String,
    pub limit: usize,
}

/// Adapter priority, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderTier {
    Partner,
    Aggregator,
    Feed,
}

#[async_trait::async_trait]
pub trait JobProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn tier(&self) -> ProviderTier;
    /// False when required credentials are missing; the engine skips it
    /// without touching the breaker.
    fn is_enabled(&self) -> bool {
        true
    }
    /// One attempt: fetch and parse. Retries live in the resilient client.
    async fn fetch(&self, query: &SearchQuery, http: &reqwest::Client) -> Result<Vec<JobRecord>>;
}
