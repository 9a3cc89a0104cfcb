// src/config/mod.rs
//! Engine configuration: breaker thresholds, HTTP timeouts, orchestration
//! limits and provider wiring. Every field has a default so a missing or
//! partial file still yields a usable engine.

pub mod load;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use load::{load_default, load_from, ENV_CONFIG_PATH};

pub const DEFAULT_USER_AGENT: &str =
    "job-match-engine/0.1 (+https://github.com/job-match-engine/job-match-engine)";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub breaker: BreakerConfig,
    pub http: HttpConfig,
    pub acquire: AcquireConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures before a provider's circuit opens.
    pub failure_threshold: u32,
    /// Seconds an open circuit waits before admitting a trial call.
    pub open_timeout_secs: u64,
    /// Admit a single trial call while half-open (otherwise every caller passes).
    pub strict_half_open: bool,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            open_timeout_secs: 60,
            strict_half_open: true,
        }
    }
}

impl BreakerConfig {
    pub fn open_timeout(&self) -> Duration {
        Duration::from_secs(self.open_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_ms: u64,
    /// Total budget for one attempt (connect + body).
    pub request_timeout_ms: u64,
    pub max_retries: u32,
    /// Backoff before retry `n` is `base_delay_ms * 2^n`.
    pub base_delay_ms: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            request_timeout_ms: 12_000,
            max_retries: 2,
            base_delay_ms: 1_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquireConfig {
    /// Caller-facing deadline for the whole provider walk.
    pub request_deadline_ms: u64,
    /// Query all enabled providers concurrently instead of in priority order.
    pub fan_out: bool,
    pub default_location: String,
    /// How many times the synthetic generator may be asked to refill after dedup.
    pub max_topup_rounds: u32,
    pub synthetic_url_base: String,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            request_deadline_ms: 25_000,
            fan_out: false,
            default_location: "US".to_string(),
            max_topup_rounds: 3,
            synthetic_url_base: "https://www.linkedin.com/jobs/view".to_string(),
        }
    }
}

impl AcquireConfig {
    pub fn request_deadline(&self) -> Duration {
        Duration::from_millis(self.request_deadline_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Greenhouse board tokens, e.g. `stripe` → boards-api.greenhouse.io/v1/boards/stripe/jobs
    pub greenhouse_boards: Vec<String>,
    /// Lever site names, e.g. `netflix` → api.lever.co/v0/postings/netflix
    pub lever_companies: Vec<String>,
    /// Provider names to skip entirely.
    pub disabled: Vec<String>,
    /// "ENV" or empty means read `RAPIDAPI_KEY`.
    pub rapidapi_key: Option<String>,
    /// "ENV" or empty means read `USAJOBS_API_KEY`.
    pub usajobs_key: Option<String>,
    pub usajobs_contact: String,
    pub endpoints: Endpoints,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            greenhouse_boards: vec!["stripe".into(), "reddit".into(), "airbnb".into()],
            lever_companies: vec!["uber".into(), "netflix".into(), "spotify".into()],
            disabled: Vec::new(),
            rapidapi_key: None,
            usajobs_key: None,
            usajobs_contact: "jobs@example.com".to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

impl ProvidersConfig {
    /// Case-insensitive match against the `disabled` list.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.iter().any(|d| d.eq_ignore_ascii_case(name))
    }
}

/// Upstream base URLs. Overridable so tests can point adapters at a mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub jsearch: String,
    pub linkedin_rapidapi: String,
    pub usajobs: String,
    pub greenhouse: String,
    pub lever: String,
    pub arbeitnow: String,
    pub jobicy: String,
    pub remoteok: String,
    pub weworkremotely: String,
    pub authenticjobs: String,
    pub indeed: String,
    pub linkedin_public: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            jsearch: "https://jsearch.p.rapidapi.com".into(),
            linkedin_rapidapi: "https://linkedin-job-search-api.p.rapidapi.com".into(),
            usajobs: "https://data.usajobs.gov".into(),
            greenhouse: "https://boards-api.greenhouse.io".into(),
            lever: "https://api.lever.co".into(),
            arbeitnow: "https://www.arbeitnow.com".into(),
            jobicy: "https://jobicy.com".into(),
            remoteok: "https://remoteok.com".into(),
            weworkremotely: "https://weworkremotely.com".into(),
            authenticjobs: "https://authenticjobs.com".into(),
            indeed: "https://www.indeed.com".into(),
            linkedin_public: "https://www.linkedin.com".into(),
        }
    }
}
