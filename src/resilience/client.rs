// src/resilience/client.rs
//! Breaker-gated call wrapper with per-attempt timeout and exponential backoff.
//!
//! Every outcome is written back to the shared `CircuitBreaker`, so concurrent
//! requests using the same provider name see each other's failures.

use metrics::counter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::{is_permanent, ProviderError};
use crate::resilience::breaker::CircuitBreaker;

/// Added on top of the request timeout so reqwest's own per-request timeout
/// fires first and multi-request adapters can keep their partial results.
const ATTEMPT_GRACE: Duration = Duration::from_millis(250);

#[derive(Clone)]
pub struct ResilientClient {
    http: reqwest::Client,
    breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
    attempt_timeout: Duration,
}

impl ResilientClient {
    /// Build the shared reqwest client (connect + total timeout) around `breaker`.
    pub fn new(cfg: &HttpConfig, breaker: Arc<CircuitBreaker>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.request_timeout())
            .build()?;
        Ok(Self {
            http,
            breaker,
            max_retries: cfg.max_retries,
            base_delay: cfg.base_delay(),
            attempt_timeout: cfg.request_timeout() + ATTEMPT_GRACE,
        })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Total attempts per call (`max_retries + 1`).
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `op` for `provider`, retrying transient failures.
    ///
    /// Fails fast with `ProviderError::Unavailable` when the circuit is open.
    /// A success anywhere records success; exhausting the attempts (or hitting
    /// a permanent failure) records exactly one failure.
    pub async fn call<T, F, Fut>(&self, provider: &str, mut op: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        if self.breaker.is_open(provider) {
            counter!("provider_calls_total", "provider" => provider.to_string(), "outcome" => "skipped")
                .increment(1);
            debug!(target: "resilience", provider, "circuit open, skipping");
            return Err(ProviderError::Unavailable {
                provider: provider.to_string(),
            });
        }

        let attempts = self.attempts();
        let mut last_reason = String::new();
        let mut timed_out = false;
        let mut used = 0u32;

        for attempt in 0..attempts {
            used = attempt + 1;
            match tokio::time::timeout(self.attempt_timeout, op()).await {
                Ok(Ok(value)) => {
                    self.breaker.record_success(provider);
                    counter!("provider_calls_total", "provider" => provider.to_string(), "outcome" => "ok")
                        .increment(1);
                    return Ok(value);
                }
                Ok(Err(e)) => {
                    timed_out = false;
                    last_reason = format!("{e:#}");
                    warn!(target: "resilience", provider, attempt, error = %last_reason, "provider attempt failed");
                    if is_permanent(&e) {
                        break;
                    }
                }
                Err(_) => {
                    timed_out = true;
                    last_reason = format!("timed out after {} ms", self.attempt_timeout.as_millis());
                    warn!(target: "resilience", provider, attempt, "provider attempt timed out");
                }
            }

            if attempt + 1 < attempts {
                counter!("provider_retries_total", "provider" => provider.to_string()).increment(1);
                tokio::time::sleep(self.backoff(attempt)).await;
            }
        }

        self.breaker.record_failure(provider);
        counter!("provider_calls_total", "provider" => provider.to_string(), "outcome" => "failed")
            .increment(1);

        if timed_out {
            Err(ProviderError::Timeout {
                provider: provider.to_string(),
                timeout_ms: self.attempt_timeout.as_millis() as u64,
            })
        } else {
            Err(ProviderError::Failed {
                provider: provider.to_string(),
                attempts: used,
                reason: last_reason,
            })
        }
    }

    /// `base_delay * 2^attempt`
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}
