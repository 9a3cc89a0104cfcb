// src/error.rs
//! Failure taxonomy surfaced by the resilient client.
//!
//! Adapters themselves speak `anyhow`; only the client boundary narrows
//! failures into these variants so the orchestrator can tell "skipped" from
//! "tried and failed".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Breaker is open; the call was never attempted.
    #[error("provider {provider} unavailable: circuit open")]
    Unavailable { provider: String },

    #[error("provider {provider} timed out after {timeout_ms} ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("provider {provider} failed after {attempts} attempt(s): {reason}")]
    Failed {
        provider: String,
        attempts: u32,
        reason: String,
    },
}

/// Marks an adapter error that retrying cannot fix (4xx, malformed payload).
/// The client stops retrying but still counts it against the breaker.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PermanentFailure(pub String);

impl PermanentFailure {
    pub fn new(msg: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(PermanentFailure(msg.into()))
    }
}

pub fn is_permanent(e: &anyhow::Error) -> bool {
    e.chain().any(|c| c.is::<PermanentFailure>())
}

impl ProviderError {
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Unavailable { provider }
            | ProviderError::Timeout { provider, .. }
            | ProviderError::Failed { provider, .. } => provider,
        }
    }

    /// True when the breaker short-circuited the call.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ProviderError::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_provider_and_reason() {
        let e = ProviderError::Failed {
            provider: "lever".into(),
            attempts: 3,
            reason: "HTTP 503".into(),
        };
        let s = e.to_string();
        assert!(s.contains("lever"));
        assert!(s.contains("3 attempt"));
        assert!(s.contains("HTTP 503"));
        assert!(!e.is_unavailable());
        assert_eq!(e.provider(), "lever");
    }

    #[test]
    fn permanent_survives_context() {
        let e = PermanentFailure::new("bad json").context("parsing lever payload");
        assert!(is_permanent(&e));
        let transient = anyhow::anyhow!("connection reset").context("lever get");
        assert!(!is_permanent(&transient));
    }
}
