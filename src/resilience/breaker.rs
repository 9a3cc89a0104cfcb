// src/resilience/breaker.rs
//! Per-provider circuit breaker.
//!
//! ```text
//! closed    --(failures >= threshold)-->  open
//! open      --(timeout elapsed, checked by is_open)--> half-open
//! half-open --(success)--> closed
//! half-open --(failure)--> open (opened_at = now)
//! ```
//!
//! One map guarded by one mutex: every transition, including the
//! `open → half-open` check, happens under the lock. A provider with no
//! history behaves as closed.

use metrics::counter;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::BreakerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        }
    }
}

/// Source of "now". Swappable so tests can move time without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Read-only view of one provider's breaker.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderState {
    pub name: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    #[serde(skip)]
    pub opened_at: Option<Instant>,
    /// Seconds since the circuit last opened, if it is open or half-open.
    pub open_for_secs: Option<f64>,
}

#[derive(Debug, Clone)]
struct Circuit {
    state: CircuitState,
    failures: u32,
    opened_at: Option<Instant>,
    // Set when a half-open trial is admitted (strict mode only).
    trial_started_at: Option<Instant>,
}

impl Default for Circuit {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            opened_at: None,
            trial_started_at: None,
        }
    }
}

pub struct CircuitBreaker {
    threshold: u32,
    timeout: Duration,
    strict_half_open: bool,
    clock: Arc<dyn Clock>,
    circuits: Mutex<HashMap<String, Circuit>>,
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("threshold", &self.threshold)
            .field("timeout", &self.timeout)
            .field("strict_half_open", &self.strict_half_open)
            .finish()
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(&BreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(cfg: &BreakerConfig) -> Self {
        Self::with_clock(cfg, Arc::new(SystemClock))
    }

    pub fn with_clock(cfg: &BreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            threshold: cfg.failure_threshold.max(1),
            timeout: cfg.open_timeout(),
            strict_half_open: cfg.strict_half_open,
            clock,
            circuits: Mutex::new(HashMap::new()),
        }
    }

    // A panic while holding the lock must not take every provider down with it.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Circuit>> {
        self.circuits.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// True when calls to `provider` should be skipped.
    ///
    /// An open circuit whose timeout has elapsed flips to half-open and lets
    /// this caller through as the trial. In strict mode further callers are
    /// refused until the trial resolves (or itself exceeds the timeout, which
    /// covers a trial that was cancelled and never reported back).
    pub fn is_open(&self, provider: &str) -> bool {
        let now = self.clock.now();
        let mut map = self.lock();
        let Some(c) = map.get_mut(provider) else {
            return false;
        };
        match c.state {
            CircuitState::Closed => false,
            CircuitState::Open => {
                let elapsed = c.opened_at.map(|t| now.saturating_duration_since(t));
                if elapsed.map_or(true, |e| e >= self.timeout) {
                    c.state = CircuitState::HalfOpen;
                    c.trial_started_at = Some(now);
                    note_transition(provider, CircuitState::HalfOpen, c.failures);
                    false
                } else {
                    true
                }
            }
            CircuitState::HalfOpen => {
                if !self.strict_half_open {
                    return false;
                }
                match c.trial_started_at {
                    Some(t) if now.saturating_duration_since(t) < self.timeout => true,
                    _ => {
                        c.trial_started_at = Some(now);
                        false
                    }
                }
            }
        }
    }

    pub fn record_success(&self, provider: &str) {
        let mut map = self.lock();
        let c = map.entry(provider.to_string()).or_default();
        let was = c.state;
        c.state = CircuitState::Closed;
        c.failures = 0;
        c.opened_at = None;
        c.trial_started_at = None;
        if was != CircuitState::Closed {
            note_transition(provider, CircuitState::Closed, 0);
        }
    }

    pub fn record_failure(&self, provider: &str) {
        let now = self.clock.now();
        let mut map = self.lock();
        let c = map.entry(provider.to_string()).or_default();
        c.failures = c.failures.saturating_add(1);
        match c.state {
            CircuitState::HalfOpen => {
                // Failed trial: reopen immediately.
                c.state = CircuitState::Open;
                c.opened_at = Some(now);
                c.trial_started_at = None;
                note_transition(provider, CircuitState::Open, c.failures);
            }
            CircuitState::Closed if c.failures >= self.threshold => {
                c.state = CircuitState::Open;
                c.opened_at = Some(now);
                note_transition(provider, CircuitState::Open, c.failures);
            }
            _ => {}
        }
    }

    /// Snapshot of one provider (closed/zero when never seen).
    pub fn state(&self, provider: &str) -> ProviderState {
        let now = self.clock.now();
        let map = self.lock();
        match map.get(provider) {
            Some(c) => to_view(provider, c, now),
            None => to_view(provider, &Circuit::default(), now),
        }
    }

    /// Snapshot of every provider seen so far, sorted by name.
    pub fn snapshot(&self) -> Vec<ProviderState> {
        let now = self.clock.now();
        let map = self.lock();
        let mut out: Vec<ProviderState> = map.iter().map(|(k, c)| to_view(k, c, now)).collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

fn to_view(name: &str, c: &Circuit, now: Instant) -> ProviderState {
    ProviderState {
        name: name.to_string(),
        state: c.state,
        consecutive_failures: c.failures,
        opened_at: c.opened_at,
        open_for_secs: c
            .opened_at
            .map(|t| now.saturating_duration_since(t).as_secs_f64()),
    }
}

fn note_transition(provider: &str, to: CircuitState, failures: u32) {
    counter!(
        "breaker_transitions_total",
        "provider" => provider.to_string(),
        "to" => to.as_str()
    )
    .increment(1);
    info!(target: "breaker", provider, to = to.as_str(), failures, "circuit transition");
}
