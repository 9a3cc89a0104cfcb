// src/resilience/mod.rs
//! Failure isolation for upstream providers: a keyed circuit breaker plus the
//! retrying client that feeds it.

pub mod breaker;
pub mod client;

pub use breaker::{CircuitBreaker, CircuitState, Clock, ProviderState, SystemClock};
pub use client::ResilientClient;
