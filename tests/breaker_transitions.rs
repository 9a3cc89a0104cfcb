// tests/breaker_transitions.rs
//
// Circuit breaker lifecycle through the public API, with an injected clock,
// plus concurrency checks on the shared map.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use job_match_engine::config::BreakerConfig;
use job_match_engine::resilience::{CircuitBreaker, CircuitState, Clock};
use parking_lot::Mutex;

struct TestClock(Mutex<Instant>);

impl TestClock {
    fn advance(&self, d: Duration) {
        *self.0.lock() += d;
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        *self.0.lock()
    }
}

fn breaker(strict: bool) -> (CircuitBreaker, Arc<TestClock>) {
    let clock = Arc::new(TestClock(Mutex::new(Instant::now())));
    let cfg = BreakerConfig {
        failure_threshold: 3,
        open_timeout_secs: 30,
        strict_half_open: strict,
    };
    (CircuitBreaker::with_clock(&cfg, clock.clone()), clock)
}

#[test]
fn full_cycle_closed_open_half_open_closed() {
    let (b, clock) = breaker(true);
    for _ in 0..3 {
        assert!(!b.is_open("usajobs"));
        b.record_failure("usajobs");
    }
    assert!(b.is_open("usajobs"));

    clock.advance(Duration::from_secs(10));
    let s = b.state("usajobs");
    assert_eq!(s.state, CircuitState::Open);
    assert_eq!(s.open_for_secs, Some(10.0));

    clock.advance(Duration::from_secs(20));
    assert!(!b.is_open("usajobs"), "trial call admitted");
    assert_eq!(b.state("usajobs").state, CircuitState::HalfOpen);
    assert!(b.is_open("usajobs"), "second caller refused during the trial");

    b.record_success("usajobs");
    let s = b.state("usajobs");
    assert_eq!(s.state, CircuitState::Closed);
    assert_eq!(s.consecutive_failures, 0);
    assert!(s.open_for_secs.is_none());
}

#[test]
fn lenient_half_open_lets_everyone_through() {
    let (b, clock) = breaker(false);
    for _ in 0..3 {
        b.record_failure("lever");
    }
    clock.advance(Duration::from_secs(30));
    assert!(!b.is_open("lever"));
    assert!(!b.is_open("lever"));
    b.record_failure("lever");
    assert_eq!(b.state("lever").state, CircuitState::Open);
}

#[test]
fn providers_are_isolated() {
    let (b, _) = breaker(true);
    for _ in 0..3 {
        b.record_failure("indeed");
    }
    b.record_failure("jobicy");
    assert!(b.is_open("indeed"));
    assert!(!b.is_open("jobicy"));

    let names: Vec<String> = b.snapshot().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["indeed".to_string(), "jobicy".to_string()]);
}

#[test]
fn concurrent_failures_are_all_counted() {
    let b = Arc::new(CircuitBreaker::new(&BreakerConfig {
        failure_threshold: 1_000,
        ..BreakerConfig::default()
    }));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let b = b.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    b.record_failure("greenhouse");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let s = b.state("greenhouse");
    assert_eq!(s.consecutive_failures, 400);
    assert_eq!(s.state, CircuitState::Closed);
}

#[test]
fn racing_callers_get_exactly_one_trial() {
    const CALLERS: usize = 16;
    let (b, clock) = breaker(true);
    for _ in 0..3 {
        b.record_failure("jsearch");
    }
    clock.advance(Duration::from_secs(30));

    let b = Arc::new(b);
    let gate = Arc::new(Barrier::new(CALLERS));
    let admitted = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let (b, gate, admitted) = (b.clone(), gate.clone(), admitted.clone());
            thread::spawn(move || {
                gate.wait();
                if !b.is_open("jsearch") {
                    admitted.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(admitted.load(Ordering::SeqCst), 1);
    assert_eq!(b.state("jsearch").state, CircuitState::HalfOpen);
}
