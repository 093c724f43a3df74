// crates/gateway-transport/src/resilience.rs
// ============================================================================
// Module: Resilience Policy
// Description: Retry backoff with jitter and a failure-ratio circuit breaker.
// Purpose: Keep a flaky upstream from consuming the gateway's capacity.
// Dependencies: rand, tracing
// ============================================================================

//! ## Overview
//! Two cooperating mechanisms guard every outbound call. The retry policy
//! re-dispatches retriable failures with exponentially growing, jittered
//! delays. The breaker samples call outcomes over a sliding window and,
//! once the failure ratio crosses the threshold under sufficient
//! throughput, rejects calls outright for a fixed break before letting a
//! single probe through.
//! Invariants:
//! - Backoff delay never exceeds [`MAX_RETRY_DELAY_MS`].
//! - The breaker never opens below the minimum throughput gate.
//! - A half-open probe failure re-opens the circuit for a full break.
//! - A half-open probe that never reports back expires after one break
//!   duration; the breaker then admits a fresh probe instead of rejecting
//!   forever.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use rand::Rng;
use tracing::warn;

use crate::config::EndpointConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// First retry delay in milliseconds; doubles per subsequent retry.
pub const BASE_RETRY_DELAY_MS: u64 = 200;
/// Upper bound on any single retry delay in milliseconds.
pub const MAX_RETRY_DELAY_MS: u64 = 5_000;

// ============================================================================
// SECTION: Retry Policy
// ============================================================================

/// Bounded exponential backoff with additive jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    max_retries: u32,
}

impl RetryPolicy {
    /// Builds the policy from endpoint configuration.
    #[must_use]
    pub const fn from_config(config: &EndpointConfig) -> Self {
        Self {
            max_retries: config.max_retries,
        }
    }

    /// Returns the configured retry budget.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `retry` (1-based), jittered.
    ///
    /// Jitter adds up to half of the base delay so synchronized clients
    /// spread out instead of stampeding a recovering upstream.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        let base = BASE_RETRY_DELAY_MS
            .saturating_mul(1_u64 << exponent)
            .min(MAX_RETRY_DELAY_MS);
        let jitter = rand::thread_rng().gen_range(0..=base / 2);
        Duration::from_millis(base.saturating_add(jitter).min(MAX_RETRY_DELAY_MS))
    }
}

// ============================================================================
// SECTION: Circuit Breaker
// ============================================================================

/// Breaker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    /// Calls flow freely; outcomes are sampled.
    Closed,
    /// Calls are rejected until the break elapses.
    Open {
        /// Instant at which a probe becomes admissible.
        until: Instant,
    },
    /// One probe is in flight; its outcome decides the next state.
    HalfOpen {
        /// Instant the probe was admitted; it expires after a break
        /// duration so an abandoned probe cannot wedge the circuit.
        since: Instant,
    },
}

/// Sampled outcomes plus the current lifecycle state.
#[derive(Debug)]
struct BreakerInner {
    /// Outcome samples `(when, failed)` within the sliding window.
    samples: VecDeque<(Instant, bool)>,
    /// Current lifecycle state.
    state: BreakerState,
}

/// Failure-ratio circuit breaker with a sliding sampling window.
///
/// # Invariants
/// - Thread-safe; shared by every attempt against one endpoint.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Shared mutable state.
    inner: Mutex<BreakerInner>,
    /// Failure ratio that opens the circuit.
    failure_ratio: f64,
    /// Sliding sampling window.
    window: Duration,
    /// Minimum samples in the window before the breaker may open.
    min_throughput: u32,
    /// How long the circuit stays open.
    break_duration: Duration,
    /// Service name for transition logs.
    service: String,
}

impl CircuitBreaker {
    /// Builds the breaker from endpoint configuration.
    #[must_use]
    pub fn from_config(config: &EndpointConfig) -> Self {
        Self {
            inner: Mutex::new(BreakerInner {
                samples: VecDeque::new(),
                state: BreakerState::Closed,
            }),
            failure_ratio: config.breaker_failure_ratio,
            window: config.breaker_window(),
            min_throughput: config.breaker_min_throughput,
            break_duration: config.breaker_break(),
            service: config.service_name.clone(),
        }
    }

    /// Asks the breaker whether a call may proceed.
    ///
    /// An expired break admits exactly one probe and moves to half-open;
    /// further calls are rejected until the probe reports back. A probe
    /// that never reports (cancelled, deadline expired, task dropped)
    /// expires after one break duration and a fresh probe is admitted.
    #[must_use]
    pub fn admit(&self) -> bool {
        let mut inner = self.lock();
        let now = Instant::now();
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open { until } => {
                if now >= until {
                    inner.state = BreakerState::HalfOpen { since: now };
                    true
                } else {
                    false
                }
            }
            BreakerState::HalfOpen { since } => {
                if now >= since + self.break_duration {
                    warn!(service = %self.service, "circuit probe abandoned, admitting a new one");
                    inner.state = BreakerState::HalfOpen { since: now };
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Records a successful call.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        if matches!(inner.state, BreakerState::HalfOpen { .. }) {
            inner.state = BreakerState::Closed;
            inner.samples.clear();
            return;
        }
        let now = Instant::now();
        inner.samples.push_back((now, false));
        Self::prune(&mut inner.samples, now, self.window);
    }

    /// Records a failed call and opens the circuit when warranted.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        let now = Instant::now();
        if matches!(inner.state, BreakerState::HalfOpen { .. }) {
            warn!(service = %self.service, "circuit probe failed, re-opening");
            inner.state = BreakerState::Open {
                until: now + self.break_duration,
            };
            return;
        }
        inner.samples.push_back((now, true));
        Self::prune(&mut inner.samples, now, self.window);

        let total = inner.samples.len() as u64;
        if total < u64::from(self.min_throughput) {
            return;
        }
        let failures = inner.samples.iter().filter(|(_, failed)| *failed).count() as u64;
        #[allow(
            clippy::cast_precision_loss,
            reason = "Sample counts stay far below the 2^52 precision bound."
        )]
        let ratio = failures as f64 / total as f64;
        if ratio >= self.failure_ratio {
            warn!(
                service = %self.service,
                failures,
                total,
                "failure ratio exceeded, opening circuit"
            );
            inner.state = BreakerState::Open {
                until: now + self.break_duration,
            };
            inner.samples.clear();
        }
    }

    /// Returns true while calls would be rejected.
    #[must_use]
    pub fn is_open(&self) -> bool {
        let inner = self.lock();
        matches!(inner.state, BreakerState::Open { until } if Instant::now() < until)
    }

    /// Locks the shared state, recovering from poisoning.
    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops samples older than the sliding window.
    fn prune(samples: &mut VecDeque<(Instant, bool)>, now: Instant, window: Duration) {
        while let Some(&(when, _)) = samples.front() {
            if now.duration_since(when) > window {
                samples.pop_front();
            } else {
                break;
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
