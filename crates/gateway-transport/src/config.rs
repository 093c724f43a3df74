// crates/gateway-transport/src/config.rs
// ============================================================================
// Module: Endpoint Configuration
// Description: Validated per-service transport settings.
// Purpose: Hold URL, identity, pool, and resilience knobs with safe defaults.
// Dependencies: serde, thiserror, url
// ============================================================================

//! ## Overview
//! One [`EndpointConfig`] per upstream service, deserialized at startup and
//! validated before any client is built. Configuration errors are fatal and
//! never retried.
//! Invariants:
//! - The attempt timeout is strictly below the total timeout.
//! - The connection pool never drops below twice the fan-out parallelism.
//! - A thumbprint is mandatory outside test mode.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default per-attempt timeout in milliseconds.
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 10_000;
/// Default total (all attempts) timeout in milliseconds.
pub const DEFAULT_TOTAL_TIMEOUT_MS: u64 = 30_000;
/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default breaker failure ratio that opens the circuit.
pub const DEFAULT_BREAKER_FAILURE_RATIO: f64 = 0.2;
/// Default breaker sampling window in milliseconds.
pub const DEFAULT_BREAKER_WINDOW_MS: u64 = 60_000;
/// Default minimum calls in the window before the breaker may open.
pub const DEFAULT_BREAKER_MIN_THROUGHPUT: u32 = 20;
/// Default break duration in milliseconds once the circuit opens.
pub const DEFAULT_BREAKER_BREAK_MS: u64 = 30_000;
/// Default photo fan-out parallelism.
pub const DEFAULT_MAX_PARALLEL: usize = 6;
/// Default pooled connections per host.
pub const DEFAULT_POOL_SIZE: usize = 16;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while validating an endpoint configuration.
///
/// # Invariants
/// - Every variant names the offending service for operator triage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The endpoint URL is missing or unparseable.
    #[error("[{service}] endpoint url is missing or invalid")]
    InvalidUrl {
        /// Service whose configuration failed.
        service: String,
    },
    /// The URL carries a scheme other than http or https.
    #[error("[{service}] endpoint url scheme must be http or https")]
    UnsupportedScheme {
        /// Service whose configuration failed.
        service: String,
    },
    /// The per-attempt timeout does not fit under the total timeout.
    #[error("[{service}] attempt timeout must be below the total timeout")]
    TimeoutOrder {
        /// Service whose configuration failed.
        service: String,
    },
    /// The breaker failure ratio is outside `(0, 1]`.
    #[error("[{service}] breaker failure ratio must be within (0, 1]")]
    BreakerRatio {
        /// Service whose configuration failed.
        service: String,
    },
    /// A client certificate thumbprint is required outside test mode.
    #[error("[{service}] client certificate thumbprint must not be empty")]
    MissingThumbprint {
        /// Service whose configuration failed.
        service: String,
    },
}

// ============================================================================
// SECTION: Endpoint Configuration
// ============================================================================

/// Transport settings for one upstream SOAP service.
///
/// # Invariants
/// - Validated by [`EndpointConfig::validate`] before a client is built.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EndpointConfig {
    /// Service name used in logs and error messages.
    pub service_name: String,
    /// Base endpoint URL the envelopes are POSTed to.
    pub endpoint_url: String,
    /// Thumbprint of the client certificate to present (hex SHA-256 of DER).
    pub client_certificate_thumbprint: String,
    /// Disables server certificate verification. Non-production only.
    pub trust_server_certificate: bool,
    /// Serves fixture data instead of dialing the upstream.
    pub test_mode: bool,
    /// Per-attempt timeout in milliseconds.
    pub attempt_timeout_ms: u64,
    /// Total timeout across all attempts in milliseconds.
    pub total_timeout_ms: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Failure ratio that opens the circuit.
    pub breaker_failure_ratio: f64,
    /// Breaker sampling window in milliseconds.
    pub breaker_window_ms: u64,
    /// Minimum calls inside the window before the breaker may open.
    pub breaker_min_throughput: u32,
    /// Break duration in milliseconds once the circuit opens.
    pub breaker_break_ms: u64,
    /// Fan-out parallelism for bulk sub-calls.
    pub max_parallel: usize,
    /// Pooled connections per host.
    pub pool_size: usize,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            endpoint_url: String::new(),
            client_certificate_thumbprint: String::new(),
            trust_server_certificate: false,
            test_mode: false,
            attempt_timeout_ms: DEFAULT_ATTEMPT_TIMEOUT_MS,
            total_timeout_ms: DEFAULT_TOTAL_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            breaker_failure_ratio: DEFAULT_BREAKER_FAILURE_RATIO,
            breaker_window_ms: DEFAULT_BREAKER_WINDOW_MS,
            breaker_min_throughput: DEFAULT_BREAKER_MIN_THROUGHPUT,
            breaker_break_ms: DEFAULT_BREAKER_BREAK_MS,
            max_parallel: DEFAULT_MAX_PARALLEL,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl EndpointConfig {
    /// Checks the configuration and normalizes the pool floor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL, timeouts, breaker ratio, or
    /// identity settings are unusable. Configuration errors are fatal.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let service = self.service_name.clone();
        let parsed = Url::parse(self.endpoint_url.trim())
            .map_err(|_| ConfigError::InvalidUrl {
                service: service.clone(),
            })?;
        match parsed.scheme() {
            "http" | "https" => {}
            _ => {
                return Err(ConfigError::UnsupportedScheme { service });
            }
        }
        if self.attempt_timeout_ms == 0 || self.attempt_timeout_ms >= self.total_timeout_ms {
            return Err(ConfigError::TimeoutOrder { service });
        }
        if !(self.breaker_failure_ratio > 0.0 && self.breaker_failure_ratio <= 1.0) {
            return Err(ConfigError::BreakerRatio { service });
        }
        if !self.test_mode
            && parsed.scheme() == "https"
            && self.client_certificate_thumbprint.trim().is_empty()
        {
            return Err(ConfigError::MissingThumbprint { service });
        }
        // Pool floor: at least twice the fan-out parallelism.
        self.pool_size = self.pool_size.max(self.max_parallel.saturating_mul(2));
        Ok(())
    }

    /// Per-attempt timeout as a [`Duration`].
    #[must_use]
    pub const fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Total timeout as a [`Duration`].
    #[must_use]
    pub const fn total_timeout(&self) -> Duration {
        Duration::from_millis(self.total_timeout_ms)
    }

    /// Breaker sampling window as a [`Duration`].
    #[must_use]
    pub const fn breaker_window(&self) -> Duration {
        Duration::from_millis(self.breaker_window_ms)
    }

    /// Break duration as a [`Duration`].
    #[must_use]
    pub const fn breaker_break(&self) -> Duration {
        Duration::from_millis(self.breaker_break_ms)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
