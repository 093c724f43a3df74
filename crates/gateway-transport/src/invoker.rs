// crates/gateway-transport/src/invoker.rs
// ============================================================================
// Module: SOAP Invoker
// Description: Pooled, resilient HTTP dispatch of SOAP envelopes.
// Purpose: Carry one envelope to an upstream endpoint and classify the
//          outcome.
// Dependencies: gateway-soap, reqwest, tokio, tokio-util
// ============================================================================

//! ## Overview
//! One [`SoapInvoker`] per upstream service, wrapping a pooled keep-alive
//! client configured with the service's mTLS identity. `invoke` drives the
//! retry loop under the total deadline and consults the circuit breaker
//! before every attempt. The response body is always probed for a SOAP
//! fault, because the registries report business errors as faults on
//! HTTP 200.
//! Invariants:
//! - Only retriable outcomes (5xx, 408, transport failure, attempt timeout)
//!   re-dispatch; other HTTP statuses are terminal.
//! - Non-retriable HTTP statuses do not count against the breaker.
//! - Cancellation wins every race and surfaces as
//!   [`TransportError::Cancelled`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use gateway_core::RequestId;
use gateway_soap::SoapFault;
use gateway_soap::try_parse_fault;
use reqwest::Client;
use reqwest::Identity;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::warn;

use crate::certificate::CertificateError;
use crate::certificate::ClientIdentity;
use crate::config::EndpointConfig;
use crate::resilience::CircuitBreaker;
use crate::resilience::RetryPolicy;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while dispatching an envelope.
///
/// # Invariants
/// - Retriability is decided by [`TransportError::is_retriable`] alone.
#[derive(Debug, Error)]
pub enum TransportError {
    /// An attempt or the whole call ran out of time.
    #[error("timeout calling upstream service")]
    Timeout,
    /// The connection could not be established or broke mid-flight.
    #[error("communication failure calling upstream service: {0}")]
    Communication(String),
    /// The upstream answered with a non-2xx status.
    #[error("upstream answered HTTP {status}")]
    HttpStatus {
        /// HTTP status code received.
        status: u16,
        /// Fault parsed from the error body, when one was present.
        fault: Option<SoapFault>,
    },
    /// The circuit breaker is open for this endpoint.
    #[error("circuit open for upstream service")]
    CircuitOpen,
    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,
    /// The client identity could not be resolved.
    #[error(transparent)]
    Certificate(#[from] CertificateError),
    /// The HTTP client could not be constructed.
    #[error("http client build failed: {0}")]
    ClientBuild(String),
}

impl TransportError {
    /// Whether another attempt may fix this outcome.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::Timeout | Self::Communication(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 408,
            Self::CircuitOpen | Self::Cancelled | Self::Certificate(_) | Self::ClientBuild(_) => {
                false
            }
        }
    }

    /// Whether this outcome counts as a failure in the breaker window.
    ///
    /// Terminal 4xx answers prove the upstream is alive, so they sample as
    /// successes.
    #[must_use]
    pub const fn counts_against_breaker(&self) -> bool {
        self.is_retriable()
    }
}

// ============================================================================
// SECTION: Request And Outcome Types
// ============================================================================

/// One envelope dispatch.
#[derive(Debug, Clone, Copy)]
pub struct InvokeRequest<'a> {
    /// Endpoint URL the envelope is POSTed to.
    pub endpoint_url: &'a str,
    /// `SOAPAction` header value.
    pub soap_action: &'a str,
    /// Serialized SOAP envelope.
    pub envelope: &'a str,
    /// Correlation id carried through logs.
    pub request_id: &'a RequestId,
}

/// The classified result of a successful dispatch.
#[derive(Debug, Clone)]
pub struct SoapInvokeOutcome {
    /// HTTP status code, always 2xx here.
    pub status: u16,
    /// Raw response body.
    pub body: String,
    /// Fault found in the body; possible even on HTTP 200.
    pub fault: Option<SoapFault>,
}

// ============================================================================
// SECTION: Invoker
// ============================================================================

/// Resilient SOAP dispatcher for one upstream service.
#[derive(Debug)]
pub struct SoapInvoker {
    /// Pooled keep-alive HTTP client.
    client: Client,
    /// Retry budget and backoff.
    retry: RetryPolicy,
    /// Shared circuit breaker.
    breaker: CircuitBreaker,
    /// Deadline across all attempts.
    total_timeout: Duration,
    /// Service name for logs.
    service: String,
}

impl SoapInvoker {
    /// Builds the invoker and its pooled client.
    ///
    /// The identity is mandatory whenever the endpoint config demands mTLS;
    /// passing `None` is reserved for plain-HTTP test endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] when the TLS identity is
    /// rejected or the client cannot be constructed.
    pub fn new(
        config: &EndpointConfig,
        identity: Option<&ClientIdentity>,
    ) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .timeout(config.attempt_timeout())
            .pool_max_idle_per_host(config.pool_size)
            .redirect(Policy::none());
        if let Some(identity) = identity {
            let tls_identity = Identity::from_pem(identity.pem_bytes())
                .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
            builder = builder.identity(tls_identity);
        }
        if config.trust_server_certificate {
            // Non-production escape hatch mirrored from the endpoint config.
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self {
            client,
            retry: RetryPolicy::from_config(config),
            breaker: CircuitBreaker::from_config(config),
            total_timeout: config.total_timeout(),
            service: config.service_name.clone(),
        })
    }

    /// Dispatches one envelope under the total deadline.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the breaker rejects the call, the
    /// deadline or retry budget is exhausted, the upstream answers non-2xx,
    /// or the caller cancels.
    pub async fn invoke(
        &self,
        request: &InvokeRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<SoapInvokeOutcome, TransportError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(TransportError::Cancelled),
            outcome = tokio::time::timeout(self.total_timeout, self.run_attempts(request)) => {
                outcome.unwrap_or(Err(TransportError::Timeout))
            }
        }
    }

    /// Runs the attempt loop until success, a terminal error, or an
    /// exhausted retry budget.
    async fn run_attempts(
        &self,
        request: &InvokeRequest<'_>,
    ) -> Result<SoapInvokeOutcome, TransportError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if !self.breaker.admit() {
                return Err(TransportError::CircuitOpen);
            }
            info!(
                service = %self.service,
                action = %request.soap_action,
                request_id = %request.request_id.as_str(),
                attempt,
                "soap request start"
            );
            match self.attempt_once(request).await {
                Ok(outcome) => {
                    self.breaker.record_success();
                    info!(
                        service = %self.service,
                        request_id = %request.request_id.as_str(),
                        status = outcome.status,
                        "soap request done"
                    );
                    return Ok(outcome);
                }
                Err(error) => {
                    if error.counts_against_breaker() {
                        self.breaker.record_failure();
                    } else {
                        self.breaker.record_success();
                    }
                    if error.is_retriable() && attempt <= self.retry.max_retries() {
                        let delay = self.retry.delay_for(attempt);
                        warn!(
                            service = %self.service,
                            request_id = %request.request_id.as_str(),
                            attempt,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            error = %error,
                            "soap request retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    warn!(
                        service = %self.service,
                        request_id = %request.request_id.as_str(),
                        error = %error,
                        "soap request failed"
                    );
                    return Err(error);
                }
            }
        }
    }

    /// One POST of the envelope, classified.
    async fn attempt_once(
        &self,
        request: &InvokeRequest<'_>,
    ) -> Result<SoapInvokeOutcome, TransportError> {
        let response = self
            .client
            .post(request.endpoint_url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", request.soap_action)
            .body(request.envelope.to_string())
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_reqwest_error)?;
        // Faults arrive with HTTP 200 as well as with error statuses.
        let fault = try_parse_fault(&body);

        if status.is_success() {
            Ok(SoapInvokeOutcome {
                status: status.as_u16(),
                body,
                fault,
            })
        } else {
            Err(TransportError::HttpStatus {
                status: status.as_u16(),
                fault,
            })
        }
    }
}

/// Maps a reqwest failure onto the transport taxonomy.
fn classify_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if let Some(status) = error.status() {
        TransportError::HttpStatus {
            status: status.as_u16(),
            fault: None,
        }
    } else {
        TransportError::Communication(error.to_string())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use super::TransportError;

    #[test]
    fn retriability_follows_the_taxonomy() {
        assert!(TransportError::Timeout.is_retriable());
        assert!(TransportError::Communication("reset".to_string()).is_retriable());
        assert!(
            TransportError::HttpStatus {
                status: 503,
                fault: None
            }
            .is_retriable()
        );
        assert!(
            TransportError::HttpStatus {
                status: 408,
                fault: None
            }
            .is_retriable()
        );
        assert!(
            !TransportError::HttpStatus {
                status: 400,
                fault: None
            }
            .is_retriable()
        );
        assert!(!TransportError::CircuitOpen.is_retriable());
        assert!(!TransportError::Cancelled.is_retriable());
    }

    #[test]
    fn terminal_errors_never_feed_the_breaker_as_failures() {
        assert!(
            !TransportError::HttpStatus {
                status: 404,
                fault: None
            }
            .counts_against_breaker()
        );
        assert!(TransportError::Timeout.counts_against_breaker());
    }
}
