// crates/gateway-services/src/error.rs
// ============================================================================
// Module: Service Error Classification
// Description: Cancellation marker and transport-to-envelope classification.
// Purpose: Turn lower-layer failures into response envelopes uniformly.
// Dependencies: gateway-core, gateway-transport
// ============================================================================

//! ## Overview
//! Operations return envelopes, not errors; the one exception is
//! cancellation, which propagates as [`Cancelled`] so callers can
//! distinguish an aborted request from a failed one. Everything else is
//! classified here: 4xx answers and parsed faults are business errors
//! carrying the upstream's own description, while timeouts, 5xx answers,
//! communication failures, an open circuit, and mapping failures are
//! technical errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gateway_core::GatewayResponse;
use gateway_core::RequestId;
use gateway_soap::MappingError;
use gateway_soap::SoapFault;
use gateway_transport::TransportError;
use thiserror::Error;
use tracing::warn;

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// The caller cancelled the operation.
///
/// Cancellation is never converted into a response envelope at the
/// operation boundary; it propagates so the caller can abandon the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Turns a transport failure into the envelope the operation returns.
///
/// # Errors
///
/// Returns [`Cancelled`] for [`TransportError::Cancelled`]; every other
/// failure becomes an envelope.
pub(crate) fn envelope_from_transport<T>(
    request_id: RequestId,
    source: &str,
    error: TransportError,
) -> Result<GatewayResponse<T>, Cancelled> {
    match error {
        TransportError::Cancelled => Err(Cancelled),
        TransportError::HttpStatus { status, fault } if (400..500).contains(&status) => {
            let message = fault
                .as_ref()
                .map(SoapFault::message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            Ok(GatewayResponse::business_error(
                request_id, source, status, message,
            ))
        }
        TransportError::HttpStatus { status, fault } => {
            let message = fault
                .as_ref()
                .map(SoapFault::message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            Ok(GatewayResponse::technical_error(
                request_id, source, status, message,
            ))
        }
        other => {
            warn!(source, error = %other, "transport failure");
            Ok(GatewayResponse::technical_error(
                request_id,
                source,
                500,
                other.to_string(),
            ))
        }
    }
}

/// Turns a mapping failure into a technical-error envelope.
///
/// The upstream violated its own response contract, so the answer is not
/// attributable to caller input.
pub(crate) fn envelope_from_mapping<T>(
    request_id: RequestId,
    source: &str,
    error: &MappingError,
) -> GatewayResponse<T> {
    warn!(source, error = %error, "response mapping failure");
    GatewayResponse::technical_error(request_id, source, 500, error.to_string())
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

    use gateway_core::GatewayStatus;
    use gateway_core::RequestId;
    use gateway_transport::TransportError;

    use super::Cancelled;
    use super::envelope_from_transport;

    /// A fixed caller-supplied correlation id.
    fn id() -> RequestId {
        RequestId::from_caller("error-test").unwrap()
    }

    #[test]
    fn a_4xx_answer_is_a_business_error() {
        let envelope = envelope_from_transport::<()>(
            id(),
            "SRP",
            TransportError::HttpStatus {
                status: 404,
                fault: None,
            },
        )
        .unwrap();
        assert_eq!(envelope.status, GatewayStatus::BusinessError);
        assert_eq!(envelope.source_status_code, 404);
        assert_eq!(envelope.error_message.as_deref(), Some("HTTP 404"));
    }

    #[test]
    fn a_5xx_answer_is_a_technical_error() {
        let envelope = envelope_from_transport::<()>(
            id(),
            "SRP",
            TransportError::HttpStatus {
                status: 503,
                fault: None,
            },
        )
        .unwrap();
        assert_eq!(envelope.status, GatewayStatus::TechnicalError);
        assert_eq!(envelope.source_status_code, 503);
    }

    #[test]
    fn a_timeout_is_a_technical_error_attributed_internally() {
        let envelope =
            envelope_from_transport::<()>(id(), "RDO", TransportError::Timeout).unwrap();
        assert_eq!(envelope.status, GatewayStatus::TechnicalError);
        assert_eq!(envelope.source_status_code, 500);
    }

    #[test]
    fn cancellation_propagates_instead_of_becoming_an_envelope() {
        let result = envelope_from_transport::<()>(id(), "SRP", TransportError::Cancelled);
        assert_eq!(result.unwrap_err(), Cancelled);
    }
}
