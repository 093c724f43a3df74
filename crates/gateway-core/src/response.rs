// crates/gateway-core/src/response.rs
// ============================================================================
// Module: Gateway Result Envelope
// Description: Uniform success/business-error/technical-error response shape.
// Purpose: Wrap every outward-facing call result with correlation metadata.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every public gateway operation returns a [`GatewayResponse`] instead of
//! raising domain errors to its caller. The envelope carries the correlation
//! id, the upstream source name, a status discriminant, the upstream status
//! code, and either a payload or an error message.
//! Invariants:
//! - `data.is_some()` iff `status == GatewayStatus::Success`.
//! - `error_message.is_some()` iff `status != GatewayStatus::Success`.
//! - Constructors are the only way envelopes are built, so the invariant
//!   holds for every value observable by callers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::correlation::RequestId;

// ============================================================================
// SECTION: Status Taxonomy
// ============================================================================

/// Outcome classification for a gateway operation.
///
/// # Invariants
/// - Variants are stable for programmatic handling and wire serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayStatus {
    /// Operation completed and produced a payload.
    Success,
    /// Expected domain failure: validation, SOAP fault, not-found, match
    /// limits. The upstream contract was honored.
    BusinessError,
    /// Transport, mapping, or unexpected failure. The call did not produce a
    /// usable upstream answer.
    TechnicalError,
}

impl GatewayStatus {
    /// Returns a stable label for this status.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::BusinessError => "business_error",
            Self::TechnicalError => "technical_error",
        }
    }
}

// ============================================================================
// SECTION: Result Envelope
// ============================================================================

/// Uniform response envelope returned by every gateway operation.
///
/// # Invariants
/// - `data` is populated iff `status` is [`GatewayStatus::Success`].
/// - `error_message` is populated iff `status` is not success.
/// - `request_id` is always present so logs on both sides of the gateway can
///   be joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse<T> {
    /// Correlation id propagated from the caller or generated by the gateway.
    #[serde(rename = "requestId")]
    pub request_id: RequestId,
    /// Name of the upstream source (for example `SRP` or `CEP`).
    pub source: String,
    /// Outcome classification.
    pub status: GatewayStatus,
    /// Status code reported by or attributed to the upstream source.
    #[serde(rename = "sourceStatusCode")]
    pub source_status_code: u16,
    /// Payload mapped from the upstream response; absent on failure.
    pub data: Option<T>,
    /// Error description; absent on success.
    #[serde(rename = "errorMessage")]
    pub error_message: Option<String>,
}

impl<T> GatewayResponse<T> {
    /// Builds a success envelope carrying `data`.
    #[must_use]
    pub fn success(request_id: RequestId, source: &str, data: T) -> Self {
        Self {
            request_id,
            source: source.to_string(),
            status: GatewayStatus::Success,
            source_status_code: 200,
            data: Some(data),
            error_message: None,
        }
    }

    /// Builds a failure envelope with the given status and message.
    ///
    /// `status` must not be [`GatewayStatus::Success`]; a success status is
    /// coerced to [`GatewayStatus::TechnicalError`] so the envelope invariant
    /// cannot be violated by a caller mistake.
    #[must_use]
    pub fn failure(
        request_id: RequestId,
        source: &str,
        status: GatewayStatus,
        source_status_code: u16,
        message: impl Into<String>,
    ) -> Self {
        let status = if status == GatewayStatus::Success {
            GatewayStatus::TechnicalError
        } else {
            status
        };
        Self {
            request_id,
            source: source.to_string(),
            status,
            source_status_code,
            data: None,
            error_message: Some(message.into()),
        }
    }

    /// Builds a business-error envelope.
    #[must_use]
    pub fn business_error(
        request_id: RequestId,
        source: &str,
        source_status_code: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::failure(
            request_id,
            source,
            GatewayStatus::BusinessError,
            source_status_code,
            message,
        )
    }

    /// Builds a technical-error envelope.
    #[must_use]
    pub fn technical_error(
        request_id: RequestId,
        source: &str,
        source_status_code: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::failure(
            request_id,
            source,
            GatewayStatus::TechnicalError,
            source_status_code,
            message,
        )
    }

    /// Returns `true` when the envelope carries a payload.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, GatewayStatus::Success)
    }

    /// Maps the payload type while preserving envelope metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GatewayResponse<U> {
        GatewayResponse {
            request_id: self.request_id,
            source: self.source,
            status: self.status,
            source_status_code: self.source_status_code,
            data: self.data.map(f),
            error_message: self.error_message,
        }
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

    use super::GatewayResponse;
    use super::GatewayStatus;
    use crate::correlation::RequestIdGenerator;

    #[test]
    fn success_envelope_holds_invariant() {
        let id = RequestIdGenerator::new("gw").issue();
        let envelope = GatewayResponse::success(id, "SRP", 7_u32);
        assert!(envelope.is_success());
        assert!(envelope.data.is_some());
        assert!(envelope.error_message.is_none());
        assert_eq!(envelope.source_status_code, 200);
    }

    #[test]
    fn failure_envelope_holds_invariant() {
        let id = RequestIdGenerator::new("gw").issue();
        let envelope: GatewayResponse<u32> =
            GatewayResponse::business_error(id, "SRP", 400, "missing criteria");
        assert!(!envelope.is_success());
        assert!(envelope.data.is_none());
        assert_eq!(envelope.error_message.as_deref(), Some("missing criteria"));
    }

    #[test]
    fn failure_coerces_success_status() {
        let id = RequestIdGenerator::new("gw").issue();
        let envelope: GatewayResponse<u32> =
            GatewayResponse::failure(id, "SRP", GatewayStatus::Success, 500, "boom");
        assert_eq!(envelope.status, GatewayStatus::TechnicalError);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn map_preserves_metadata() {
        let id = RequestIdGenerator::new("gw").issue();
        let envelope = GatewayResponse::success(id, "SRP", 2_u32).map(|n| n * 10);
        assert_eq!(envelope.data, Some(20));
        assert_eq!(envelope.source, "SRP");
    }
}
