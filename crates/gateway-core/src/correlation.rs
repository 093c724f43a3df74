// crates/gateway-core/src/correlation.rs
// ============================================================================
// Module: Correlation Ids
// Description: Sanitization and generation for request correlation ids.
// Purpose: Guarantee every gateway operation carries a traceable id.
// Dependencies: serde, rand
// ============================================================================

//! ## Overview
//! A correlation id joins the caller's logs, the gateway's logs, and the
//! upstream SOAP service's logs for one logical operation. Callers may
//! supply their own id; it is untrusted input and is sanitized before use.
//! When no id is supplied the gateway issues one from a boot-scoped random
//! seed plus a monotonic counter, so ids are unique within the process
//! lifetime without any shared infrastructure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted length for a caller-supplied correlation id.
pub const MAX_REQUEST_ID_LENGTH: usize = 128;

// ============================================================================
// SECTION: Request Id
// ============================================================================

/// Correlation id attached to one logical gateway operation.
///
/// # Invariants
/// - Non-empty, ASCII, free of whitespace and control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Accepts a caller-supplied id after sanitization, or `None` when the
    /// input cannot be used as-is.
    #[must_use]
    pub fn from_caller(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_REQUEST_ID_LENGTH {
            return None;
        }
        let acceptable = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
        acceptable.then(|| Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Boot-scoped correlation id generator.
///
/// # Invariants
/// - Issued identifiers are unique within the process lifetime.
#[derive(Debug)]
pub struct RequestIdGenerator {
    /// Prefix included in every generated correlation id.
    prefix: &'static str,
    /// Boot-scoped random identifier for entropy.
    boot_id: u64,
    /// Monotonic counter for ids issued in this process.
    counter: AtomicU64,
}

impl RequestIdGenerator {
    /// Creates a new generator with the given prefix.
    #[must_use]
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            boot_id: OsRng.next_u64(),
            counter: AtomicU64::new(0),
        }
    }

    /// Issues the next correlation id.
    #[must_use]
    pub fn issue(&self) -> RequestId {
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed);
        RequestId(format!("{}-{:016x}-{sequence}", self.prefix, self.boot_id))
    }

    /// Returns the caller-supplied id when usable, otherwise issues one.
    #[must_use]
    pub fn resolve(&self, caller_supplied: Option<&str>) -> RequestId {
        caller_supplied
            .and_then(RequestId::from_caller)
            .unwrap_or_else(|| self.issue())
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

    use super::RequestId;
    use super::RequestIdGenerator;

    #[test]
    fn generator_issues_unique_ids() {
        let generator = RequestIdGenerator::new("gw");
        let first = generator.issue();
        let second = generator.issue();
        assert_ne!(first, second);
        assert!(first.as_str().starts_with("gw-"));
    }

    #[test]
    fn caller_id_is_sanitized() {
        assert!(RequestId::from_caller("  abc-123  ").is_some());
        assert!(RequestId::from_caller("").is_none());
        assert!(RequestId::from_caller("has space").is_none());
        assert!(RequestId::from_caller("zażółć").is_none());
        let long = "x".repeat(200);
        assert!(RequestId::from_caller(&long).is_none());
    }

    #[test]
    fn resolve_falls_back_to_generated() {
        let generator = RequestIdGenerator::new("gw");
        let kept = generator.resolve(Some("caller-1"));
        assert_eq!(kept.as_str(), "caller-1");
        let generated = generator.resolve(Some("   "));
        assert!(generated.as_str().starts_with("gw-"));
        let generated2 = generator.resolve(None);
        assert!(generated2.as_str().starts_with("gw-"));
    }
}
