// crates/gateway-transport/src/lib.rs
// ============================================================================
// Module: Gateway Transport Layer
// Description: Resilient SOAP invocation over mutual-TLS HTTP.
// Purpose: Carry envelopes to the upstream registries and bring bodies back.
// Dependencies: gateway-core, gateway-soap, reqwest, tokio, tokio-util
// ============================================================================

//! ## Overview
//! This crate owns the network: endpoint configuration, the PEM-bundle
//! certificate store, retry/backoff and circuit-breaker policy, the pooled
//! SOAP invoker, and the bounded bulk fan-out helper. Everything above it is
//! pure; everything below it is the wire.
//! Invariants:
//! - Certificate lookup fails closed; an invalid identity never dials out.
//! - Retries apply only to retriable outcomes and never exceed the total
//!   deadline.
//! - Fault parsing is attempted on every response body, HTTP 200 included.
//! - Cancellation aborts in-flight attempts and surfaces as
//!   [`TransportError::Cancelled`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bulk;
pub mod certificate;
pub mod config;
pub mod invoker;
pub mod resilience;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bulk::bulk_invoke;
pub use certificate::CertificateError;
pub use certificate::CertificateStore;
pub use certificate::ClientIdentity;
pub use config::ConfigError;
pub use config::EndpointConfig;
pub use invoker::InvokeRequest;
pub use invoker::SoapInvokeOutcome;
pub use invoker::SoapInvoker;
pub use invoker::TransportError;
pub use resilience::CircuitBreaker;
pub use resilience::RetryPolicy;
