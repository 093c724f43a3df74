// crates/gateway-services/src/lib.rs
// ============================================================================
// Module: Gateway Operation Services
// Description: Composed gateway operations over the SOAP transport.
// Purpose: Validate, invoke, classify, map, and fan out per operation.
// Dependencies: gateway-core, gateway-soap, gateway-transport
// ============================================================================

//! ## Overview
//! This crate composes the lower layers into the public gateway operations:
//! person search and sharing against the person registry (SRP), photo and
//! id-card sharing against the document registry (RDO), and dictionary
//! listing against the vehicle-registry dictionary service (CEP). Each
//! operation validates input, builds its envelope, invokes the transport,
//! classifies faults and statuses, maps the payload, and returns a single
//! [`gateway_core::GatewayResponse`]. Fixture-backed implementations of the
//! same traits serve canned data when an endpoint runs in test mode.
//! Invariants:
//! - Operations never raise domain errors to their caller; everything but
//!   cancellation becomes a response envelope.
//! - Validation failures are rejected before any network call.
//! - Every envelope carries a correlation id, generated when absent.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod actions;
pub mod config;
pub mod dictionary;
pub mod document;
pub mod error;
pub mod fixtures;
pub mod person;
pub mod reference;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::CepConfig;
pub use config::RdoConfig;
pub use config::SrpConfig;
pub use dictionary::DictionaryOperations;
pub use dictionary::DictionaryService;
pub use document::DocumentOperations;
pub use document::DocumentService;
pub use error::Cancelled;
pub use fixtures::FixtureDictionaryService;
pub use fixtures::FixtureDocumentService;
pub use fixtures::FixturePersonService;
pub use person::PersonOperations;
pub use person::PersonService;
pub use reference::ReferenceData;
pub use reference::ReferenceDataError;
pub use reference::SqliteReferenceData;
