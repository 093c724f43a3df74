// crates/gateway-soap/src/lib.rs
// ============================================================================
// Module: Gateway SOAP Layer
// Description: Envelope construction, fault detection, and response mapping.
// Purpose: Translate between typed gateway requests/records and SOAP 1.1 XML.
// Dependencies: gateway-core, quick-xml, thiserror
// ============================================================================

//! ## Overview
//! This crate owns everything XML. Envelope builders are pure functions that
//! render typed requests into namespace-qualified SOAP 1.1 documents with
//! every user-supplied string escaped. The fault parser best-effort detects
//! SOAP 1.1/1.2 fault shapes and never fails. Response mappers walk a small
//! element tree built over `quick-xml` and look elements up by local name,
//! because the upstream registries mix qualified and unqualified elements
//! inconsistently. That quirk is part of the wire contract and is kept.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod dom;
pub mod envelope;
pub mod fault;
pub mod mappers;
pub mod text;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use dom::XmlElement;
pub use dom::XmlError;
pub use fault::SoapFault;
pub use fault::try_parse_fault;
pub use mappers::MappingError;

// ============================================================================
// SECTION: Namespace Constants
// ============================================================================

/// SOAP 1.1 envelope namespace.
pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
/// SOAP 1.2 envelope namespace.
pub const SOAP_12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
/// Person registry service namespace.
pub const PESEL_NS: &str = "http://msw.gov.pl/srp/v3_0/uslugi/pesel/";
/// Identity-document service namespace.
pub const RDO_NS: &str = "http://msw.gov.pl/srp/v3_0/uslugi/dowody/";
/// Dictionary reference-data service namespace.
pub const CEP_NS: &str = "http://cepik.gov.pl/slowniki/uslugi/udostepnianie/";
