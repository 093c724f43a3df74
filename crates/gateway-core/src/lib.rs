// crates/gateway-core/src/lib.rs
// ============================================================================
// Module: Registry Gateway Core
// Description: Domain types shared by every layer of the SOAP gateway.
// Purpose: Provide the result envelope, error taxonomy, correlation ids,
//          typed requests, and domain records with stable wire forms.
// Dependencies: serde, thiserror, rand
// ============================================================================

//! ## Overview
//! This crate defines the language the rest of the gateway speaks: typed
//! operation requests, the domain records mapped out of upstream XML, the
//! uniform [`GatewayResponse`] envelope, and correlation-id handling.
//! Invariants:
//! - `GatewayResponse::data` is populated iff the status is `Success`.
//! - Every envelope carries a correlation id, generated when absent.
//! - Requests are validated and normalized before any network call.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod correlation;
pub mod dates;
pub mod records;
pub mod requests;
pub mod response;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use correlation::RequestId;
pub use correlation::RequestIdGenerator;
pub use records::DictionaryHeader;
pub use records::DictionaryListResponse;
pub use records::FoundPerson;
pub use records::IdCard;
pub use records::IdCardHolder;
pub use records::IdCardResponse;
pub use records::PersonDetailResponse;
pub use records::PhotoResponse;
pub use records::SearchPersonResponse;
pub use requests::GetCurrentPhotoRequest;
pub use requests::GetIdCardRequest;
pub use requests::GetPersonByPeselRequest;
pub use requests::GetPersonRequest;
pub use requests::ListDictionariesRequest;
pub use requests::SearchPersonRequest;
pub use requests::ValidationError;
pub use response::GatewayResponse;
pub use response::GatewayStatus;
