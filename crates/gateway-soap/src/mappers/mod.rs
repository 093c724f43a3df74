// crates/gateway-soap/src/mappers/mod.rs
// ============================================================================
// Module: Response Mappers
// Description: Typed mapping of upstream SOAP response XML into records.
// Purpose: One parse function per operation, with shared lookup rules.
// Dependencies: gateway-core, gateway-soap::dom
// ============================================================================

//! ## Overview
//! Each mapper locates its wrapper element by namespace-qualified descendant
//! search and then reads inner elements by local name only, because the
//! registries qualify inner elements inconsistently across environments.
//! Shared rules:
//! - blank text maps to `None`, never an empty string;
//! - dates are normalized to hyphenated `yyyy-MM-dd`, unparseable → `None`;
//! - a missing wrapper is a [`MappingError`], a missing payload inside a
//!   present wrapper is an empty (default) response.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod dictionaries;
pub mod id_card;
pub mod person_detail;
pub mod photo;
pub mod search_person;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use dictionaries::map_dictionary_list;
pub use id_card::map_id_cards;
pub use person_detail::map_person_by_id;
pub use person_detail::map_person_by_pesel;
pub use photo::map_current_photo;
pub use search_person::map_search_person;

// ============================================================================
// SECTION: Imports
// ============================================================================

use gateway_core::dates::to_hyphenated;
use thiserror::Error;

use crate::dom;
use crate::dom::XmlElement;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while mapping a response body.
///
/// # Invariants
/// - Mapping never panics; every defect is reported through this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The response body was empty or whitespace.
    #[error("response body is empty")]
    EmptyBody,
    /// The response body is not well-formed XML.
    #[error("response body is not valid xml: {0}")]
    InvalidXml(String),
    /// The expected wrapper element was not found.
    #[error("wrapper element {element} not found in response")]
    MissingWrapper {
        /// Local name of the wrapper that was expected.
        element: &'static str,
    },
}

// ============================================================================
// SECTION: Shared Lookup Helpers
// ============================================================================

/// Parses a body and locates the namespace-qualified wrapper element.
///
/// # Errors
///
/// Returns [`MappingError`] for blank bodies, malformed XML, and documents
/// without the wrapper.
pub(crate) fn find_wrapper(
    raw_xml: &str,
    namespace: &str,
    wrapper: &'static str,
) -> Result<XmlElement, MappingError> {
    if raw_xml.trim().is_empty() {
        return Err(MappingError::EmptyBody);
    }
    let root = dom::parse(raw_xml).map_err(|e| MappingError::InvalidXml(e.to_string()))?;
    root.descendant_in(namespace, wrapper)
        .cloned()
        .ok_or(MappingError::MissingWrapper { element: wrapper })
}

/// Reads a child's trimmed text, mapping blanks to `None`.
pub(crate) fn text_of(parent: &XmlElement, local: &str) -> Option<String> {
    parent.value_of(local)
}

/// Reads a child's text from an optional parent.
pub(crate) fn text_in(parent: Option<&XmlElement>, local: &str) -> Option<String> {
    parent.and_then(|p| p.value_of(local))
}

/// Reads a child's text and parses it as a boolean.
///
/// Only literal `true`/`false` (any case) parse; everything else is `None`,
/// matching the upstream contract where absence and garbage are equivalent.
pub(crate) fn bool_of(parent: &XmlElement, local: &str) -> Option<bool> {
    match parent.value_of(local)?.trim() {
        v if v.eq_ignore_ascii_case("true") => Some(true),
        v if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Reads a child's text and normalizes it to a hyphenated date.
pub(crate) fn date_of(parent: &XmlElement, local: &str) -> Option<String> {
    parent.value_of(local).as_deref().and_then(to_hyphenated)
}

