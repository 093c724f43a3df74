// crates/gateway-soap/src/fault.rs
// ============================================================================
// Module: SOAP Fault Parser
// Description: Best-effort detection of SOAP 1.1 and 1.2 fault envelopes.
// Purpose: Surface upstream business errors that arrive as faults, often
//          with HTTP 200.
// Dependencies: gateway-soap::dom
// ============================================================================

//! ## Overview
//! Every response body is probed for a fault before mapping. The probe never
//! fails: malformed XML, a missing fault element, or an empty body all read
//! as "no fault". Detail fields are searched by local name only, because the
//! registries qualify them under varying namespaces. When the detail has no
//! recognizable technical field, the whole detail subtree is serialized as
//! the technical description so nothing is lost.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::SOAP_11_NS;
use crate::SOAP_12_NS;
use crate::dom;
use crate::dom::XmlElement;

// ============================================================================
// SECTION: Fault Type
// ============================================================================

/// A parsed SOAP fault, normalized across protocol versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// Fault code (`faultcode` in 1.1, `Code/Value` in 1.2).
    pub fault_code: String,
    /// Human-readable reason (`faultstring` in 1.1, `Reason/Text` in 1.2).
    pub fault_string: String,
    /// Registry error code extracted from the detail, when present.
    pub detail_kod: Option<String>,
    /// Registry error description extracted from the detail, when present.
    pub detail_opis: Option<String>,
    /// Technical description from the detail, or the serialized detail
    /// subtree when no explicit technical field exists.
    pub detail_opis_techniczny: Option<String>,
}

impl SoapFault {
    /// Builds the operator-facing message for this fault.
    ///
    /// Prefers the registry description over the generic fault string and
    /// appends the technical description when one is present.
    #[must_use]
    pub fn message(&self) -> String {
        let mut msg = self
            .detail_opis
            .clone()
            .unwrap_or_else(|| self.fault_string.clone());
        if let Some(tech) = self
            .detail_opis_techniczny
            .as_deref()
            .filter(|t| !t.trim().is_empty())
        {
            msg.push_str("; ");
            msg.push_str(tech);
        }
        msg
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Probes a response body for a SOAP 1.1 or 1.2 fault.
///
/// Returns `None` for blank bodies, malformed XML, and fault-free
/// envelopes. SOAP 1.1 takes precedence when both shapes somehow match.
#[must_use]
pub fn try_parse_fault(xml: &str) -> Option<SoapFault> {
    if xml.trim().is_empty() {
        return None;
    }
    let root = dom::parse(xml).ok()?;

    if let Some(fault) = root.descendant_in(SOAP_11_NS, "Fault") {
        return Some(parse_fault_11(fault));
    }
    if let Some(fault) = root.descendant_in(SOAP_12_NS, "Fault") {
        return Some(parse_fault_12(fault));
    }
    None
}

/// Extracts a SOAP 1.1 fault. Child elements are unqualified.
fn parse_fault_11(fault: &XmlElement) -> SoapFault {
    let code = fault
        .value_of("faultcode")
        .unwrap_or_else(|| "Server".to_string());
    let reason = fault
        .value_of("faultstring")
        .or_else(|| fault.value_of("faultreason"))
        .unwrap_or_else(|| "SOAP Fault".to_string());
    let (kod, opis, tech) = extract_detail(fault.child("detail"));
    SoapFault {
        fault_code: code,
        fault_string: reason,
        detail_kod: kod,
        detail_opis: opis,
        detail_opis_techniczny: tech,
    }
}

/// Extracts a SOAP 1.2 fault (`Code/Value`, `Reason/Text`, `Detail`).
fn parse_fault_12(fault: &XmlElement) -> SoapFault {
    let code = fault
        .child("Code")
        .and_then(|c| c.value_of("Value"))
        .unwrap_or_else(|| "Receiver".to_string());
    let reason = fault
        .child("Reason")
        .and_then(|r| r.value_of("Text"))
        .unwrap_or_else(|| "SOAP Fault".to_string());
    let (kod, opis, tech) = extract_detail(fault.child("Detail"));
    SoapFault {
        fault_code: code,
        fault_string: reason,
        detail_kod: kod,
        detail_opis: opis,
        detail_opis_techniczny: tech,
    }
}

/// Pulls `kod`, `opis`, and a technical description out of a fault detail.
///
/// Field names are matched by local name, case-insensitively, at any depth.
/// Without an explicit technical field the serialized detail subtree stands
/// in for it.
fn extract_detail(
    detail: Option<&XmlElement>,
) -> (Option<String>, Option<String>, Option<String>) {
    let Some(detail) = detail else {
        return (None, None, None);
    };

    let kod = detail
        .descendant("kod")
        .and_then(XmlElement::text)
        .map(ToString::to_string);
    let opis = detail
        .descendant("opis")
        .and_then(XmlElement::text)
        .map(ToString::to_string);
    let tech = ["opisTechniczny", "opis_techniczny", "technicalDescription"]
        .iter()
        .find_map(|name| detail.descendant(name))
        .and_then(XmlElement::text)
        .map(ToString::to_string)
        .or_else(|| Some(detail.to_xml()));

    (kod, opis, tech)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
