// crates/gateway-core/src/requests.rs
// ============================================================================
// Module: Typed Operation Requests
// Description: Inbound request shapes for each gateway operation.
// Purpose: Validate and normalize caller input before any network call.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! One typed request per public operation. Field names keep the upstream
//! registry's vocabulary (PESEL, nazwisko, imię) because the wire contract
//! and the fixture data both use it; callers see the same names as JSON.
//! Invariants:
//! - A search requires PESEL or the surname + first given name pair.
//! - Dates are normalized to `yyyyMMdd` during validation; validation
//!   failures surface as [`ValidationError`] before any envelope is built.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::dates::normalize_yyyymmdd;

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Rejection reasons for caller input, reported before any network call.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Neither PESEL nor the surname + first-name pair was provided.
    #[error("provide a PESEL or both surname and first given name")]
    MissingSearchCriteria,
    /// A date field did not parse as `yyyyMMdd` or `yyyy-MM-dd`.
    #[error("invalid format for {field}: expected yyyyMMdd or yyyy-MM-dd")]
    InvalidDate {
        /// Name of the offending request field.
        field: &'static str,
    },
    /// A mandatory field was empty.
    #[error("missing required parameter: {field}")]
    MissingField {
        /// Name of the missing request field.
        field: &'static str,
    },
}

// ============================================================================
// SECTION: Search Request
// ============================================================================

/// Person search criteria.
///
/// Supply a PESEL or the surname + first given name pair; all other fields
/// narrow the match. An exact birth date and a birth-date range are mutually
/// exclusive when the envelope is built: the exact date wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPersonRequest {
    /// National identification number.
    pub pesel: Option<String>,
    /// Surname.
    pub nazwisko: Option<String>,
    /// First given name.
    #[serde(rename = "imie")]
    pub imie_pierwsze: Option<String>,
    /// Second given name.
    #[serde(rename = "imieDrugie")]
    pub imie_drugie: Option<String>,
    /// Exact birth date, `yyyyMMdd` or `yyyy-MM-dd`.
    #[serde(rename = "dataUrodzenia")]
    pub data_urodzenia: Option<String>,
    /// Birth-date range start, same formats as the exact date.
    #[serde(rename = "dataUrodzeniaOd")]
    pub data_urodzenia_od: Option<String>,
    /// Birth-date range end, same formats as the exact date.
    #[serde(rename = "dataUrodzeniaDo")]
    pub data_urodzenia_do: Option<String>,
    /// Mother's given name.
    #[serde(rename = "imieMatki")]
    pub imie_matki: Option<String>,
    /// Father's given name.
    #[serde(rename = "imieOjca")]
    pub imie_ojca: Option<String>,
    /// When `true`, deceased persons are dropped from the result.
    #[serde(rename = "czyZyje")]
    pub czy_zyje: Option<bool>,
}

impl SearchPersonRequest {
    /// Checks mandatory criteria and normalizes all date fields in place.
    ///
    /// `allow_range` enables normalization of the range bounds; operations
    /// without range support keep them untouched by never embedding them.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when mandatory criteria are missing or a
    /// date does not normalize.
    pub fn validate_and_normalize(&mut self, allow_range: bool) -> Result<(), ValidationError> {
        let has_pesel = has_text(self.pesel.as_deref());
        let has_name_pair =
            has_text(self.nazwisko.as_deref()) && has_text(self.imie_pierwsze.as_deref());
        if !has_pesel && !has_name_pair {
            return Err(ValidationError::MissingSearchCriteria);
        }

        normalize_date_field(&mut self.data_urodzenia, "dataUrodzenia")?;
        if allow_range {
            normalize_date_field(&mut self.data_urodzenia_od, "dataUrodzeniaOd")?;
            normalize_date_field(&mut self.data_urodzenia_do, "dataUrodzeniaDo")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Lookup Requests
// ============================================================================

/// Lookup of a person's current data by internal person id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPersonRequest {
    /// Internal registry person identifier.
    #[serde(rename = "idOsoby")]
    pub id_osoby: String,
}

impl GetPersonRequest {
    /// Checks that the person id is present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when the id is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if has_text(Some(&self.id_osoby)) {
            Ok(())
        } else {
            Err(ValidationError::MissingField { field: "idOsoby" })
        }
    }
}

/// Lookup of a person's current data by PESEL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPersonByPeselRequest {
    /// National identification number.
    pub pesel: String,
}

impl GetPersonByPeselRequest {
    /// Checks that the PESEL is present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when the PESEL is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if has_text(Some(&self.pesel)) {
            Ok(())
        } else {
            Err(ValidationError::MissingField { field: "pesel" })
        }
    }
}

/// Lookup of the current photo for one person.
///
/// Both identifiers are required; the document registry keys photos by the
/// (person id, PESEL) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GetCurrentPhotoRequest {
    /// Internal registry person identifier.
    #[serde(rename = "idOsoby")]
    pub id_osoby: String,
    /// National identification number.
    pub pesel: String,
}

impl GetCurrentPhotoRequest {
    /// Checks that both identifiers are present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] naming the blank identifier.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !has_text(Some(&self.pesel)) {
            return Err(ValidationError::MissingField { field: "pesel" });
        }
        if !has_text(Some(&self.id_osoby)) {
            return Err(ValidationError::MissingField { field: "idOsoby" });
        }
        Ok(())
    }
}

/// Lookup of current id-card data for a list of PESELs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetIdCardRequest {
    /// PESELs to resolve; must be non-empty.
    #[serde(rename = "numeryPesel")]
    pub numery_pesel: Vec<String>,
}

impl GetIdCardRequest {
    /// Checks that at least one non-blank PESEL is present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when the list is empty or
    /// every entry is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.numery_pesel.iter().any(|p| has_text(Some(p))) {
            Ok(())
        } else {
            Err(ValidationError::MissingField {
                field: "numeryPesel",
            })
        }
    }
}

/// Request for the dictionary/reference-data listing.
///
/// All filters are optional; the empty request lists every dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListDictionariesRequest {
    /// Filter by dictionary identifier.
    #[serde(rename = "idSlownika")]
    pub id_slownika: Option<String>,
    /// Filter by dictionary name.
    #[serde(rename = "nazwaSlownika")]
    pub nazwa_slownika: Option<String>,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns `true` when the optional string holds non-whitespace content.
fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}

/// Normalizes one optional date field in place.
fn normalize_date_field(
    field: &mut Option<String>,
    name: &'static str,
) -> Result<(), ValidationError> {
    if let Some(raw) = field.as_deref()
        && !raw.trim().is_empty()
    {
        let normalized =
            normalize_yyyymmdd(raw).ok_or(ValidationError::InvalidDate { field: name })?;
        *field = Some(normalized);
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
