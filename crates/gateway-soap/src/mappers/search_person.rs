// crates/gateway-soap/src/mappers/search_person.rs
// ============================================================================
// Module: Person Search Mapper
// Description: Maps `wyszukajOsobyResponse` XML into found-person records.
// Purpose: Produce the typed search result the person service returns.
// Dependencies: gateway-core, gateway-soap::dom
// ============================================================================

//! Maps the person-search response. The wrapper is qualified under the
//! person-registry namespace; `znalezioneOsoby` and everything below it
//! arrive unqualified. A present wrapper without `znalezioneOsoby` means an
//! empty match set, not an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gateway_core::FoundPerson;
use gateway_core::SearchPersonResponse;

use crate::PESEL_NS;
use crate::dom::XmlElement;
use crate::mappers::MappingError;
use crate::mappers::bool_of;
use crate::mappers::date_of;
use crate::mappers::find_wrapper;
use crate::mappers::text_of;

// ============================================================================
// SECTION: Mapping
// ============================================================================

/// Maps a raw person-search response body.
///
/// # Errors
///
/// Returns [`MappingError`] when the body is blank, malformed, or lacks the
/// `wyszukajOsobyResponse` wrapper.
pub fn map_search_person(raw_xml: &str) -> Result<SearchPersonResponse, MappingError> {
    let wrapper = find_wrapper(raw_xml, PESEL_NS, "wyszukajOsobyResponse")?;
    let Some(list) = wrapper.child("znalezioneOsoby") else {
        return Ok(SearchPersonResponse::default());
    };
    let persons = list
        .children_named("znalezionaOsoba")
        .map(map_person)
        .collect();
    Ok(SearchPersonResponse { persons })
}

/// Maps one `znalezionaOsoba` element.
fn map_person(el: &XmlElement) -> FoundPerson {
    FoundPerson {
        id_osoby: text_of(el, "idOsoby"),
        pesel: text_of(el, "pesel"),
        seria_i_numer_dowodu: text_of(el, "seriaINumerDowodu"),
        nazwisko: text_of(el, "nazwisko"),
        imie_pierwsze: text_of(el, "imiePierwsze"),
        imie_drugie: text_of(el, "imieDrugie"),
        miejsce_urodzenia: text_of(el, "miejsceUrodzenia"),
        data_urodzenia: date_of(el, "dataUrodzenia"),
        plec: text_of(el, "plec"),
        czy_zyje: bool_of(el, "czyZyje"),
        // Upstream names this czyAnulowany on the wire.
        czy_pesel_anulowany: bool_of(el, "czyAnulowany"),
        zdjecie: None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
