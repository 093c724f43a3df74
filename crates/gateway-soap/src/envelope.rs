// crates/gateway-soap/src/envelope.rs
// ============================================================================
// Module: Envelope Builders
// Description: Pure functions rendering typed requests into SOAP 1.1 XML.
// Purpose: Produce the exact wire shapes the upstream registries accept.
// Dependencies: gateway-core
// ============================================================================

//! ## Overview
//! One builder per upstream operation. Builders are deterministic string
//! renderers with no I/O; the caller supplies an already validated and
//! normalized request together with a correlation id.
//! Invariants:
//! - Every user-supplied value passes through XML escaping.
//! - Name fields are trimmed and upper-cased before embedding.
//! - Blank optional fields never emit an element.
//! - When an exact birth date is present the date-range criterion is
//!   ignored; the two are never rendered together.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gateway_core::GetCurrentPhotoRequest;
use gateway_core::GetIdCardRequest;
use gateway_core::GetPersonByPeselRequest;
use gateway_core::GetPersonRequest;
use gateway_core::ListDictionariesRequest;
use gateway_core::RequestId;
use gateway_core::SearchPersonRequest;

use crate::text::registry_upper;
use crate::text::xml_escape;

// ============================================================================
// SECTION: Shared Rendering Helpers
// ============================================================================

/// Returns the trimmed value when the optional field carries text.
fn present(field: Option<&String>) -> Option<&str> {
    field.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Appends `<name>escaped</name>` for a raw (already cased) value.
fn push_element(out: &mut String, name: &str, value: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    out.push_str(&xml_escape(value));
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Appends `<name>NAME-CASED</name>` for a name field.
fn push_name_element(out: &mut String, name: &str, value: &str) {
    push_element(out, name, &registry_upper(value));
}

/// Opens a person-registry envelope around the named operation element.
fn open_pesel_envelope(operation: &str) -> String {
    let mut out = String::with_capacity(512);
    out.push_str(
        "<soapenv:Envelope xmlns:soapenv='http://schemas.xmlsoap.org/soap/envelope/' \
         xmlns:pes='http://msw.gov.pl/srp/v3_0/uslugi/pesel/'>",
    );
    out.push_str("<soapenv:Header/><soapenv:Body><pes:");
    out.push_str(operation);
    out.push('>');
    out
}

/// Closes a person-registry envelope opened by [`open_pesel_envelope`].
fn close_pesel_envelope(out: &mut String, operation: &str) {
    out.push_str("</pes:");
    out.push_str(operation);
    out.push_str("></soapenv:Body></soapenv:Envelope>");
}

/// Opens an identity-document envelope around the named operation element.
fn open_rdo_envelope(operation: &str) -> String {
    let mut out = String::with_capacity(512);
    out.push_str(
        "<soapenv:Envelope xmlns:soapenv='http://schemas.xmlsoap.org/soap/envelope/' \
         xmlns:dow='http://msw.gov.pl/srp/v3_0/uslugi/dowody/'>",
    );
    out.push_str("<soapenv:Header/><soapenv:Body><dow:");
    out.push_str(operation);
    out.push('>');
    out
}

/// Closes an identity-document envelope opened by [`open_rdo_envelope`].
fn close_rdo_envelope(out: &mut String, operation: &str) {
    out.push_str("</dow:");
    out.push_str(operation);
    out.push_str("></soapenv:Body></soapenv:Envelope>");
}

/// Renders the shared `kryteriaWyszukiwania` block for person searches.
///
/// `allow_range` controls whether the envelope may carry a birth-date range;
/// the basic-data search only accepts an exact date.
fn push_search_criteria(out: &mut String, req: &SearchPersonRequest, allow_range: bool) {
    out.push_str("<kryteriaWyszukiwania>");

    if let Some(pesel) = present(req.pesel.as_ref()) {
        push_element(out, "numerPesel", pesel);
    }

    let imie_pierwsze = present(req.imie_pierwsze.as_ref());
    let imie_drugie = present(req.imie_drugie.as_ref());
    if imie_pierwsze.is_some() || imie_drugie.is_some() {
        out.push_str("<kryteriumImienia>");
        if let Some(value) = imie_pierwsze {
            push_name_element(out, "imiePierwsze", value);
        }
        if let Some(value) = imie_drugie {
            push_name_element(out, "imieDrugie", value);
        }
        out.push_str("<innyZapis>false</innyZapis>");
        out.push_str("<zakres>DANE_AKTUALNE</zakres>");
        out.push_str("</kryteriumImienia>");
    }

    if let Some(nazwisko) = present(req.nazwisko.as_ref()) {
        out.push_str("<kryteriumNazwiska>");
        push_name_element(out, "nazwisko", nazwisko);
        out.push_str("<dowolneNazwisko>true</dowolneNazwisko>");
        out.push_str("<innyZapis>true</innyZapis>");
        out.push_str("<zakres>DANE_AKTUALNE</zakres>");
        out.push_str("</kryteriumNazwiska>");
    }

    let data = present(req.data_urodzenia.as_ref());
    let data_od = if allow_range {
        present(req.data_urodzenia_od.as_ref())
    } else {
        None
    };
    let data_do = if allow_range {
        present(req.data_urodzenia_do.as_ref())
    } else {
        None
    };
    let imie_matki = present(req.imie_matki.as_ref());
    let imie_ojca = present(req.imie_ojca.as_ref());
    let has_date = data.is_some() || data_od.is_some() || data_do.is_some();

    if has_date || imie_matki.is_some() || imie_ojca.is_some() {
        out.push_str("<kryteriumDanychUrodzenia>");
        if has_date {
            out.push_str("<dataUrodzenia>");
            if let Some(exact) = data {
                // Exact date wins; a supplied range is dropped.
                push_element(out, "kryteriumDaty", exact);
            } else {
                out.push_str("<kryteriumPrzedzialDat>");
                if let Some(od) = data_od {
                    push_element(out, "dataOd", od);
                }
                if let Some(dokonca) = data_do {
                    push_element(out, "dataDo", dokonca);
                }
                out.push_str("</kryteriumPrzedzialDat>");
            }
            out.push_str("</dataUrodzenia>");
        }
        if let Some(value) = imie_matki {
            push_name_element(out, "imieMatki", value);
        }
        if let Some(value) = imie_ojca {
            push_name_element(out, "imieOjca", value);
        }
        out.push_str("<zakres>DANE_AKTUALNE</zakres>");
        out.push_str("</kryteriumDanychUrodzenia>");
    }

    out.push_str("</kryteriaWyszukiwania>");
}

// ============================================================================
// SECTION: Person Registry Envelopes
// ============================================================================

/// Renders the full person-search envelope (`wyszukajOsoby`).
#[must_use]
pub fn search_person_envelope(req: &SearchPersonRequest, request_id: &RequestId) -> String {
    let mut out = open_pesel_envelope("wyszukajOsoby");
    push_element(&mut out, "requestId", request_id.as_str());
    push_search_criteria(&mut out, req, true);
    close_pesel_envelope(&mut out, "wyszukajOsoby");
    out
}

/// Renders the basic-data person-search envelope
/// (`wyszukajPodstawoweDaneOsoby`). Accepts only an exact birth date.
#[must_use]
pub fn search_basic_person_envelope(req: &SearchPersonRequest, request_id: &RequestId) -> String {
    let mut out = open_pesel_envelope("wyszukajPodstawoweDaneOsoby");
    push_element(&mut out, "requestId", request_id.as_str());
    push_search_criteria(&mut out, req, false);
    close_pesel_envelope(&mut out, "wyszukajPodstawoweDaneOsoby");
    out
}

/// Renders the share-person-by-id envelope
/// (`udostepnijAktualneDaneOsobyPoId`).
#[must_use]
pub fn get_person_by_id_envelope(req: &GetPersonRequest, request_id: &RequestId) -> String {
    let mut out = open_pesel_envelope("udostepnijAktualneDaneOsobyPoId");
    push_element(&mut out, "requestId", request_id.as_str());
    push_element(&mut out, "idOsoby", req.id_osoby.trim());
    close_pesel_envelope(&mut out, "udostepnijAktualneDaneOsobyPoId");
    out
}

/// Renders the share-person-by-PESEL envelope
/// (`udostepnijAktualneDaneOsobyPoPesel`).
#[must_use]
pub fn get_person_by_pesel_envelope(
    req: &GetPersonByPeselRequest,
    request_id: &RequestId,
) -> String {
    let mut out = open_pesel_envelope("udostepnijAktualneDaneOsobyPoPesel");
    push_element(&mut out, "requestId", request_id.as_str());
    push_element(&mut out, "numerPesel", req.pesel.trim());
    close_pesel_envelope(&mut out, "udostepnijAktualneDaneOsobyPoPesel");
    out
}

// ============================================================================
// SECTION: Identity-Document Envelopes
// ============================================================================

/// Renders the current-photo envelope (`udostepnijAktualneZdjecie`).
#[must_use]
pub fn get_current_photo_envelope(req: &GetCurrentPhotoRequest, request_id: &RequestId) -> String {
    let mut out = open_rdo_envelope("udostepnijAktualneZdjecie");
    push_element(&mut out, "pesel", req.pesel.trim());
    push_element(&mut out, "idOsoby", req.id_osoby.trim());
    push_element(&mut out, "requestId", request_id.as_str());
    close_rdo_envelope(&mut out, "udostepnijAktualneZdjecie");
    out
}

/// Renders the current-id-cards-by-PESEL envelope
/// (`udostepnijDaneAktualnychDowodowPoPesel`).
#[must_use]
pub fn get_id_card_envelope(req: &GetIdCardRequest) -> String {
    let mut out = open_rdo_envelope("udostepnijDaneAktualnychDowodowPoPesel");
    out.push_str("<listaNumerowPesel>");
    for pesel in &req.numery_pesel {
        push_element(&mut out, "numerPesel", pesel.trim());
    }
    out.push_str("</listaNumerowPesel>");
    close_rdo_envelope(&mut out, "udostepnijDaneAktualnychDowodowPoPesel");
    out
}

// ============================================================================
// SECTION: Dictionary Envelopes
// ============================================================================

/// Renders the list-dictionaries envelope (`pobierzListeSlownikow`).
///
/// Filters are optional; an unfiltered request returns every dictionary
/// header the reference service publishes.
#[must_use]
pub fn list_dictionaries_envelope(req: &ListDictionariesRequest) -> String {
    let mut out = String::with_capacity(384);
    out.push_str(
        "<soapenv:Envelope xmlns:soapenv='http://schemas.xmlsoap.org/soap/envelope/' \
         xmlns:slw='http://cepik.gov.pl/slowniki/uslugi/udostepnianie/'>",
    );
    out.push_str("<soapenv:Header/><soapenv:Body><slw:pobierzListeSlownikow>");
    if let Some(id) = present(req.id_slownika.as_ref()) {
        push_element(&mut out, "idSlownika", id);
    }
    if let Some(nazwa) = present(req.nazwa_slownika.as_ref()) {
        push_element(&mut out, "nazwaSlownika", nazwa);
    }
    out.push_str("</slw:pobierzListeSlownikow></soapenv:Body></soapenv:Envelope>");
    out
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

    use gateway_core::GetCurrentPhotoRequest;
    use gateway_core::GetIdCardRequest;
    use gateway_core::GetPersonByPeselRequest;
    use gateway_core::ListDictionariesRequest;
    use gateway_core::RequestId;
    use gateway_core::SearchPersonRequest;

    use super::get_current_photo_envelope;
    use super::get_id_card_envelope;
    use super::get_person_by_pesel_envelope;
    use super::list_dictionaries_envelope;
    use super::search_basic_person_envelope;
    use super::search_person_envelope;

    /// Builds a correlation id for envelope assertions.
    fn rid() -> RequestId {
        RequestId::from_caller("req-1").unwrap()
    }

    #[test]
    fn search_envelope_carries_criterion_flags() {
        let req = SearchPersonRequest {
            nazwisko: Some("kowalska-nowak".to_string()),
            imie_pierwsze: Some(" anna ".to_string()),
            ..SearchPersonRequest::default()
        };
        let xml = search_person_envelope(&req, &rid());
        assert!(xml.contains("<pes:wyszukajOsoby>"));
        assert!(xml.contains("<requestId>req-1</requestId>"));
        assert!(xml.contains("<imiePierwsze>ANNA</imiePierwsze>"));
        assert!(xml.contains("<innyZapis>false</innyZapis>"));
        assert!(xml.contains("<nazwisko>KOWALSKA-NOWAK</nazwisko>"));
        assert!(xml.contains("<dowolneNazwisko>true</dowolneNazwisko>"));
        assert!(xml.contains("<innyZapis>true</innyZapis>"));
        assert!(!xml.contains("<kryteriumDanychUrodzenia>"));
    }

    #[test]
    fn exact_birth_date_suppresses_range() {
        let req = SearchPersonRequest {
            pesel: Some("73020916558".to_string()),
            data_urodzenia: Some("1973-02-09".to_string()),
            data_urodzenia_od: Some("1970-01-01".to_string()),
            data_urodzenia_do: Some("1975-12-31".to_string()),
            ..SearchPersonRequest::default()
        };
        let xml = search_person_envelope(&req, &rid());
        assert!(xml.contains("<kryteriumDaty>1973-02-09</kryteriumDaty>"));
        assert!(!xml.contains("kryteriumPrzedzialDat"));
    }

    #[test]
    fn range_renders_when_no_exact_date() {
        let req = SearchPersonRequest {
            nazwisko: Some("NOWAK".to_string()),
            imie_pierwsze: Some("JAN".to_string()),
            data_urodzenia_od: Some("1970-01-01".to_string()),
            ..SearchPersonRequest::default()
        };
        let xml = search_person_envelope(&req, &rid());
        assert!(xml.contains("<kryteriumPrzedzialDat><dataOd>1970-01-01</dataOd></kryteriumPrzedzialDat>"));
    }

    #[test]
    fn basic_search_ignores_range_fields() {
        let req = SearchPersonRequest {
            nazwisko: Some("NOWAK".to_string()),
            imie_pierwsze: Some("JAN".to_string()),
            data_urodzenia_od: Some("1970-01-01".to_string()),
            ..SearchPersonRequest::default()
        };
        let xml = search_basic_person_envelope(&req, &rid());
        assert!(xml.contains("<pes:wyszukajPodstawoweDaneOsoby>"));
        assert!(!xml.contains("kryteriumPrzedzialDat"));
        assert!(!xml.contains("<dataUrodzenia>"));
    }

    #[test]
    fn escapes_injected_markup() {
        let req = SearchPersonRequest {
            nazwisko: Some("x<script>".to_string()),
            imie_pierwsze: Some("a&b".to_string()),
            ..SearchPersonRequest::default()
        };
        let xml = search_person_envelope(&req, &rid());
        assert!(xml.contains("<nazwisko>X&lt;SCRIPT&gt;</nazwisko>"));
        assert!(xml.contains("<imiePierwsze>A&amp;B</imiePierwsze>"));
        assert!(!xml.contains("<script>"));
    }

    #[test]
    fn by_pesel_envelope_shape() {
        let req = GetPersonByPeselRequest {
            pesel: " 73020916558 ".to_string(),
        };
        let xml = get_person_by_pesel_envelope(&req, &rid());
        assert!(xml.contains("<pes:udostepnijAktualneDaneOsobyPoPesel>"));
        assert!(xml.contains("<numerPesel>73020916558</numerPesel>"));
    }

    #[test]
    fn photo_envelope_orders_fields() {
        let req = GetCurrentPhotoRequest {
            id_osoby: "42".to_string(),
            pesel: "73020916558".to_string(),
        };
        let xml = get_current_photo_envelope(&req, &rid());
        let pesel_at = xml.find("<pesel>").unwrap();
        let id_at = xml.find("<idOsoby>").unwrap();
        let rid_at = xml.find("<requestId>").unwrap();
        assert!(pesel_at < id_at && id_at < rid_at);
        assert!(xml.contains("<dow:udostepnijAktualneZdjecie>"));
    }

    #[test]
    fn id_card_envelope_lists_every_pesel() {
        let req = GetIdCardRequest {
            numery_pesel: vec!["111".to_string(), " 222 ".to_string()],
        };
        let xml = get_id_card_envelope(&req);
        assert!(xml.contains(
            "<listaNumerowPesel><numerPesel>111</numerPesel><numerPesel>222</numerPesel></listaNumerowPesel>"
        ));
    }

    #[test]
    fn dictionary_envelope_with_and_without_filters() {
        let bare = list_dictionaries_envelope(&ListDictionariesRequest::default());
        assert!(bare.contains("<slw:pobierzListeSlownikow></slw:pobierzListeSlownikow>"));

        let filtered = list_dictionaries_envelope(&ListDictionariesRequest {
            id_slownika: Some("7".to_string()),
            nazwa_slownika: None,
        });
        assert!(filtered.contains("<idSlownika>7</idSlownika>"));
    }
}
