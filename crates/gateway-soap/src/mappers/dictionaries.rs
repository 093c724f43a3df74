// crates/gateway-soap/src/mappers/dictionaries.rs
// ============================================================================
// Module: Dictionary Mapper
// Description: Maps the dictionary-list response into typed headers.
// Purpose: Serve the reference-data dictionary listing operation.
// Dependencies: gateway-core, gateway-soap::dom
// ============================================================================

//! Maps the `pobierzListeSlownikow` response. The result element is looked
//! up by local name only, because the dictionary service qualifies it
//! differently per environment. Dates stay verbatim here; the dictionary
//! service reports ISO timestamps already.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gateway_core::DictionaryHeader;
use gateway_core::DictionaryListResponse;

use crate::dom;
use crate::dom::XmlElement;
use crate::mappers::MappingError;
use crate::mappers::text_in;
use crate::mappers::text_of;

// ============================================================================
// SECTION: Mapping
// ============================================================================

/// Maps a raw dictionary-list response body.
///
/// # Errors
///
/// Returns [`MappingError`] when the body is blank, malformed, or lacks the
/// `pobierzListeSlownikowRezultat` element.
pub fn map_dictionary_list(raw_xml: &str) -> Result<DictionaryListResponse, MappingError> {
    if raw_xml.trim().is_empty() {
        return Err(MappingError::EmptyBody);
    }
    let root = dom::parse(raw_xml).map_err(|e| MappingError::InvalidXml(e.to_string()))?;
    let rezultat = root
        .descendant("pobierzListeSlownikowRezultat")
        .ok_or(MappingError::MissingWrapper {
            element: "pobierzListeSlownikowRezultat",
        })?;

    let slowniki = rezultat
        .children_named("slownik")
        .map(map_header)
        .collect();
    Ok(DictionaryListResponse { slowniki })
}

/// Maps one `slownik` header element.
fn map_header(el: &XmlElement) -> DictionaryHeader {
    let rodzaj = el.child("rodzajSlownika");
    DictionaryHeader {
        id: text_of(el, "id"),
        nazwa_slownika: text_of(el, "nazwaSlownika"),
        opis: text_of(el, "opis"),
        data_aktualizacji: text_of(el, "dataAktualizacji"),
        rodzaj_kod: text_in(rodzaj, "kod"),
        rodzaj_opis: text_in(rodzaj, "wartoscOpisowa"),
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

    use super::MappingError;
    use super::map_dictionary_list;

    #[test]
    fn maps_headers_with_kind_block() {
        let xml = r#"<e:Envelope xmlns:e="http://schemas.xmlsoap.org/soap/envelope/">
          <e:Body>
            <slw:pobierzListeSlownikowRezultat xmlns:slw="http://cepik.gov.pl/slowniki/uslugi/udostepnianie/">
              <slownik>
                <id>7</id>
                <nazwaSlownika>MARKI</nazwaSlownika>
                <opis>Marki pojazdow</opis>
                <dataAktualizacji>2024-03-01T10:00:00</dataAktualizacji>
                <rodzajSlownika>
                  <kod>S</kod>
                  <wartoscOpisowa>systemowy</wartoscOpisowa>
                </rodzajSlownika>
              </slownik>
              <slownik><id>8</id><nazwaSlownika>KOLORY</nazwaSlownika></slownik>
            </slw:pobierzListeSlownikowRezultat>
          </e:Body></e:Envelope>"#;
        let resp = map_dictionary_list(xml).unwrap();
        assert_eq!(resp.slowniki.len(), 2);
        assert_eq!(resp.slowniki[0].nazwa_slownika.as_deref(), Some("MARKI"));
        assert_eq!(resp.slowniki[0].rodzaj_kod.as_deref(), Some("S"));
        assert_eq!(resp.slowniki[0].rodzaj_opis.as_deref(), Some("systemowy"));
        assert!(resp.slowniki[1].rodzaj_kod.is_none());
    }

    #[test]
    fn missing_result_element_is_an_error() {
        let xml = r#"<e:Envelope xmlns:e="http://schemas.xmlsoap.org/soap/envelope/">
          <e:Body><inny/></e:Body></e:Envelope>"#;
        assert!(matches!(
            map_dictionary_list(xml),
            Err(MappingError::MissingWrapper { .. })
        ));
    }
}
