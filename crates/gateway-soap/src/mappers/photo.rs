// crates/gateway-soap/src/mappers/photo.rs
// ============================================================================
// Module: Current Photo Mapper
// Description: Maps `udostepnijAktualneZdjecieResponse` into base64 photos.
// Purpose: Extract photo payloads without decoding them.
// Dependencies: base64, gateway-core, gateway-soap::dom
// ============================================================================

//! Maps the current-photo response. Photo payloads stay base64-encoded end
//! to end; entries that are blank or fail base64 validation are dropped
//! rather than failing the whole response, since a single corrupt photo
//! must not hide the rest.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use gateway_core::PhotoResponse;

use crate::RDO_NS;
use crate::dom::XmlElement;
use crate::mappers::MappingError;
use crate::mappers::find_wrapper;

// ============================================================================
// SECTION: Mapping
// ============================================================================

/// Maps a raw current-photo response body.
///
/// # Errors
///
/// Returns [`MappingError`] when the body is blank, malformed, or lacks the
/// `udostepnijAktualneZdjecieResponse` wrapper.
pub fn map_current_photo(raw_xml: &str) -> Result<PhotoResponse, MappingError> {
    let wrapper = find_wrapper(raw_xml, RDO_NS, "udostepnijAktualneZdjecieResponse")?;
    let mut photos = Vec::new();
    collect_photos(&wrapper, &mut photos);
    Ok(PhotoResponse {
        photos_base64: photos,
    })
}

/// Collects valid `zdjecie` payloads from the wrapper subtree.
fn collect_photos(el: &XmlElement, out: &mut Vec<String>) {
    for child in el.children() {
        if child.local_name().eq_ignore_ascii_case("zdjecie") {
            if let Some(payload) = child.text() {
                // Whitespace inside the payload is legal in XML base64.
                let compact: String = payload.split_whitespace().collect();
                if !compact.is_empty() && STANDARD.decode(&compact).is_ok() {
                    out.push(compact);
                }
            }
        } else {
            collect_photos(child, out);
        }
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

    use super::map_current_photo;

    #[test]
    fn keeps_valid_photos_and_drops_invalid_ones() {
        let xml = r#"<e:Envelope xmlns:e="http://schemas.xmlsoap.org/soap/envelope/">
          <e:Body>
            <dow:udostepnijAktualneZdjecieResponse xmlns:dow="http://msw.gov.pl/srp/v3_0/uslugi/dowody/">
              <zdjecie>QUJD</zdjecie>
              <zdjecie>not!!base64</zdjecie>
              <zdjecie>  </zdjecie>
              <zdjecie>REVG</zdjecie>
            </dow:udostepnijAktualneZdjecieResponse>
          </e:Body></e:Envelope>"#;
        let resp = map_current_photo(xml).unwrap();
        assert_eq!(resp.photos_base64, vec!["QUJD", "REVG"]);
        assert_eq!(resp.first_photo(), Some("QUJD"));
    }

    #[test]
    fn empty_response_yields_no_photos() {
        let xml = r#"<e:Envelope xmlns:e="http://schemas.xmlsoap.org/soap/envelope/">
          <e:Body>
            <dow:udostepnijAktualneZdjecieResponse xmlns:dow="http://msw.gov.pl/srp/v3_0/uslugi/dowody/"/>
          </e:Body></e:Envelope>"#;
        let resp = map_current_photo(xml).unwrap();
        assert!(resp.photos_base64.is_empty());
        assert!(resp.first_photo().is_none());
    }

    #[test]
    fn wire_whitespace_in_payload_is_compacted() {
        let xml = r#"<e:Envelope xmlns:e="http://schemas.xmlsoap.org/soap/envelope/">
          <e:Body>
            <dow:udostepnijAktualneZdjecieResponse xmlns:dow="http://msw.gov.pl/srp/v3_0/uslugi/dowody/">
              <zdjecie>QUJD
REVG</zdjecie>
            </dow:udostepnijAktualneZdjecieResponse>
          </e:Body></e:Envelope>"#;
        let resp = map_current_photo(xml).unwrap();
        assert_eq!(resp.photos_base64, vec!["QUJDREVG"]);
    }
}
