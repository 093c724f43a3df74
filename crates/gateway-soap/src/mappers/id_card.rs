// crates/gateway-soap/src/mappers/id_card.rs
// ============================================================================
// Module: Id-Card Mapper
// Description: Maps current-id-card responses into typed card records.
// Purpose: Serve the bulk by-PESEL id-card sharing operation.
// Dependencies: gateway-core, gateway-soap::dom
// ============================================================================

//! Maps the `udostepnijDaneAktualnychDowodowPoPesel` response. The wrapper
//! may carry any number of `dowod` records, one per requested PESEL that
//! holds a current card. Series and number arrive in a nested
//! `seriaINumer` block; holder data nests under `daneOsobowe`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gateway_core::IdCardResponse;
use gateway_core::records::IdCard;
use gateway_core::records::IdCardHolder;

use crate::RDO_NS;
use crate::dom::XmlElement;
use crate::mappers::MappingError;
use crate::mappers::date_of;
use crate::mappers::find_wrapper;
use crate::mappers::text_in;
use crate::mappers::text_of;

// ============================================================================
// SECTION: Mapping
// ============================================================================

/// Maps a raw id-card response body.
///
/// # Errors
///
/// Returns [`MappingError`] when the body is blank, malformed, or lacks the
/// `udostepnijDaneAktualnychDowodowPoPeselResponse` wrapper.
pub fn map_id_cards(raw_xml: &str) -> Result<IdCardResponse, MappingError> {
    let wrapper = find_wrapper(
        raw_xml,
        RDO_NS,
        "udostepnijDaneAktualnychDowodowPoPeselResponse",
    )?;
    let mut dowody = Vec::new();
    collect_cards(&wrapper, &mut dowody);
    Ok(IdCardResponse { dowody })
}

/// Collects every `dowod` record from the wrapper subtree.
fn collect_cards(el: &XmlElement, out: &mut Vec<IdCard>) {
    for child in el.children() {
        if child.local_name().eq_ignore_ascii_case("dowod") {
            out.push(map_card(child));
        } else {
            collect_cards(child, out);
        }
    }
}

/// Maps one `dowod` element.
fn map_card(el: &XmlElement) -> IdCard {
    let seria_i_numer = el.child("seriaINumer");
    IdCard {
        id_dowodu: text_of(el, "idDowodu"),
        seria: text_in(seria_i_numer, "seriaDokumentuTozsamosci"),
        numer: text_in(seria_i_numer, "numerDokumentuTozsamosci"),
        data_wydania: date_of(el, "dataWydania"),
        data_waznosci: date_of(el, "dataWaznosci"),
        status_dokumentu: text_of(el, "statusDokumentu"),
        status_warstwy_edo: text_of(el, "statusWarstwyEdo"),
        obywatelstwo: text_of(el, "obywatelstwo"),
        nazwa_urzedu_wydajacego: text_of(el, "nazwaUrzeduWydajacego"),
        kod_teryt_urzedu_wydajacego: text_of(el, "kodTerytUrzeduWydajacego"),
        dane_osobowe: el.child("daneOsobowe").map(map_holder),
        zdjecie_czarno_biale: text_of(el, "zdjecieCzarnoBiale"),
        zdjecie_kolorowe: text_of(el, "zdjecieKolorowe"),
    }
}

/// Maps the `daneOsobowe` holder block.
fn map_holder(el: &XmlElement) -> IdCardHolder {
    let imie = el.child("imie");
    let nazwisko = el.child("nazwisko");
    IdCardHolder {
        imie_pierwsze: text_in(imie, "imiePierwsze"),
        imie_drugie: text_in(imie, "imieDrugie"),
        nazwisko_czlon_pierwszy: text_in(nazwisko, "czlonPierwszy"),
        nazwisko_czlon_drugi: text_in(nazwisko, "czlonDrugi"),
        nazwisko_rodowe: text_in(el.child("nazwiskoRodowe"), "nazwisko"),
        pesel: text_of(el, "pesel"),
        id_osoby: text_of(el, "idOsoby"),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
