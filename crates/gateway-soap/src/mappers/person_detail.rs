// crates/gateway-soap/src/mappers/person_detail.rs
// ============================================================================
// Module: Person Detail Mapper
// Description: Maps share-person responses into the nested detail record.
// Purpose: Serve both the by-PESEL and by-id sharing operations.
// Dependencies: gateway-core, gateway-soap::dom
// ============================================================================

//! Maps the `udostepnijAktualneDaneOsobyPoPesel` / `...PoId` responses. The
//! two operations return the same `daneOsoby` payload under different
//! wrapper names. A present wrapper without `daneOsoby` maps to an empty
//! response; the service layer turns that into a business error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gateway_core::PersonDetailResponse;
use gateway_core::records::BirthData;
use gateway_core::records::IdentityDocument;
use gateway_core::records::MaritalStatus;
use gateway_core::records::PassportData;
use gateway_core::records::PersonDetail;
use gateway_core::records::PersonNames;
use gateway_core::records::PersonSurnames;
use gateway_core::records::ResidenceAddress;

use crate::PESEL_NS;
use crate::dom::XmlElement;
use crate::mappers::MappingError;
use crate::mappers::bool_of;
use crate::mappers::date_of;
use crate::mappers::find_wrapper;
use crate::mappers::text_in;
use crate::mappers::text_of;

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Maps a share-person-by-PESEL response body.
///
/// # Errors
///
/// Returns [`MappingError`] when the body is blank, malformed, or lacks the
/// `udostepnijAktualneDaneOsobyPoPeselResponse` wrapper.
pub fn map_person_by_pesel(raw_xml: &str) -> Result<PersonDetailResponse, MappingError> {
    let wrapper = find_wrapper(raw_xml, PESEL_NS, "udostepnijAktualneDaneOsobyPoPeselResponse")?;
    Ok(map_wrapper(&wrapper))
}

/// Maps a share-person-by-id response body.
///
/// # Errors
///
/// Returns [`MappingError`] when the body is blank, malformed, or lacks the
/// `udostepnijAktualneDaneOsobyPoIdResponse` wrapper.
pub fn map_person_by_id(raw_xml: &str) -> Result<PersonDetailResponse, MappingError> {
    let wrapper = find_wrapper(raw_xml, PESEL_NS, "udostepnijAktualneDaneOsobyPoIdResponse")?;
    Ok(map_wrapper(&wrapper))
}

// ============================================================================
// SECTION: Block Mapping
// ============================================================================

/// Maps the shared `daneOsoby` payload under either wrapper.
fn map_wrapper(wrapper: &XmlElement) -> PersonDetailResponse {
    let Some(osoba) = wrapper.child("daneOsoby") else {
        return PersonDetailResponse::default();
    };

    let detail = PersonDetail {
        id_osoby: text_of(osoba, "idOsoby"),
        pesel: text_of(osoba, "pesel"),
        czy_anulowano: bool_of(osoba, "czyAnulowano"),
        data_aktualizacji: text_of(osoba, "dataAktualizacji"),
        imiona: osoba.child("daneImion").map(map_names),
        nazwiska: osoba.child("daneNazwiska").map(map_surnames),
        obywatelstwo: text_in(osoba.child("daneObywatelstwa"), "obywatelstwo"),
        kraj_zamieszkania: text_in(osoba.child("daneKrajowZamieszkania"), "krajZamieszkania"),
        dowod_osobisty: osoba.child("daneDowoduOsobistego").map(map_document),
        paszport: osoba.child("danePaszportu").map(map_passport),
        pobyt_staly: osoba.child("danePobytuStalego").map(map_residence),
        pobyt_czasowy: osoba.child("danePobytuCzasowego").map(map_residence),
        stan_cywilny: osoba.child("daneStanuCywilnego").map(map_marital),
        urodzenie: osoba.child("daneUrodzenia").map(map_birth),
    };
    PersonDetailResponse {
        dane_osoby: Some(detail),
    }
}

/// Maps the `daneImion` block.
fn map_names(el: &XmlElement) -> PersonNames {
    PersonNames {
        imie_pierwsze: text_of(el, "imiePierwsze"),
        imie_drugie: text_of(el, "imieDrugie"),
    }
}

/// Maps the `daneNazwiska` block. The family surname nests one level down.
fn map_surnames(el: &XmlElement) -> PersonSurnames {
    PersonSurnames {
        nazwisko: text_of(el, "nazwisko"),
        nazwisko_rodowe: text_in(el.child("nazwiskoRodowe"), "nazwisko"),
    }
}

/// Maps the `daneDowoduOsobistego` block.
fn map_document(el: &XmlElement) -> IdentityDocument {
    let wystawca = el.child("wystawca");
    IdentityDocument {
        seria_i_numer: text_of(el, "seriaINumer"),
        data_waznosci: date_of(el, "dataWaznosci"),
        wystawca_kod_terytorialny: text_in(wystawca, "kodTerytorialny"),
        wystawca_rodzaj_organu: text_in(wystawca, "rodzajOrganu"),
    }
}

/// Maps the `danePaszportu` block.
fn map_passport(el: &XmlElement) -> PassportData {
    PassportData {
        seria_i_numer: text_of(el, "seriaINumer"),
        data_waznosci: date_of(el, "dataWaznosci"),
    }
}

/// Maps a residence block, permanent or temporary.
fn map_residence(el: &XmlElement) -> ResidenceAddress {
    let ulica = el.child("ulica");
    ResidenceAddress {
        miejscowosc: text_in(el.child("miejscowoscDzielnica"), "nazwaMiejscowosci"),
        ulica_cecha: text_in(ulica, "cecha"),
        ulica_nazwa: text_in(ulica, "nazwaPierwsza"),
        numer_domu: text_of(el, "numerDomu"),
        numer_lokalu: text_of(el, "numerLokalu"),
        gmina: text_of(el, "gmina"),
        wojewodztwo: text_of(el, "wojewodztwo"),
        data_od: date_of(el, "dataOd"),
    }
}

/// Maps the `daneStanuCywilnego` block, including the optional spouse.
fn map_marital(el: &XmlElement) -> MaritalStatus {
    let wspolmalzonek = el.child("wspolmalzonek");
    MaritalStatus {
        stan_cywilny: text_of(el, "stanCywilny"),
        data_zawarcia: date_of(el, "dataZawarcia"),
        numer_aktu: text_of(el, "numerAktu"),
        wspolmalzonek_imie: text_in(wspolmalzonek, "imie"),
        wspolmalzonek_pesel: text_in(wspolmalzonek, "numerPesel"),
    }
}

/// Maps the `daneUrodzenia` block.
fn map_birth(el: &XmlElement) -> BirthData {
    BirthData {
        data_urodzenia: date_of(el, "dataUrodzenia"),
        miejsce_urodzenia: text_in(el.child("miejsceUrodzenia"), "nazwaMiejscowosci"),
        kraj_urodzenia: text_of(el, "krajUrodzenia"),
        imie_matki: text_of(el, "imieMatki"),
        imie_ojca: text_of(el, "imieOjca"),
        nazwisko_rodowe_matki: text_of(el, "nazwiskoRodoweMatki"),
        nazwisko_rodowe_ojca: text_of(el, "nazwiskoRodoweOjca"),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
