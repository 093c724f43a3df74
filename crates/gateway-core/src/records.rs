// crates/gateway-core/src/records.rs
// ============================================================================
// Module: Domain Records
// Description: Typed records mapped out of upstream SOAP responses.
// Purpose: Carry person, document, photo, and dictionary data to callers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Records are created fresh by a response mapper and never mutated after
//! construction, with one controlled exception: the search service appends a
//! looked-up photo onto a [`FoundPerson`] after bulk fan-out completes.
//! Missing or blank upstream text becomes `None`, never an empty string.
//! Dates carried here are hyphenated `yyyy-MM-dd`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Search Results
// ============================================================================

/// One person matched by the search operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoundPerson {
    /// Internal registry person identifier.
    #[serde(rename = "idOsoby")]
    pub id_osoby: Option<String>,
    /// National identification number.
    pub pesel: Option<String>,
    /// Series and number of the current identity document.
    #[serde(rename = "seriaINumerDowodu")]
    pub seria_i_numer_dowodu: Option<String>,
    /// Surname.
    pub nazwisko: Option<String>,
    /// First given name.
    #[serde(rename = "imiePierwsze")]
    pub imie_pierwsze: Option<String>,
    /// Second given name.
    #[serde(rename = "imieDrugie")]
    pub imie_drugie: Option<String>,
    /// Place of birth.
    #[serde(rename = "miejsceUrodzenia")]
    pub miejsce_urodzenia: Option<String>,
    /// Birth date, `yyyy-MM-dd`.
    #[serde(rename = "dataUrodzenia")]
    pub data_urodzenia: Option<String>,
    /// Sex as reported by the registry.
    pub plec: Option<String>,
    /// Whether the person is alive; absent when the registry did not say.
    #[serde(rename = "czyZyje")]
    pub czy_zyje: Option<bool>,
    /// Whether the PESEL was cancelled.
    #[serde(rename = "czyPeselAnulowany")]
    pub czy_pesel_anulowany: Option<bool>,
    /// Base64 photo merged in after photo fan-out; absent until then.
    pub zdjecie: Option<String>,
}

/// Result of the person search operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPersonResponse {
    /// Matched persons; empty when nothing matched.
    pub persons: Vec<FoundPerson>,
}

// ============================================================================
// SECTION: Person Detail
// ============================================================================

/// Given names block of a person detail record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonNames {
    /// First given name.
    #[serde(rename = "imiePierwsze")]
    pub imie_pierwsze: Option<String>,
    /// Second given name.
    #[serde(rename = "imieDrugie")]
    pub imie_drugie: Option<String>,
}

/// Surname block of a person detail record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonSurnames {
    /// Current surname.
    pub nazwisko: Option<String>,
    /// Family (birth) surname.
    #[serde(rename = "nazwiskoRodowe")]
    pub nazwisko_rodowe: Option<String>,
}

/// Residence address block, permanent or temporary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidenceAddress {
    /// Town or district name.
    pub miejscowosc: Option<String>,
    /// Street-type designator (ul., al., pl., ...).
    #[serde(rename = "ulicaCecha")]
    pub ulica_cecha: Option<String>,
    /// Street name.
    #[serde(rename = "ulicaNazwa")]
    pub ulica_nazwa: Option<String>,
    /// House number.
    #[serde(rename = "numerDomu")]
    pub numer_domu: Option<String>,
    /// Apartment number.
    #[serde(rename = "numerLokalu")]
    pub numer_lokalu: Option<String>,
    /// Commune name.
    pub gmina: Option<String>,
    /// Voivodeship name.
    pub wojewodztwo: Option<String>,
    /// Residence registered since, `yyyy-MM-dd`.
    #[serde(rename = "dataOd")]
    pub data_od: Option<String>,
}

/// Identity-document block inside a person detail record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityDocument {
    /// Series and number.
    #[serde(rename = "seriaINumer")]
    pub seria_i_numer: Option<String>,
    /// Expiry date, `yyyy-MM-dd`.
    #[serde(rename = "dataWaznosci")]
    pub data_waznosci: Option<String>,
    /// Territorial code of the issuing authority.
    #[serde(rename = "wystawcaKodTerytorialny")]
    pub wystawca_kod_terytorialny: Option<String>,
    /// Kind of the issuing authority.
    #[serde(rename = "wystawcaRodzajOrganu")]
    pub wystawca_rodzaj_organu: Option<String>,
}

/// Passport block inside a person detail record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassportData {
    /// Series and number.
    #[serde(rename = "seriaINumer")]
    pub seria_i_numer: Option<String>,
    /// Expiry date, `yyyy-MM-dd`.
    #[serde(rename = "dataWaznosci")]
    pub data_waznosci: Option<String>,
}

/// Birth-data block inside a person detail record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirthData {
    /// Birth date, `yyyy-MM-dd`.
    #[serde(rename = "dataUrodzenia")]
    pub data_urodzenia: Option<String>,
    /// Place of birth.
    #[serde(rename = "miejsceUrodzenia")]
    pub miejsce_urodzenia: Option<String>,
    /// Country of birth.
    #[serde(rename = "krajUrodzenia")]
    pub kraj_urodzenia: Option<String>,
    /// Mother's given name.
    #[serde(rename = "imieMatki")]
    pub imie_matki: Option<String>,
    /// Father's given name.
    #[serde(rename = "imieOjca")]
    pub imie_ojca: Option<String>,
    /// Mother's family surname.
    #[serde(rename = "nazwiskoRodoweMatki")]
    pub nazwisko_rodowe_matki: Option<String>,
    /// Father's family surname.
    #[serde(rename = "nazwiskoRodoweOjca")]
    pub nazwisko_rodowe_ojca: Option<String>,
}

/// Marital-status block inside a person detail record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaritalStatus {
    /// Marital-status code.
    #[serde(rename = "stanCywilny")]
    pub stan_cywilny: Option<String>,
    /// Date the status was entered, `yyyy-MM-dd`.
    #[serde(rename = "dataZawarcia")]
    pub data_zawarcia: Option<String>,
    /// Civil registry act number.
    #[serde(rename = "numerAktu")]
    pub numer_aktu: Option<String>,
    /// Spouse's given name.
    #[serde(rename = "wspolmalzonekImie")]
    pub wspolmalzonek_imie: Option<String>,
    /// Spouse's PESEL.
    #[serde(rename = "wspolmalzonekPesel")]
    pub wspolmalzonek_pesel: Option<String>,
}

/// Current data of one person, keyed by PESEL or person id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonDetail {
    /// Internal registry person identifier.
    #[serde(rename = "idOsoby")]
    pub id_osoby: Option<String>,
    /// National identification number.
    pub pesel: Option<String>,
    /// Whether the record was cancelled.
    #[serde(rename = "czyAnulowano")]
    pub czy_anulowano: Option<bool>,
    /// Last registry update, verbatim upstream value.
    #[serde(rename = "dataAktualizacji")]
    pub data_aktualizacji: Option<String>,
    /// Given names.
    pub imiona: Option<PersonNames>,
    /// Surnames.
    pub nazwiska: Option<PersonSurnames>,
    /// Citizenship.
    pub obywatelstwo: Option<String>,
    /// Country of residence.
    #[serde(rename = "krajZamieszkania")]
    pub kraj_zamieszkania: Option<String>,
    /// Current identity document.
    #[serde(rename = "dowodOsobisty")]
    pub dowod_osobisty: Option<IdentityDocument>,
    /// Current passport.
    pub paszport: Option<PassportData>,
    /// Permanent residence.
    #[serde(rename = "pobytStaly")]
    pub pobyt_staly: Option<ResidenceAddress>,
    /// Temporary residence.
    #[serde(rename = "pobytCzasowy")]
    pub pobyt_czasowy: Option<ResidenceAddress>,
    /// Marital status.
    #[serde(rename = "stanCywilny")]
    pub stan_cywilny: Option<MaritalStatus>,
    /// Birth data.
    pub urodzenie: Option<BirthData>,
}

/// Result of the person-by-PESEL (and person-by-id) operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDetailResponse {
    /// Person data; absent when the registry found no one.
    #[serde(rename = "daneOsoby")]
    pub dane_osoby: Option<PersonDetail>,
}

// ============================================================================
// SECTION: Document Results
// ============================================================================

/// Result of the current-photo operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoResponse {
    /// Base64-encoded photo payloads; blank entries are dropped by mapping.
    #[serde(rename = "photosBase64")]
    pub photos_base64: Vec<String>,
}

impl PhotoResponse {
    /// Returns the first non-blank photo, if any.
    #[must_use]
    pub fn first_photo(&self) -> Option<&str> {
        self.photos_base64
            .iter()
            .map(String::as_str)
            .find(|p| !p.trim().is_empty())
    }
}

/// Holder data embedded in an id-card record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdCardHolder {
    /// First given name.
    #[serde(rename = "imiePierwsze")]
    pub imie_pierwsze: Option<String>,
    /// Second given name.
    #[serde(rename = "imieDrugie")]
    pub imie_drugie: Option<String>,
    /// Surname, first part.
    #[serde(rename = "nazwiskoCzlonPierwszy")]
    pub nazwisko_czlon_pierwszy: Option<String>,
    /// Surname, second part.
    #[serde(rename = "nazwiskoCzlonDrugi")]
    pub nazwisko_czlon_drugi: Option<String>,
    /// Family (birth) surname.
    #[serde(rename = "nazwiskoRodowe")]
    pub nazwisko_rodowe: Option<String>,
    /// National identification number.
    pub pesel: Option<String>,
    /// Internal registry person identifier.
    #[serde(rename = "idOsoby")]
    pub id_osoby: Option<String>,
}

/// One id-card record from the document registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdCard {
    /// Document identifier.
    #[serde(rename = "idDowodu")]
    pub id_dowodu: Option<String>,
    /// Series of the document.
    pub seria: Option<String>,
    /// Number of the document.
    pub numer: Option<String>,
    /// Issue date, `yyyy-MM-dd`.
    #[serde(rename = "dataWydania")]
    pub data_wydania: Option<String>,
    /// Expiry date, `yyyy-MM-dd`.
    #[serde(rename = "dataWaznosci")]
    pub data_waznosci: Option<String>,
    /// Document status code.
    #[serde(rename = "statusDokumentu")]
    pub status_dokumentu: Option<String>,
    /// Electronic-layer status code.
    #[serde(rename = "statusWarstwyEdo")]
    pub status_warstwy_edo: Option<String>,
    /// Citizenship printed on the document.
    pub obywatelstwo: Option<String>,
    /// Issuing authority name.
    #[serde(rename = "nazwaUrzeduWydajacego")]
    pub nazwa_urzedu_wydajacego: Option<String>,
    /// Issuing authority territorial code.
    #[serde(rename = "kodTerytUrzeduWydajacego")]
    pub kod_teryt_urzedu_wydajacego: Option<String>,
    /// Holder data.
    #[serde(rename = "daneOsobowe")]
    pub dane_osobowe: Option<IdCardHolder>,
    /// Black-and-white photo, base64.
    #[serde(rename = "zdjecieCzarnoBiale")]
    pub zdjecie_czarno_biale: Option<String>,
    /// Color photo, base64.
    #[serde(rename = "zdjecieKolorowe")]
    pub zdjecie_kolorowe: Option<String>,
}

/// Result of the id-card operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCardResponse {
    /// Id cards found for the requested PESELs; empty when none matched.
    pub dowody: Vec<IdCard>,
}

// ============================================================================
// SECTION: Dictionary Results
// ============================================================================

/// Header describing one reference dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryHeader {
    /// Dictionary identifier.
    pub id: Option<String>,
    /// Dictionary name.
    #[serde(rename = "nazwaSlownika")]
    pub nazwa_slownika: Option<String>,
    /// Free-text description.
    pub opis: Option<String>,
    /// Last update date, verbatim upstream value.
    #[serde(rename = "dataAktualizacji")]
    pub data_aktualizacji: Option<String>,
    /// Dictionary kind code.
    #[serde(rename = "rodzajKod")]
    pub rodzaj_kod: Option<String>,
    /// Dictionary kind description.
    #[serde(rename = "rodzajOpis")]
    pub rodzaj_opis: Option<String>,
}

/// Result of the dictionary listing operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryListResponse {
    /// Dictionary headers.
    pub slowniki: Vec<DictionaryHeader>,
}
