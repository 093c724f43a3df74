// crates/gateway-services/src/fixtures.rs
// ============================================================================
// Module: Fixture Services
// Description: Canned-data implementations of the operation traits.
// Purpose: Serve deterministic test-mode answers without any upstream.
// Dependencies: gateway-core, gateway-soap
// ============================================================================

//! ## Overview
//! When an endpoint runs with `test_mode` enabled, the gateway swaps the
//! live service for a fixture implementation of the same trait. The canned
//! rules mirror the upstream test environment:
//! - search: the dataset holds thirteen NOWAK/TOMASZ persons, sons of
//!   KAZIMIERZ, born between 1970 and 1973; one of them carries PESEL
//!   `73020916558`. Searching NOWAK/TOMASZ without the father's name
//!   answers the match-limit business error.
//! - share by PESEL: only `11111111111` resolves; the canned response body
//!   runs through the real response mapper.
//! Invariants:
//! - Fixture answers use the same envelope shape, statuses, and messages as
//!   the live services.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use gateway_core::DictionaryHeader;
use gateway_core::DictionaryListResponse;
use gateway_core::FoundPerson;
use gateway_core::GatewayResponse;
use gateway_core::GetCurrentPhotoRequest;
use gateway_core::GetIdCardRequest;
use gateway_core::GetPersonByPeselRequest;
use gateway_core::GetPersonRequest;
use gateway_core::IdCard;
use gateway_core::IdCardHolder;
use gateway_core::IdCardResponse;
use gateway_core::ListDictionariesRequest;
use gateway_core::PersonDetailResponse;
use gateway_core::PhotoResponse;
use gateway_core::RequestIdGenerator;
use gateway_core::SearchPersonRequest;
use gateway_core::SearchPersonResponse;
use gateway_core::dates::to_hyphenated;
use gateway_soap::mappers::map_person_by_pesel;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::actions;
use crate::dictionary::DictionaryOperations;
use crate::document::DocumentOperations;
use crate::error::Cancelled;
use crate::error::envelope_from_mapping;
use crate::person::PersonOperations;

// ============================================================================
// SECTION: Canned Data
// ============================================================================

/// The only PESEL the fixture share operation resolves.
const FIXTURE_SHARE_PESEL: &str = "11111111111";
/// The single living fixture match reachable by PESEL search.
const FIXTURE_SEARCH_PESEL: &str = "73020916558";
/// Business-error message for the underspecified NOWAK/TOMASZ search.
const TOO_MANY_MATCHES: &str = "Znaleziono więcej niż 50 osób!";
/// Business-error message when the fixture share finds nobody.
const NO_PERSON_DATA: &str = "Brak danych osoby dla podanego numeru PESEL.";
/// Father's name shared by the whole fixture family.
const FIXTURE_FATHER: &str = "KAZIMIERZ";
/// A valid one-pixel PNG, base64 encoded.
const FIXTURE_PHOTO: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJ\
AAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

/// Canned share-by-PESEL response body, parsed by the real mapper.
const SHARE_RESPONSE_XML: &str = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <pes:udostepnijAktualneDaneOsobyPoPeselResponse xmlns:pes="http://msw.gov.pl/srp/v3_0/uslugi/pesel/">
      <daneOsoby>
        <idOsoby>100001</idOsoby>
        <pesel>11111111111</pesel>
        <czyAnulowano>false</czyAnulowano>
        <daneImion><imiePierwsze>JAN</imiePierwsze></daneImion>
        <daneNazwiska>
          <nazwisko>KOWALSKI</nazwisko>
          <nazwiskoRodowe><nazwisko>KOWALSKI</nazwisko></nazwiskoRodowe>
        </daneNazwiska>
        <daneObywatelstwa><obywatelstwo>polskie</obywatelstwo></daneObywatelstwa>
        <daneDowoduOsobistego>
          <seriaINumer>ABC123456</seriaINumer>
          <dataWaznosci>20301001</dataWaznosci>
          <wystawca><kodTerytorialny>1465</kodTerytorialny></wystawca>
        </daneDowoduOsobistego>
        <danePobytuStalego>
          <miejscowoscDzielnica><nazwaMiejscowosci>WARSZAWA</nazwaMiejscowosci></miejscowoscDzielnica>
          <ulica><cecha>ul.</cecha><nazwaPierwsza>DLUGA</nazwaPierwsza></ulica>
          <numerDomu>5</numerDomu>
          <dataOd>20010315</dataOd>
        </danePobytuStalego>
        <daneUrodzenia>
          <dataUrodzenia>19650412</dataUrodzenia>
          <miejsceUrodzenia><nazwaMiejscowosci>KRAKOW</nazwaMiejscowosci></miejsceUrodzenia>
          <imieMatki>MARIA</imieMatki>
        </daneUrodzenia>
      </daneOsoby>
    </pes:udostepnijAktualneDaneOsobyPoPeselResponse>
  </soapenv:Body>
</soapenv:Envelope>"#;

/// Builds the thirteen-person NOWAK/TOMASZ fixture family.
fn fixture_persons() -> Vec<FoundPerson> {
    let entries: [(&str, &str, bool); 13] = [
        ("200001", "1970-10-01", true),
        ("200002", "1970-12-24", true),
        ("200003", "1971-02-11", true),
        ("200004", "1971-05-30", true),
        ("200005", "1971-09-17", false),
        ("200006", "1972-01-05", true),
        ("200007", "1972-04-22", true),
        ("200008", "1972-08-08", true),
        ("200009", "1972-11-19", true),
        ("200010", "1973-02-09", true),
        ("200011", "1973-06-14", true),
        ("200012", "1973-10-03", true),
        ("200013", "1973-12-31", true),
    ];
    entries
        .iter()
        .map(|(id_osoby, born, alive)| FoundPerson {
            id_osoby: Some((*id_osoby).to_string()),
            pesel: Some(pesel_for(id_osoby, born)),
            nazwisko: Some("NOWAK".to_string()),
            imie_pierwsze: Some("TOMASZ".to_string()),
            miejsce_urodzenia: Some("WARSZAWA".to_string()),
            data_urodzenia: Some((*born).to_string()),
            plec: Some("M".to_string()),
            czy_zyje: Some(*alive),
            czy_pesel_anulowany: Some(false),
            ..FoundPerson::default()
        })
        .collect()
}

/// Deterministic fixture PESEL; one person carries the well-known value.
fn pesel_for(id_osoby: &str, born: &str) -> String {
    if born == "1973-02-09" {
        return FIXTURE_SEARCH_PESEL.to_string();
    }
    let digits: String = born.chars().filter(char::is_ascii_digit).collect();
    format!("{}{}", &digits[2..], &id_osoby[1..6])
}

// ============================================================================
// SECTION: Person Fixture
// ============================================================================

/// Fixture person service serving the canned family.
pub struct FixturePersonService {
    /// Correlation id source.
    ids: Arc<RequestIdGenerator>,
}

impl FixturePersonService {
    /// Creates the fixture service.
    #[must_use]
    pub fn new(ids: Arc<RequestIdGenerator>) -> Self {
        Self { ids }
    }
}

#[async_trait]
impl PersonOperations for FixturePersonService {
    async fn search_person(
        &self,
        mut request: SearchPersonRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<SearchPersonResponse>, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        let request_id = self.ids.resolve(caller_request_id);
        info!(request_id = %request_id.as_str(), "fixture search person");

        if let Err(validation) = request.validate_and_normalize(true) {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_SRP,
                400,
                validation.to_string(),
            ));
        }

        let mut persons = fixture_persons();
        if let Some(pesel) = request.pesel.as_deref().filter(|p| !p.trim().is_empty()) {
            persons.retain(|p| p.pesel.as_deref() == Some(pesel.trim()));
        } else {
            persons.retain(|p| {
                matches_upper(p.nazwisko.as_deref(), request.nazwisko.as_deref())
                    && matches_upper(p.imie_pierwsze.as_deref(), request.imie_pierwsze.as_deref())
                    && request
                        .imie_ojca
                        .as_deref()
                        .filter(|f| !f.trim().is_empty())
                        .is_none_or(|f| f.trim().eq_ignore_ascii_case(FIXTURE_FATHER))
            });
        }
        if let Some(born) = request.data_urodzenia.as_deref() {
            let hyphenated = to_hyphenated(born);
            persons.retain(|p| p.data_urodzenia == hyphenated);
        }

        // The canned registry reports a match-limit overflow for the
        // underspecified family search.
        let underspecified = request.pesel.as_deref().unwrap_or("").trim().is_empty()
            && matches_upper(Some("NOWAK"), request.nazwisko.as_deref())
            && matches_upper(Some("TOMASZ"), request.imie_pierwsze.as_deref())
            && request.imie_ojca.as_deref().unwrap_or("").trim().is_empty();
        if underspecified {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_SRP,
                406,
                TOO_MANY_MATCHES,
            ));
        }

        if request.czy_zyje == Some(true) {
            persons.retain(|p| p.czy_zyje != Some(false));
        }
        for person in &mut persons {
            if person.czy_zyje == Some(true) {
                person.zdjecie = Some(FIXTURE_PHOTO.to_string());
            }
        }

        Ok(GatewayResponse::success(
            request_id,
            actions::SOURCE_SRP,
            SearchPersonResponse { persons },
        ))
    }

    async fn get_person_by_id(
        &self,
        request: GetPersonRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<PersonDetailResponse>, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        let request_id = self.ids.resolve(caller_request_id);
        if let Err(validation) = request.validate() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_SRP,
                400,
                validation.to_string(),
            ));
        }
        if request.id_osoby.trim() != "100001" {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_SRP,
                404,
                NO_PERSON_DATA,
            ));
        }
        canned_share_response(request_id)
    }

    async fn get_person_by_pesel(
        &self,
        request: GetPersonByPeselRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<PersonDetailResponse>, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        let request_id = self.ids.resolve(caller_request_id);
        if let Err(validation) = request.validate() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_SRP,
                400,
                validation.to_string(),
            ));
        }
        if request.pesel.trim() != FIXTURE_SHARE_PESEL {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_SRP,
                404,
                NO_PERSON_DATA,
            ));
        }
        canned_share_response(request_id)
    }
}

/// Runs the canned share body through the real mapper.
fn canned_share_response(
    request_id: gateway_core::RequestId,
) -> Result<GatewayResponse<PersonDetailResponse>, Cancelled> {
    match map_person_by_pesel(SHARE_RESPONSE_XML) {
        Ok(response) => Ok(GatewayResponse::success(
            request_id,
            actions::SOURCE_SRP,
            response,
        )),
        Err(error) => Ok(envelope_from_mapping(
            request_id,
            actions::SOURCE_SRP,
            &error,
        )),
    }
}

/// Case-insensitive comparison of trimmed optional names.
fn matches_upper(actual: Option<&str>, wanted: Option<&str>) -> bool {
    match (actual, wanted) {
        (Some(a), Some(w)) => a.trim().eq_ignore_ascii_case(w.trim()),
        _ => false,
    }
}

// ============================================================================
// SECTION: Document Fixture
// ============================================================================

/// Fixture document service serving the canned photo and id card.
pub struct FixtureDocumentService {
    /// Correlation id source.
    ids: Arc<RequestIdGenerator>,
}

impl FixtureDocumentService {
    /// Creates the fixture service.
    #[must_use]
    pub fn new(ids: Arc<RequestIdGenerator>) -> Self {
        Self { ids }
    }
}

#[async_trait]
impl DocumentOperations for FixtureDocumentService {
    async fn get_current_photo(
        &self,
        request: GetCurrentPhotoRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<PhotoResponse>, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        let request_id = self.ids.resolve(caller_request_id);
        if let Err(validation) = request.validate() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_RDO,
                400,
                validation.to_string(),
            ));
        }
        Ok(GatewayResponse::success(
            request_id,
            actions::SOURCE_RDO,
            PhotoResponse {
                photos_base64: vec![FIXTURE_PHOTO.to_string()],
            },
        ))
    }

    async fn get_id_card(
        &self,
        request: GetIdCardRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<IdCardResponse>, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        let request_id = self.ids.resolve(caller_request_id);
        if let Err(validation) = request.validate() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_RDO,
                400,
                validation.to_string(),
            ));
        }
        let dowody = request
            .numery_pesel
            .iter()
            .filter(|p| p.trim() == FIXTURE_SHARE_PESEL)
            .map(|pesel| IdCard {
                id_dowodu: Some("900001".to_string()),
                seria: Some("ABC".to_string()),
                numer: Some("123456".to_string()),
                data_wydania: Some("2020-10-01".to_string()),
                data_waznosci: Some("2030-10-01".to_string()),
                status_dokumentu: Some("WAZNY".to_string()),
                dane_osobowe: Some(IdCardHolder {
                    imie_pierwsze: Some("JAN".to_string()),
                    nazwisko_czlon_pierwszy: Some("KOWALSKI".to_string()),
                    nazwisko_rodowe: Some("KOWALSKI".to_string()),
                    pesel: Some(pesel.trim().to_string()),
                    id_osoby: Some("100001".to_string()),
                    ..IdCardHolder::default()
                }),
                ..IdCard::default()
            })
            .collect();
        Ok(GatewayResponse::success(
            request_id,
            actions::SOURCE_RDO,
            IdCardResponse { dowody },
        ))
    }
}

// ============================================================================
// SECTION: Dictionary Fixture
// ============================================================================

/// Fixture dictionary service with a static header listing.
pub struct FixtureDictionaryService {
    /// Correlation id source.
    ids: Arc<RequestIdGenerator>,
}

impl FixtureDictionaryService {
    /// Creates the fixture service.
    #[must_use]
    pub fn new(ids: Arc<RequestIdGenerator>) -> Self {
        Self { ids }
    }
}

#[async_trait]
impl DictionaryOperations for FixtureDictionaryService {
    async fn list_dictionaries(
        &self,
        request: ListDictionariesRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<DictionaryListResponse>, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        let request_id = self.ids.resolve(caller_request_id);
        let mut slowniki = vec![
            header("1", "MARKI_POJAZDOW", "Słownik marek pojazdów"),
            header("2", "RODZAJE_PALIWA", "Słownik rodzajów paliwa"),
            header("3", "KATEGORIE_PRAWA_JAZDY", "Słownik kategorii prawa jazdy"),
        ];
        if let Some(id) = request.id_slownika.as_deref().filter(|s| !s.trim().is_empty()) {
            slowniki.retain(|s| s.id.as_deref() == Some(id.trim()));
        }
        if let Some(name) = request
            .nazwa_slownika
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            slowniki.retain(|s| {
                s.nazwa_slownika
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(name.trim()))
            });
        }
        Ok(GatewayResponse::success(
            request_id,
            actions::SOURCE_CEP,
            DictionaryListResponse { slowniki },
        ))
    }
}

/// Builds one canned dictionary header.
fn header(id: &str, name: &str, opis: &str) -> DictionaryHeader {
    DictionaryHeader {
        id: Some(id.to_string()),
        nazwa_slownika: Some(name.to_string()),
        opis: Some(opis.to_string()),
        data_aktualizacji: Some("2024-01-15".to_string()),
        rodzaj_kod: Some("SLOWNIK".to_string()),
        rodzaj_opis: Some("Słownik referencyjny".to_string()),
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

    use std::sync::Arc;

    use gateway_core::GatewayStatus;
    use gateway_core::GetPersonByPeselRequest;
    use gateway_core::RequestIdGenerator;
    use gateway_core::SearchPersonRequest;
    use tokio_util::sync::CancellationToken;

    use super::FixturePersonService;
    use super::PersonOperations;
    use super::TOO_MANY_MATCHES;

    /// Builds a fixture person service with a test id generator.
    fn service() -> FixturePersonService {
        FixturePersonService::new(Arc::new(RequestIdGenerator::new("test")))
    }

    #[tokio::test]
    async fn pesel_search_yields_the_single_living_match() {
        let cancel = CancellationToken::new();
        let envelope = service()
            .search_person(
                SearchPersonRequest {
                    pesel: Some("73020916558".to_string()),
                    ..SearchPersonRequest::default()
                },
                None,
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(envelope.status, GatewayStatus::Success);
        let persons = envelope.data.unwrap().persons;
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].pesel.as_deref(), Some("73020916558"));
        assert_eq!(persons[0].czy_zyje, Some(true));
    }

    #[tokio::test]
    async fn family_search_with_father_yields_thirteen() {
        let cancel = CancellationToken::new();
        let envelope = service()
            .search_person(
                SearchPersonRequest {
                    nazwisko: Some("NOWAK".to_string()),
                    imie_pierwsze: Some("TOMASZ".to_string()),
                    imie_ojca: Some("KAZIMIERZ".to_string()),
                    ..SearchPersonRequest::default()
                },
                None,
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(envelope.status, GatewayStatus::Success);
        assert_eq!(envelope.data.unwrap().persons.len(), 13);
    }

    #[tokio::test]
    async fn underspecified_family_search_hits_the_match_limit() {
        let cancel = CancellationToken::new();
        let envelope = service()
            .search_person(
                SearchPersonRequest {
                    nazwisko: Some("NOWAK".to_string()),
                    imie_pierwsze: Some("TOMASZ".to_string()),
                    ..SearchPersonRequest::default()
                },
                None,
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(envelope.status, GatewayStatus::BusinessError);
        assert_eq!(envelope.source_status_code, 406);
        assert_eq!(envelope.error_message.as_deref(), Some(TOO_MANY_MATCHES));
    }

    #[tokio::test]
    async fn unknown_criteria_yield_an_empty_result() {
        let cancel = CancellationToken::new();
        let envelope = service()
            .search_person(
                SearchPersonRequest {
                    nazwisko: Some("WISNIEWSKA".to_string()),
                    imie_pierwsze: Some("ANNA".to_string()),
                    ..SearchPersonRequest::default()
                },
                None,
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(envelope.status, GatewayStatus::Success);
        assert!(envelope.data.unwrap().persons.is_empty());
    }

    #[tokio::test]
    async fn share_by_pesel_resolves_only_the_fixture_pesel() {
        let cancel = CancellationToken::new();
        let svc = service();

        let hit = svc
            .get_person_by_pesel(
                GetPersonByPeselRequest {
                    pesel: "11111111111".to_string(),
                },
                None,
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(hit.status, GatewayStatus::Success);
        let osoba = hit.data.unwrap().dane_osoby.unwrap();
        assert_eq!(osoba.pesel.as_deref(), Some("11111111111"));

        let miss = svc
            .get_person_by_pesel(
                GetPersonByPeselRequest {
                    pesel: "22222222222".to_string(),
                },
                None,
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(miss.status, GatewayStatus::BusinessError);
        assert_eq!(miss.source_status_code, 404);
    }

    #[tokio::test]
    async fn exact_birth_date_narrows_the_family() {
        let cancel = CancellationToken::new();
        let envelope = service()
            .search_person(
                SearchPersonRequest {
                    nazwisko: Some("NOWAK".to_string()),
                    imie_pierwsze: Some("TOMASZ".to_string()),
                    imie_ojca: Some("KAZIMIERZ".to_string()),
                    data_urodzenia: Some("19730209".to_string()),
                    ..SearchPersonRequest::default()
                },
                None,
                &cancel,
            )
            .await
            .unwrap();
        let persons = envelope.data.unwrap().persons;
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].pesel.as_deref(), Some("73020916558"));
    }
}
