// crates/gateway-services/tests/live_services.rs
// ============================================================================
// Module: Live Service Integration Tests
// Description: Operation services driven against a scripted local server.
// Purpose: Prove validation short-circuits, error classification, and the
//          search photo merge over real sockets.
// Dependencies: gateway-core, gateway-services, tiny_http, tokio
// ============================================================================

//! ## Overview
//! Spins up `tiny_http` servers with scripted response sequences and drives
//! the live [`PersonService`] at them over plain HTTP. The photo fan-out
//! runs against the fixture document service, so a successful search must
//! come back with photos merged into its living matches.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions are permitted."
)]

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;

use gateway_core::GatewayStatus;
use gateway_core::GetPersonByPeselRequest;
use gateway_core::RequestIdGenerator;
use gateway_core::SearchPersonRequest;
use gateway_services::FixtureDocumentService;
use gateway_services::PersonOperations;
use gateway_services::PersonService;
use gateway_services::SrpConfig;
use gateway_transport::EndpointConfig;
use tiny_http::Response;
use tiny_http::Server;
use tokio_util::sync::CancellationToken;

/// Search response with one living and one deceased match.
const SEARCH_BODY: &str = "<soap:Envelope \
    xmlns:soap='http://schemas.xmlsoap.org/soap/envelope/'><soap:Body>\
    <pes:wyszukajOsobyResponse xmlns:pes='http://msw.gov.pl/srp/v3_0/uslugi/pesel/'>\
    <znalezioneOsoby>\
    <znalezionaOsoba><idOsoby>100001</idOsoby><pesel>73020916558</pesel>\
    <nazwisko>NOWAK</nazwisko><imiePierwsze>TOMASZ</imiePierwsze>\
    <dataUrodzenia>19730209</dataUrodzenia><czyZyje>true</czyZyje></znalezionaOsoba>\
    <znalezionaOsoba><idOsoby>100002</idOsoby><pesel>51010112345</pesel>\
    <nazwisko>NOWAK</nazwisko><imiePierwsze>TOMASZ</imiePierwsze>\
    <czyZyje>false</czyZyje></znalezionaOsoba>\
    </znalezioneOsoby>\
    </pes:wyszukajOsobyResponse></soap:Body></soap:Envelope>";

/// Share response carrying no person payload.
const EMPTY_SHARE_BODY: &str = "<soap:Envelope \
    xmlns:soap='http://schemas.xmlsoap.org/soap/envelope/'><soap:Body>\
    <pes:udostepnijAktualneDaneOsobyPoPeselResponse \
    xmlns:pes='http://msw.gov.pl/srp/v3_0/uslugi/pesel/'/>\
    </soap:Body></soap:Envelope>";

/// A SOAP 1.1 fault carrying a registry description.
const FAULT_BODY: &str = "<soap:Envelope \
    xmlns:soap='http://schemas.xmlsoap.org/soap/envelope/'><soap:Body>\
    <soap:Fault><faultcode>soap:Client</faultcode>\
    <faultstring>Przetwarzanie nie powiodlo sie</faultstring>\
    <detail><kod>SRP-0042</kod><opis>Znaleziono wiecej niz 50 osob!</opis>\
    <opisTechniczny>limit przekroczony</opisTechniczny></detail>\
    </soap:Fault></soap:Body></soap:Envelope>";

/// Serves a scripted list of (status, body) pairs, then stops.
fn scripted_server(script: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
    let server = Server::http("127.0.0.1:0").expect("bind test server");
    let addr = server.server_addr().to_ip().expect("tcp listener address");
    let url = format!("http://{addr}/soap");
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for (status, body) in script {
            let Ok(request) = server.recv() else { return };
            hits_srv.fetch_add(1, Ordering::SeqCst);
            let response = Response::from_string(body).with_status_code(status);
            let _ = request.respond(response);
        }
    });
    (url, hits)
}

/// Builds a live person service whose photo fan-out runs on fixture data.
fn person_service(url: &str, max_retries: u32) -> PersonService {
    let mut config = SrpConfig {
        endpoint: EndpointConfig {
            service_name: "SRP".to_string(),
            endpoint_url: url.to_string(),
            test_mode: true,
            attempt_timeout_ms: 2_000,
            total_timeout_ms: 10_000,
            max_retries,
            ..EndpointConfig::default()
        },
        search_service_url: url.to_string(),
        share_service_url: url.to_string(),
    };
    config.validate().expect("test config is valid");
    let ids = Arc::new(RequestIdGenerator::new("services-test"));
    let documents = Arc::new(FixtureDocumentService::new(Arc::clone(&ids)));
    PersonService::new(config, None, documents, ids).expect("build person service")
}

#[tokio::test(flavor = "multi_thread")]
async fn search_merges_a_photo_into_each_living_match() {
    let (url, hits) = scripted_server(vec![(200, SEARCH_BODY)]);
    let service = person_service(&url, 0);
    let cancel = CancellationToken::new();

    let envelope = service
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
        .expect("not cancelled");

    assert_eq!(envelope.status, GatewayStatus::Success);
    let persons = envelope.data.expect("search data").persons;
    assert_eq!(persons.len(), 2);
    let living = persons
        .iter()
        .find(|p| p.czy_zyje == Some(true))
        .expect("living match");
    assert!(living.zdjecie.is_some(), "living match carries a photo");
    let deceased = persons
        .iter()
        .find(|p| p.czy_zyje == Some(false))
        .expect("deceased match");
    assert!(deceased.zdjecie.is_none(), "no photo for the deceased");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn living_filter_drops_the_deceased_before_fanout() {
    let (url, _hits) = scripted_server(vec![(200, SEARCH_BODY)]);
    let service = person_service(&url, 0);
    let cancel = CancellationToken::new();

    let envelope = service
        .search_person(
            SearchPersonRequest {
                nazwisko: Some("NOWAK".to_string()),
                imie_pierwsze: Some("TOMASZ".to_string()),
                czy_zyje: Some(true),
                ..SearchPersonRequest::default()
            },
            None,
            &cancel,
        )
        .await
        .expect("not cancelled");

    let persons = envelope.data.expect("search data").persons;
    assert_eq!(persons.len(), 1);
    assert_eq!(persons[0].czy_zyje, Some(true));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_criteria_never_dial_the_upstream() {
    let (url, hits) = scripted_server(vec![(200, SEARCH_BODY)]);
    let service = person_service(&url, 0);
    let cancel = CancellationToken::new();

    let envelope = service
        .search_person(SearchPersonRequest::default(), None, &cancel)
        .await
        .expect("not cancelled");

    assert_eq!(envelope.status, GatewayStatus::BusinessError);
    assert_eq!(envelope.source_status_code, 400);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_fault_surfaces_the_registry_description() {
    let (url, _hits) = scripted_server(vec![(200, FAULT_BODY)]);
    let service = person_service(&url, 0);
    let cancel = CancellationToken::new();

    let envelope = service
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
        .expect("not cancelled");

    assert_eq!(envelope.status, GatewayStatus::BusinessError);
    assert_eq!(envelope.source_status_code, 400);
    let message = envelope.error_message.expect("fault message");
    assert!(message.contains("Znaleziono wiecej niz 50 osob!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn persistent_503_is_a_technical_error_with_the_status() {
    let (url, hits) = scripted_server(vec![(503, ""); 3]);
    let service = person_service(&url, 2);
    let cancel = CancellationToken::new();

    let envelope = service
        .get_person_by_pesel(
            GetPersonByPeselRequest {
                pesel: "73020916558".to_string(),
            },
            None,
            &cancel,
        )
        .await
        .expect("not cancelled");

    assert_eq!(envelope.status, GatewayStatus::TechnicalError);
    assert_eq!(envelope.source_status_code, 503);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn share_without_a_person_is_a_404_business_error() {
    let (url, _hits) = scripted_server(vec![(200, EMPTY_SHARE_BODY)]);
    let service = person_service(&url, 0);
    let cancel = CancellationToken::new();

    let envelope = service
        .get_person_by_pesel(
            GetPersonByPeselRequest {
                pesel: "73020916558".to_string(),
            },
            None,
            &cancel,
        )
        .await
        .expect("not cancelled");

    assert_eq!(envelope.status, GatewayStatus::BusinessError);
    assert_eq!(envelope.source_status_code, 404);
    assert_eq!(
        envelope.error_message.as_deref(),
        Some("Brak osoby o podanym PESEL.")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn a_cancelled_caller_gets_an_error_not_an_envelope() {
    let (url, hits) = scripted_server(vec![(200, SEARCH_BODY)]);
    let service = person_service(&url, 0);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = service
        .search_person(
            SearchPersonRequest {
                nazwisko: Some("NOWAK".to_string()),
                imie_pierwsze: Some("TOMASZ".to_string()),
                ..SearchPersonRequest::default()
            },
            None,
            &cancel,
        )
        .await;

    assert!(result.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
