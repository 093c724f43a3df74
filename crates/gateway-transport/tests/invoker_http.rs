// crates/gateway-transport/tests/invoker_http.rs
// ============================================================================
// Module: Invoker HTTP Integration Tests
// Description: End-to-end retry and fault behavior against a local server.
// Purpose: Prove the attempt loop, fault probing, and error classification
//          against real sockets.
// Dependencies: gateway-transport, tiny_http, tokio
// ============================================================================

//! ## Overview
//! Spins up `tiny_http` servers with scripted response sequences and drives
//! [`SoapInvoker::invoke`] at them over plain HTTP.

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
use std::time::Duration;

use gateway_core::RequestId;
use gateway_transport::EndpointConfig;
use gateway_transport::InvokeRequest;
use gateway_transport::SoapInvoker;
use gateway_transport::TransportError;
use tiny_http::Response;
use tiny_http::Server;
use tokio_util::sync::CancellationToken;

const FAULT_BODY: &str = "<soap:Envelope \
    xmlns:soap='http://schemas.xmlsoap.org/soap/envelope/'><soap:Body>\
    <soap:Fault><faultcode>soap:Client</faultcode>\
    <faultstring>Brak osoby</faultstring>\
    <detail><kod>404</kod><opis>Nie znaleziono osoby</opis></detail>\
    </soap:Fault></soap:Body></soap:Envelope>";

const OK_BODY: &str = "<soap:Envelope \
    xmlns:soap='http://schemas.xmlsoap.org/soap/envelope/'><soap:Body>\
    <odp xmlns='http://msw.gov.pl/srp/v3_0/uslugi/pesel/'>ok</odp>\
    </soap:Body></soap:Envelope>";

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

/// Builds a validated plain-HTTP test configuration.
fn test_config(url: &str) -> EndpointConfig {
    let mut config = EndpointConfig {
        service_name: "srp".to_string(),
        endpoint_url: url.to_string(),
        test_mode: true,
        attempt_timeout_ms: 2_000,
        total_timeout_ms: 10_000,
        ..EndpointConfig::default()
    };
    config.validate().expect("test config is valid");
    config
}

/// A fixed caller-supplied correlation id.
fn request_id() -> RequestId {
    RequestId::from_caller("invoker-http-test").expect("valid caller id")
}

#[tokio::test(flavor = "multi_thread")]
async fn retries_past_a_503_and_succeeds() {
    let (url, hits) = scripted_server(vec![(503, ""), (200, OK_BODY)]);
    let config = test_config(&url);
    let invoker = SoapInvoker::new(&config, None).expect("build invoker");
    let id = request_id();
    let cancel = CancellationToken::new();
    let outcome = invoker
        .invoke(
            &InvokeRequest {
                endpoint_url: &url,
                soap_action: "http://msw.gov.pl/srp/v3_0/uslugi/pesel/test/",
                envelope: "<e/>",
                request_id: &id,
            },
            &cancel,
        )
        .await
        .expect("second attempt succeeds");
    assert_eq!(outcome.status, 200);
    assert!(outcome.fault.is_none());
    assert!(outcome.body.contains("odp"));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_retries_surface_the_last_status() {
    let (url, hits) = scripted_server(vec![(503, ""); 8]);
    let mut config = test_config(&url);
    config.max_retries = 2;
    let invoker = SoapInvoker::new(&config, None).expect("build invoker");
    let id = request_id();
    let cancel = CancellationToken::new();
    let error = invoker
        .invoke(
            &InvokeRequest {
                endpoint_url: &url,
                soap_action: "http://msw.gov.pl/srp/v3_0/uslugi/pesel/test/",
                envelope: "<e/>",
                request_id: &id,
            },
            &cancel,
        )
        .await
        .expect_err("all attempts fail");
    match error {
        TransportError::HttpStatus { status, .. } => assert_eq!(status, 503),
        other => panic!("unexpected error: {other}"),
    }
    // Initial attempt plus two retries.
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_fault_with_http_500_rides_on_the_status_error() {
    let (url, _hits) = scripted_server(vec![(500, FAULT_BODY)]);
    let mut config = test_config(&url);
    config.max_retries = 0;
    let invoker = SoapInvoker::new(&config, None).expect("build invoker");
    let id = request_id();
    let cancel = CancellationToken::new();
    let error = invoker
        .invoke(
            &InvokeRequest {
                endpoint_url: &url,
                soap_action: "http://msw.gov.pl/srp/v3_0/uslugi/pesel/test/",
                envelope: "<e/>",
                request_id: &id,
            },
            &cancel,
        )
        .await
        .expect_err("500 is terminal with no retries");
    match error {
        TransportError::HttpStatus { status, fault } => {
            assert_eq!(status, 500);
            let fault = fault.expect("fault parsed from error body");
            assert_eq!(fault.detail_opis.as_deref(), Some("Nie znaleziono osoby"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn a_fault_on_http_200_is_reported_in_the_outcome() {
    let (url, _hits) = scripted_server(vec![(200, FAULT_BODY)]);
    let config = test_config(&url);
    let invoker = SoapInvoker::new(&config, None).expect("build invoker");
    let id = request_id();
    let cancel = CancellationToken::new();
    let outcome = invoker
        .invoke(
            &InvokeRequest {
                endpoint_url: &url,
                soap_action: "http://msw.gov.pl/srp/v3_0/uslugi/pesel/test/",
                envelope: "<e/>",
                request_id: &id,
            },
            &cancel,
        )
        .await
        .expect("http 200 is a transport success");
    assert_eq!(outcome.status, 200);
    let fault = outcome.fault.expect("fault parsed despite http 200");
    assert_eq!(fault.fault_string, "Brak osoby");
}

#[tokio::test(flavor = "multi_thread")]
async fn a_400_is_terminal_without_retry() {
    let (url, hits) = scripted_server(vec![(400, FAULT_BODY), (200, OK_BODY)]);
    let config = test_config(&url);
    let invoker = SoapInvoker::new(&config, None).expect("build invoker");
    let id = request_id();
    let cancel = CancellationToken::new();
    let error = invoker
        .invoke(
            &InvokeRequest {
                endpoint_url: &url,
                soap_action: "http://msw.gov.pl/srp/v3_0/uslugi/pesel/test/",
                envelope: "<e/>",
                request_id: &id,
            },
            &cancel,
        )
        .await
        .expect_err("400 is not retriable");
    match error {
        TransportError::HttpStatus { status, .. } => assert_eq!(status, 400),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn pre_cancelled_token_short_circuits() {
    let (url, hits) = scripted_server(vec![(200, OK_BODY)]);
    let config = test_config(&url);
    let invoker = SoapInvoker::new(&config, None).expect("build invoker");
    let id = request_id();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let error = invoker
        .invoke(
            &InvokeRequest {
                endpoint_url: &url,
                soap_action: "http://msw.gov.pl/srp/v3_0/uslugi/pesel/test/",
                envelope: "<e/>",
                request_id: &id,
            },
            &cancel,
        )
        .await
        .expect_err("cancelled before dispatch");
    assert!(matches!(error, TransportError::Cancelled));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn an_abandoned_probe_does_not_wedge_the_circuit() {
    let server = Server::http("127.0.0.1:0").expect("bind test server");
    let addr = server.server_addr().to_ip().expect("tcp listener address");
    let url = format!("http://{addr}/soap");
    thread::spawn(move || {
        for hit in 0_u32.. {
            let Ok(request) = server.recv() else { return };
            if hit < 2 {
                let _ = request.respond(Response::from_string("").with_status_code(503));
            } else if hit == 2 {
                // Outlive the caller's patience so the probe is abandoned.
                thread::sleep(Duration::from_millis(600));
                let _ = request.respond(Response::from_string(OK_BODY).with_status_code(200));
            } else {
                let _ = request.respond(Response::from_string(OK_BODY).with_status_code(200));
            }
        }
    });

    let mut config = test_config(&url);
    config.max_retries = 0;
    config.breaker_min_throughput = 2;
    config.breaker_failure_ratio = 0.5;
    config.breaker_break_ms = 200;
    let invoker = SoapInvoker::new(&config, None).expect("build invoker");
    let id = request_id();
    let request = InvokeRequest {
        endpoint_url: &url,
        soap_action: "http://msw.gov.pl/srp/v3_0/uslugi/pesel/test/",
        envelope: "<e/>",
        request_id: &id,
    };

    // Two straight 503s open the circuit.
    for _ in 0..2 {
        let error = invoker
            .invoke(&request, &CancellationToken::new())
            .await
            .expect_err("upstream answers 503");
        assert!(matches!(error, TransportError::HttpStatus { status: 503, .. }));
    }
    tokio::time::sleep(Duration::from_millis(250)).await;

    // The half-open probe is cancelled mid-flight and never reports back.
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });
    let error = invoker
        .invoke(&request, &cancel)
        .await
        .expect_err("probe cancelled mid-flight");
    assert!(matches!(error, TransportError::Cancelled));

    // The abandoned probe still occupies the half-open slot.
    let error = invoker
        .invoke(&request, &CancellationToken::new())
        .await
        .expect_err("probe slot still held");
    assert!(matches!(error, TransportError::CircuitOpen));

    // One break duration later a fresh probe is admitted and succeeds.
    tokio::time::sleep(Duration::from_millis(250)).await;
    let outcome = invoker
        .invoke(&request, &CancellationToken::new())
        .await
        .expect("fresh probe reaches the recovered upstream");
    assert_eq!(outcome.status, 200);
}
