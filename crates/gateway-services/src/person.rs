// crates/gateway-services/src/person.rs
// ============================================================================
// Module: Person Registry Service
// Description: Search and share operations against the person registry.
// Purpose: Compose validation, invocation, mapping, and photo fan-out.
// Dependencies: gateway-core, gateway-soap, gateway-transport
// ============================================================================

//! ## Overview
//! [`PersonService`] drives the three person-registry operations. Search
//! additionally fans out to the document registry for one current photo per
//! living matched person, bounded by the configured parallelism, and merges
//! only successful sub-results back by the (person id, PESEL) key.
//! Invariants:
//! - The living-only filter runs before photo fan-out, so no photo is
//!   fetched for a person the caller will never see.
//! - Photo sub-requests are deduplicated by (person id, PESEL).
//! - A failed photo sub-call leaves its person photo-less; it never fails
//!   the search.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use gateway_core::FoundPerson;
use gateway_core::GatewayResponse;
use gateway_core::GetCurrentPhotoRequest;
use gateway_core::GetPersonByPeselRequest;
use gateway_core::GetPersonRequest;
use gateway_core::PersonDetailResponse;
use gateway_core::RequestId;
use gateway_core::RequestIdGenerator;
use gateway_core::SearchPersonRequest;
use gateway_core::SearchPersonResponse;
use gateway_soap::MappingError;
use gateway_soap::envelope::get_person_by_id_envelope;
use gateway_soap::envelope::get_person_by_pesel_envelope;
use gateway_soap::envelope::search_person_envelope;
use gateway_soap::mappers::map_person_by_id;
use gateway_soap::mappers::map_person_by_pesel;
use gateway_soap::mappers::map_search_person;
use gateway_transport::ClientIdentity;
use gateway_transport::InvokeRequest;
use gateway_transport::SoapInvoker;
use gateway_transport::TransportError;
use gateway_transport::bulk_invoke;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::actions;
use crate::config::SrpConfig;
use crate::document::DocumentOperations;
use crate::error::Cancelled;
use crate::error::envelope_from_mapping;
use crate::error::envelope_from_transport;

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Business-error message when the share operation finds nobody.
const NO_PERSON_FOR_PESEL: &str = "Brak osoby o podanym PESEL.";
/// Business-error message when the share-by-id operation finds nobody.
const NO_PERSON_FOR_ID: &str = "Brak osoby o podanym identyfikatorze.";

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Person-registry operations.
#[async_trait]
pub trait PersonOperations: Send + Sync {
    /// Searches for persons by criteria, merging current photos for living
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the caller cancels; every other failure
    /// becomes a response envelope.
    async fn search_person(
        &self,
        request: SearchPersonRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<SearchPersonResponse>, Cancelled>;

    /// Shares the current data of one person by internal person id.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the caller cancels; every other failure
    /// becomes a response envelope.
    async fn get_person_by_id(
        &self,
        request: GetPersonRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<PersonDetailResponse>, Cancelled>;

    /// Shares the current data of one person by PESEL.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the caller cancels; every other failure
    /// becomes a response envelope.
    async fn get_person_by_pesel(
        &self,
        request: GetPersonByPeselRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<PersonDetailResponse>, Cancelled>;
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Live person-registry service over the SOAP transport.
pub struct PersonService {
    /// Validated registry configuration.
    config: SrpConfig,
    /// Pooled resilient invoker for the registry endpoints.
    invoker: SoapInvoker,
    /// Document registry used for photo fan-out.
    documents: Arc<dyn DocumentOperations>,
    /// Correlation id source.
    ids: Arc<RequestIdGenerator>,
}

impl PersonService {
    /// Builds the service and its invoker.
    ///
    /// The configuration must already be validated.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the HTTP client cannot be built.
    pub fn new(
        config: SrpConfig,
        identity: Option<&ClientIdentity>,
        documents: Arc<dyn DocumentOperations>,
        ids: Arc<RequestIdGenerator>,
    ) -> Result<Self, TransportError> {
        let invoker = SoapInvoker::new(&config.endpoint, identity)?;
        Ok(Self {
            config,
            invoker,
            documents,
            ids,
        })
    }

    /// Fetches current photos for the given sub-requests and merges the
    /// successful ones into the matched persons.
    async fn merge_photos(
        &self,
        persons: &mut [FoundPerson],
        photo_requests: Vec<GetCurrentPhotoRequest>,
        request_id: &RequestId,
        cancel: &CancellationToken,
    ) {
        let documents = Arc::clone(&self.documents);
        let sub_cancel = cancel.clone();
        let fallback_id = request_id.clone();
        let results = bulk_invoke(
            photo_requests,
            self.config.endpoint.max_parallel,
            cancel,
            request_id,
            actions::SOURCE_RDO,
            move |photo_request: GetCurrentPhotoRequest| {
                let documents = Arc::clone(&documents);
                let cancel = sub_cancel.clone();
                let fallback_id = fallback_id.clone();
                async move {
                    match documents.get_current_photo(photo_request, None, &cancel).await {
                        Ok(envelope) => envelope,
                        Err(Cancelled) => GatewayResponse::technical_error(
                            fallback_id,
                            actions::SOURCE_RDO,
                            500,
                            Cancelled.to_string(),
                        ),
                    }
                }
            },
        )
        .await;

        let by_key: HashMap<(String, String), _> = results
            .into_iter()
            .map(|(req, envelope)| ((req.id_osoby, req.pesel), envelope))
            .collect();

        for person in persons.iter_mut() {
            let (Some(id_osoby), Some(pesel)) = (person.id_osoby.as_ref(), person.pesel.as_ref())
            else {
                continue;
            };
            let Some(envelope) = by_key.get(&(id_osoby.clone(), pesel.clone())) else {
                continue;
            };
            if envelope.is_success()
                && let Some(photos) = envelope.data.as_ref()
            {
                person.zdjecie = photos.first_photo().map(ToString::to_string);
            }
        }
    }
}

#[async_trait]
impl PersonOperations for PersonService {
    async fn search_person(
        &self,
        mut request: SearchPersonRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<SearchPersonResponse>, Cancelled> {
        let request_id = self.ids.resolve(caller_request_id);
        info!(request_id = %request_id.as_str(), "search person start");

        if let Err(validation) = request.validate_and_normalize(true) {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_SRP,
                400,
                validation.to_string(),
            ));
        }

        let envelope = search_person_envelope(&request, &request_id);
        let outcome = match self
            .invoker
            .invoke(
                &InvokeRequest {
                    endpoint_url: &self.config.search_service_url,
                    soap_action: actions::PESEL_WYSZUKAJ_OSOBY,
                    envelope: &envelope,
                    request_id: &request_id,
                },
                cancel,
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(error) => return envelope_from_transport(request_id, actions::SOURCE_SRP, error),
        };

        if let Some(fault) = outcome.fault.as_ref() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_SRP,
                400,
                fault.message(),
            ));
        }

        let mut response = match map_search_person(&outcome.body) {
            Ok(response) => response,
            Err(error) => {
                return Ok(envelope_from_mapping(
                    request_id,
                    actions::SOURCE_SRP,
                    &error,
                ));
            }
        };

        // Deceased matches are dropped before any photo is fetched.
        if request.czy_zyje == Some(true) {
            response.persons.retain(|p| p.czy_zyje != Some(false));
        }

        let mut seen: HashSet<(String, String)> = HashSet::new();
        let photo_requests: Vec<GetCurrentPhotoRequest> = response
            .persons
            .iter()
            .filter(|p| p.czy_zyje == Some(true))
            .filter_map(|p| match (p.id_osoby.as_ref(), p.pesel.as_ref()) {
                (Some(id_osoby), Some(pesel))
                    if !id_osoby.trim().is_empty() && !pesel.trim().is_empty() =>
                {
                    seen.insert((id_osoby.clone(), pesel.clone()))
                        .then(|| GetCurrentPhotoRequest {
                            id_osoby: id_osoby.clone(),
                            pesel: pesel.clone(),
                        })
                }
                _ => None,
            })
            .collect();

        if !photo_requests.is_empty() {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            self.merge_photos(&mut response.persons, photo_requests, &request_id, cancel)
                .await;
        }

        info!(
            request_id = %request_id.as_str(),
            matches = response.persons.len(),
            "search person done"
        );
        Ok(GatewayResponse::success(
            request_id,
            actions::SOURCE_SRP,
            response,
        ))
    }

    async fn get_person_by_id(
        &self,
        request: GetPersonRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<PersonDetailResponse>, Cancelled> {
        let request_id = self.ids.resolve(caller_request_id);
        if let Err(validation) = request.validate() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_SRP,
                400,
                validation.to_string(),
            ));
        }

        let envelope = get_person_by_id_envelope(&request, &request_id);
        self.share_person(
            envelope,
            actions::PESEL_UDOSTEPNIJ_PO_ID,
            map_person_by_id,
            NO_PERSON_FOR_ID,
            request_id,
            cancel,
        )
        .await
    }

    async fn get_person_by_pesel(
        &self,
        request: GetPersonByPeselRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<PersonDetailResponse>, Cancelled> {
        let request_id = self.ids.resolve(caller_request_id);
        if let Err(validation) = request.validate() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_SRP,
                400,
                validation.to_string(),
            ));
        }

        let envelope = get_person_by_pesel_envelope(&request, &request_id);
        self.share_person(
            envelope,
            actions::PESEL_UDOSTEPNIJ_PO_PESEL,
            map_person_by_pesel,
            NO_PERSON_FOR_PESEL,
            request_id,
            cancel,
        )
        .await
    }
}

impl PersonService {
    /// Shared tail of the two share operations: invoke, classify, map, and
    /// reject the empty payload as a business error.
    async fn share_person(
        &self,
        envelope: String,
        soap_action: &str,
        map: fn(&str) -> Result<PersonDetailResponse, MappingError>,
        missing_message: &str,
        request_id: RequestId,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<PersonDetailResponse>, Cancelled> {
        let outcome = match self
            .invoker
            .invoke(
                &InvokeRequest {
                    endpoint_url: &self.config.share_service_url,
                    soap_action,
                    envelope: &envelope,
                    request_id: &request_id,
                },
                cancel,
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(error) => return envelope_from_transport(request_id, actions::SOURCE_SRP, error),
        };

        if let Some(fault) = outcome.fault.as_ref() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_SRP,
                400,
                fault.message(),
            ));
        }

        let response = match map(&outcome.body) {
            Ok(response) => response,
            Err(error) => {
                return Ok(envelope_from_mapping(
                    request_id,
                    actions::SOURCE_SRP,
                    &error,
                ));
            }
        };

        if response.dane_osoby.is_none() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_SRP,
                404,
                missing_message,
            ));
        }

        Ok(GatewayResponse::success(
            request_id,
            actions::SOURCE_SRP,
            response,
        ))
    }
}
