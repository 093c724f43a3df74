// crates/gateway-services/src/dictionary.rs
// ============================================================================
// Module: Dictionary Service
// Description: Dictionary listing against the CEP reference-data service.
// Purpose: Expose the vehicle-registry dictionary headers uniformly.
// Dependencies: gateway-core, gateway-soap, gateway-transport
// ============================================================================

//! The CEP dictionary service lists reference-data dictionaries with
//! optional id and name filters. The response carries headers only; the
//! gateway does not page through dictionary entries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use gateway_core::DictionaryListResponse;
use gateway_core::GatewayResponse;
use gateway_core::ListDictionariesRequest;
use gateway_core::RequestIdGenerator;
use gateway_soap::envelope::list_dictionaries_envelope;
use gateway_soap::mappers::map_dictionary_list;
use gateway_transport::ClientIdentity;
use gateway_transport::InvokeRequest;
use gateway_transport::SoapInvoker;
use gateway_transport::TransportError;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::actions;
use crate::config::CepConfig;
use crate::error::Cancelled;
use crate::error::envelope_from_mapping;
use crate::error::envelope_from_transport;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Dictionary-service operations.
#[async_trait]
pub trait DictionaryOperations: Send + Sync {
    /// Lists dictionary headers, optionally filtered by id or name.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the caller cancels; every other failure
    /// becomes a response envelope.
    async fn list_dictionaries(
        &self,
        request: ListDictionariesRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<DictionaryListResponse>, Cancelled>;
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Live dictionary service over the SOAP transport.
pub struct DictionaryService {
    /// Validated service configuration.
    config: CepConfig,
    /// Pooled resilient invoker for the service endpoint.
    invoker: SoapInvoker,
    /// Correlation id source.
    ids: Arc<RequestIdGenerator>,
}

impl DictionaryService {
    /// Builds the service and its invoker.
    ///
    /// The configuration must already be validated.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the HTTP client cannot be built.
    pub fn new(
        config: CepConfig,
        identity: Option<&ClientIdentity>,
        ids: Arc<RequestIdGenerator>,
    ) -> Result<Self, TransportError> {
        let invoker = SoapInvoker::new(&config.endpoint, identity)?;
        Ok(Self {
            config,
            invoker,
            ids,
        })
    }
}

#[async_trait]
impl DictionaryOperations for DictionaryService {
    async fn list_dictionaries(
        &self,
        request: ListDictionariesRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<DictionaryListResponse>, Cancelled> {
        let request_id = self.ids.resolve(caller_request_id);

        let envelope = list_dictionaries_envelope(&request);
        let outcome = match self
            .invoker
            .invoke(
                &InvokeRequest {
                    endpoint_url: &self.config.dictionary_service_url,
                    soap_action: actions::CEP_POBIERZ_LISTE_SLOWNIKOW,
                    envelope: &envelope,
                    request_id: &request_id,
                },
                cancel,
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(error) => return envelope_from_transport(request_id, actions::SOURCE_CEP, error),
        };

        if let Some(fault) = outcome.fault.as_ref() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_CEP,
                400,
                fault.message(),
            ));
        }

        match map_dictionary_list(&outcome.body) {
            Ok(response) => {
                info!(
                    request_id = %request_id.as_str(),
                    dictionaries = response.slowniki.len(),
                    "dictionary list done"
                );
                Ok(GatewayResponse::success(
                    request_id,
                    actions::SOURCE_CEP,
                    response,
                ))
            }
            Err(error) => Ok(envelope_from_mapping(
                request_id,
                actions::SOURCE_CEP,
                &error,
            )),
        }
    }
}
