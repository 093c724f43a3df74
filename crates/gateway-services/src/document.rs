// crates/gateway-services/src/document.rs
// ============================================================================
// Module: Document Registry Service
// Description: Photo and id-card share operations against the RDO registry.
// Purpose: Serve the photo fan-out and the bulk id-card lookup.
// Dependencies: gateway-core, gateway-soap, gateway-transport
// ============================================================================

//! ## Overview
//! The document registry shares the current photo for one person and the
//! current id-card data for a list of PESELs. Photo lookups are keyed by
//! the (person id, PESEL) pair; both identifiers are mandatory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use gateway_core::GatewayResponse;
use gateway_core::GetCurrentPhotoRequest;
use gateway_core::GetIdCardRequest;
use gateway_core::IdCardResponse;
use gateway_core::PhotoResponse;
use gateway_core::RequestIdGenerator;
use gateway_soap::envelope::get_current_photo_envelope;
use gateway_soap::envelope::get_id_card_envelope;
use gateway_soap::mappers::map_current_photo;
use gateway_soap::mappers::map_id_cards;
use gateway_transport::ClientIdentity;
use gateway_transport::InvokeRequest;
use gateway_transport::SoapInvoker;
use gateway_transport::TransportError;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::actions;
use crate::config::RdoConfig;
use crate::error::Cancelled;
use crate::error::envelope_from_mapping;
use crate::error::envelope_from_transport;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Document-registry operations.
#[async_trait]
pub trait DocumentOperations: Send + Sync {
    /// Shares the current photo for one person.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the caller cancels; every other failure
    /// becomes a response envelope.
    async fn get_current_photo(
        &self,
        request: GetCurrentPhotoRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<PhotoResponse>, Cancelled>;

    /// Shares the current id-card data for a list of PESELs.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the caller cancels; every other failure
    /// becomes a response envelope.
    async fn get_id_card(
        &self,
        request: GetIdCardRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<IdCardResponse>, Cancelled>;
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Live document-registry service over the SOAP transport.
pub struct DocumentService {
    /// Validated registry configuration.
    config: RdoConfig,
    /// Pooled resilient invoker for the registry endpoints.
    invoker: SoapInvoker,
    /// Correlation id source.
    ids: Arc<RequestIdGenerator>,
}

impl DocumentService {
    /// Builds the service and its invoker.
    ///
    /// The configuration must already be validated.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the HTTP client cannot be built.
    pub fn new(
        config: RdoConfig,
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
impl DocumentOperations for DocumentService {
    async fn get_current_photo(
        &self,
        request: GetCurrentPhotoRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<PhotoResponse>, Cancelled> {
        let request_id = self.ids.resolve(caller_request_id);
        if let Err(validation) = request.validate() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_RDO,
                400,
                validation.to_string(),
            ));
        }

        let envelope = get_current_photo_envelope(&request, &request_id);
        let outcome = match self
            .invoker
            .invoke(
                &InvokeRequest {
                    endpoint_url: &self.config.photo_service_url,
                    soap_action: actions::RDO_UDOSTEPNIJ_AKTUALNE_ZDJECIE,
                    envelope: &envelope,
                    request_id: &request_id,
                },
                cancel,
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(error) => return envelope_from_transport(request_id, actions::SOURCE_RDO, error),
        };

        if let Some(fault) = outcome.fault.as_ref() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_RDO,
                400,
                fault.message(),
            ));
        }

        match map_current_photo(&outcome.body) {
            Ok(response) => {
                info!(
                    request_id = %request_id.as_str(),
                    photos = response.photos_base64.len(),
                    "current photo done"
                );
                Ok(GatewayResponse::success(
                    request_id,
                    actions::SOURCE_RDO,
                    response,
                ))
            }
            Err(error) => Ok(envelope_from_mapping(
                request_id,
                actions::SOURCE_RDO,
                &error,
            )),
        }
    }

    async fn get_id_card(
        &self,
        request: GetIdCardRequest,
        caller_request_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GatewayResponse<IdCardResponse>, Cancelled> {
        let request_id = self.ids.resolve(caller_request_id);
        if let Err(validation) = request.validate() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_RDO,
                400,
                validation.to_string(),
            ));
        }

        let envelope = get_id_card_envelope(&request);
        let outcome = match self
            .invoker
            .invoke(
                &InvokeRequest {
                    endpoint_url: &self.config.id_card_service_url,
                    soap_action: actions::RDO_UDOSTEPNIJ_DANE_DOWODOW_PO_PESEL,
                    envelope: &envelope,
                    request_id: &request_id,
                },
                cancel,
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(error) => return envelope_from_transport(request_id, actions::SOURCE_RDO, error),
        };

        if let Some(fault) = outcome.fault.as_ref() {
            return Ok(GatewayResponse::business_error(
                request_id,
                actions::SOURCE_RDO,
                400,
                fault.message(),
            ));
        }

        match map_id_cards(&outcome.body) {
            Ok(response) => {
                info!(
                    request_id = %request_id.as_str(),
                    cards = response.dowody.len(),
                    "id card share done"
                );
                Ok(GatewayResponse::success(
                    request_id,
                    actions::SOURCE_RDO,
                    response,
                ))
            }
            Err(error) => Ok(envelope_from_mapping(
                request_id,
                actions::SOURCE_RDO,
                &error,
            )),
        }
    }
}
