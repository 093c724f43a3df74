// crates/gateway-services/src/config.rs
// ============================================================================
// Module: Service Configuration
// Description: Per-registry configuration with per-operation endpoint URLs.
// Purpose: Validate upstream addressing at startup, fail closed.
// Dependencies: gateway-transport, serde, url
// ============================================================================

//! ## Overview
//! Each upstream registry exposes its operations on separate SOAP endpoints
//! behind one shared identity and resilience policy, so every registry gets
//! one [`gateway_transport::EndpointConfig`] plus per-operation URLs.
//! Validation runs once at startup; configuration errors are fatal and
//! never retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gateway_transport::ConfigError;
use gateway_transport::EndpointConfig;
use serde::Deserialize;
use url::Url;

// ============================================================================
// SECTION: Person Registry
// ============================================================================

/// Configuration for the person registry (SRP).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SrpConfig {
    /// Shared identity, resilience, and pooling settings.
    pub endpoint: EndpointConfig,
    /// Endpoint for the search operation.
    pub search_service_url: String,
    /// Endpoint for the share operations (by id, by PESEL).
    pub share_service_url: String,
}

impl SrpConfig {
    /// Validates the endpoint settings and both operation URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the endpoint settings or either URL is
    /// unusable.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.endpoint.validate()?;
        check_url(&self.search_service_url, &self.endpoint.service_name)?;
        check_url(&self.share_service_url, &self.endpoint.service_name)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Document Registry
// ============================================================================

/// Configuration for the id-document registry (RDO).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RdoConfig {
    /// Shared identity, resilience, and pooling settings.
    pub endpoint: EndpointConfig,
    /// Endpoint for the photo share operation.
    pub photo_service_url: String,
    /// Endpoint for the id-card share operation.
    pub id_card_service_url: String,
}

impl RdoConfig {
    /// Validates the endpoint settings and both operation URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the endpoint settings or either URL is
    /// unusable.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.endpoint.validate()?;
        check_url(&self.photo_service_url, &self.endpoint.service_name)?;
        check_url(&self.id_card_service_url, &self.endpoint.service_name)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Dictionary Service
// ============================================================================

/// Configuration for the dictionary service (CEP).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CepConfig {
    /// Shared identity, resilience, and pooling settings.
    pub endpoint: EndpointConfig,
    /// Endpoint for the dictionary listing operation.
    pub dictionary_service_url: String,
}

impl CepConfig {
    /// Validates the endpoint settings and the operation URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the endpoint settings or the URL is
    /// unusable.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.endpoint.validate()?;
        check_url(&self.dictionary_service_url, &self.endpoint.service_name)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Checks one operation URL for syntax and scheme.
fn check_url(raw: &str, service: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidUrl {
        service: service.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::UnsupportedScheme {
            service: service.to_string(),
        }),
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

    use gateway_transport::ConfigError;
    use gateway_transport::EndpointConfig;

    use super::SrpConfig;

    fn endpoint() -> EndpointConfig {
        EndpointConfig {
            service_name: "srp".to_string(),
            endpoint_url: "https://srp.example.gov.pl".to_string(),
            client_certificate_thumbprint: "abc123".to_string(),
            ..EndpointConfig::default()
        }
    }

    #[test]
    fn accepts_https_operation_urls() {
        let mut config = SrpConfig {
            endpoint: endpoint(),
            search_service_url: "https://srp.example.gov.pl/search".to_string(),
            share_service_url: "https://srp.example.gov.pl/share".to_string(),
        };
        config.validate().unwrap();
    }

    #[test]
    fn rejects_a_malformed_operation_url() {
        let mut config = SrpConfig {
            endpoint: endpoint(),
            search_service_url: "not a url".to_string(),
            share_service_url: "https://srp.example.gov.pl/share".to_string(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rejects_a_non_http_scheme() {
        let mut config = SrpConfig {
            endpoint: endpoint(),
            search_service_url: "ftp://srp.example.gov.pl/search".to_string(),
            share_service_url: "https://srp.example.gov.pl/share".to_string(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
    }
}
