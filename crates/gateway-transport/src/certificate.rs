// crates/gateway-transport/src/certificate.rs
// ============================================================================
// Module: Certificate Store
// Description: Thumbprint-keyed client identity lookup over PEM bundles.
// Purpose: Provide the mTLS identity for one upstream service, fail closed.
// Dependencies: rustls-pki-types, sha2, time
// ============================================================================

//! ## Overview
//! Client identities live in a directory of PEM bundles, each holding one
//! certificate chain and its private key. Lookup is by certificate
//! thumbprint: the hex SHA-256 digest of the leaf certificate DER, compared
//! whitespace-stripped and case-insensitively. Every failure path names the
//! service so an operator can tell which upstream lost its identity.
//! Invariants:
//! - A bundle without a private key never becomes an identity.
//! - An identity outside its validity window never becomes an identity.
//! - Lookup results are not cached; a rotated bundle takes effect on the
//!   next call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use rustls_pki_types::CertificateDer;
use rustls_pki_types::PrivateKeyDer;
use rustls_pki_types::pem::PemObject;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;
use time::Date;
use time::Month;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::Time;
use tracing::info;

use crate::config::EndpointConfig;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while resolving a client identity.
///
/// # Invariants
/// - Every variant names the service whose lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateError {
    /// The configured thumbprint is empty.
    #[error("[{service}] client certificate thumbprint must not be empty")]
    EmptyThumbprint {
        /// Service whose lookup failed.
        service: String,
    },
    /// No bundle in the store matches the thumbprint.
    #[error("[{service}] no certificate found for thumbprint '{thumbprint}'")]
    NotFound {
        /// Service whose lookup failed.
        service: String,
        /// Thumbprint as configured.
        thumbprint: String,
    },
    /// The matching bundle has no private key.
    #[error("[{service}] certificate bundle '{bundle}' has no private key")]
    MissingPrivateKey {
        /// Service whose lookup failed.
        service: String,
        /// Bundle file name.
        bundle: String,
    },
    /// The matching certificate is expired.
    #[error("[{service}] certificate expired at {not_after}")]
    Expired {
        /// Service whose lookup failed.
        service: String,
        /// Expiry instant, RFC 3339.
        not_after: String,
    },
    /// The matching certificate is not yet valid.
    #[error("[{service}] certificate not valid before {not_before}")]
    NotYetValid {
        /// Service whose lookup failed.
        service: String,
        /// Validity start, RFC 3339.
        not_before: String,
    },
    /// The store directory could not be read.
    #[error("[{service}] certificate store unreadable: {reason}")]
    StoreUnreadable {
        /// Service whose lookup failed.
        service: String,
        /// Underlying I/O failure.
        reason: String,
    },
    /// A certificate could not be parsed.
    #[error("[{service}] certificate parse failure: {reason}")]
    Parse {
        /// Service whose lookup failed.
        service: String,
        /// What failed to parse.
        reason: String,
    },
}

// ============================================================================
// SECTION: Client Identity
// ============================================================================

/// A resolved client identity ready for TLS configuration.
///
/// # Invariants
/// - `pem` holds the full bundle (chain and key) as read from disk.
/// - The validity window contained `now` at resolution time.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    /// Raw PEM bundle bytes.
    pem: Vec<u8>,
    /// Hex SHA-256 thumbprint of the leaf certificate DER.
    thumbprint: String,
    /// Validity start.
    not_before: OffsetDateTime,
    /// Validity end.
    not_after: OffsetDateTime,
}

impl ClientIdentity {
    /// Returns the raw PEM bundle for TLS client configuration.
    #[must_use]
    pub fn pem_bytes(&self) -> &[u8] {
        &self.pem
    }

    /// Returns the normalized leaf thumbprint.
    #[must_use]
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    /// Returns the validity window.
    #[must_use]
    pub const fn validity(&self) -> (OffsetDateTime, OffsetDateTime) {
        (self.not_before, self.not_after)
    }
}

// ============================================================================
// SECTION: Certificate Store
// ============================================================================

/// Directory-backed store of PEM identity bundles.
#[derive(Debug, Clone)]
pub struct CertificateStore {
    /// Directory scanned for `.pem` bundles.
    dir: PathBuf,
}

impl CertificateStore {
    /// Creates a store over the given directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolves the client identity configured for a service.
    ///
    /// # Errors
    ///
    /// Returns [`CertificateError`] when the thumbprint is empty, no bundle
    /// matches, the bundle lacks a key, or `now` falls outside the
    /// certificate validity window.
    pub fn client_certificate(
        &self,
        config: &EndpointConfig,
    ) -> Result<ClientIdentity, CertificateError> {
        let service = config.service_name.clone();
        let wanted = normalize_thumbprint(&config.client_certificate_thumbprint);
        if wanted.is_empty() {
            return Err(CertificateError::EmptyThumbprint { service });
        }

        let entries = fs::read_dir(&self.dir).map_err(|e| CertificateError::StoreUnreadable {
            service: service.clone(),
            reason: e.to_string(),
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("pem") {
                continue;
            }
            if let Some(identity) = self.try_bundle(&path, &wanted, &service)? {
                info!(
                    service = %service,
                    thumbprint = %identity.thumbprint,
                    "client certificate loaded"
                );
                return Ok(identity);
            }
        }

        Err(CertificateError::NotFound {
            service,
            thumbprint: config.client_certificate_thumbprint.clone(),
        })
    }

    /// Examines one bundle file; `Ok(None)` means "not the one we want".
    fn try_bundle(
        &self,
        path: &Path,
        wanted: &str,
        service: &str,
    ) -> Result<Option<ClientIdentity>, CertificateError> {
        let bundle_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Ok(pem) = fs::read(path) else {
            // An unreadable sibling bundle must not block the lookup.
            return Ok(None);
        };

        let Some(Ok(leaf)) = CertificateDer::pem_slice_iter(&pem).next() else {
            return Ok(None);
        };
        let thumbprint = sha256_hex(leaf.as_ref());
        if thumbprint != wanted {
            return Ok(None);
        }

        if PrivateKeyDer::from_pem_slice(&pem).is_err() {
            return Err(CertificateError::MissingPrivateKey {
                service: service.to_string(),
                bundle: bundle_name,
            });
        }

        let (not_before, not_after) =
            parse_validity(leaf.as_ref()).ok_or_else(|| CertificateError::Parse {
                service: service.to_string(),
                reason: format!("validity window unreadable in '{bundle_name}'"),
            })?;
        let now = OffsetDateTime::now_utc();
        if now < not_before {
            return Err(CertificateError::NotYetValid {
                service: service.to_string(),
                not_before: not_before.to_string(),
            });
        }
        if now > not_after {
            return Err(CertificateError::Expired {
                service: service.to_string(),
                not_after: not_after.to_string(),
            });
        }

        Ok(Some(ClientIdentity {
            pem,
            thumbprint,
            not_before,
            not_after,
        }))
    }
}

// ============================================================================
// SECTION: Thumbprint Helpers
// ============================================================================

/// Strips separators and lowercases a thumbprint for comparison.
#[must_use]
pub fn normalize_thumbprint(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Hex SHA-256 digest of DER bytes.
fn sha256_hex(der: &[u8]) -> String {
    let digest = Sha256::digest(der);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

// ============================================================================
// SECTION: DER Validity Parsing
// ============================================================================

/// Reads the `Validity` window out of an X.509 certificate DER.
///
/// Walks `Certificate -> tbsCertificate -> validity` and decodes the two
/// `UTCTime`/`GeneralizedTime` values. Returns `None` on any structural
/// surprise; the caller treats that as a parse failure.
pub(crate) fn parse_validity(der: &[u8]) -> Option<(OffsetDateTime, OffsetDateTime)> {
    let (tag, certificate, _) = read_tlv(der)?;
    if tag != 0x30 {
        return None;
    }
    let (tag, mut tbs, _) = read_tlv(certificate)?;
    if tag != 0x30 {
        return None;
    }

    // Optional explicit version, then serial, signature, issuer.
    if tbs.first() == Some(&0xA0) {
        tbs = read_tlv(tbs)?.2;
    }
    tbs = read_tlv(tbs)?.2; // serialNumber
    tbs = read_tlv(tbs)?.2; // signature algorithm
    tbs = read_tlv(tbs)?.2; // issuer

    let (tag, validity, _) = read_tlv(tbs)?;
    if tag != 0x30 {
        return None;
    }
    let (nb_tag, nb_bytes, rest) = read_tlv(validity)?;
    let (na_tag, na_bytes, _) = read_tlv(rest)?;
    let not_before = parse_der_time(nb_tag, nb_bytes)?;
    let not_after = parse_der_time(na_tag, na_bytes)?;
    Some((not_before, not_after))
}

/// Reads one TLV, returning its tag, content, and the bytes after it.
fn read_tlv(data: &[u8]) -> Option<(u8, &[u8], &[u8])> {
    let (&tag, rest) = data.split_first()?;
    let (&first_len, rest) = rest.split_first()?;
    let (len, header) = if first_len < 0x80 {
        (usize::from(first_len), 0_usize)
    } else {
        let count = usize::from(first_len & 0x7F);
        if count == 0 || count > 4 || rest.len() < count {
            return None;
        }
        let mut len = 0_usize;
        for &b in &rest[..count] {
            len = (len << 8) | usize::from(b);
        }
        (len, count)
    };
    let end = header.checked_add(len)?;
    let content = rest.get(header..end)?;
    let remainder = rest.get(end..)?;
    Some((tag, content, remainder))
}

/// Decodes a DER `UTCTime` (tag 0x17) or `GeneralizedTime` (tag 0x18).
fn parse_der_time(tag: u8, bytes: &[u8]) -> Option<OffsetDateTime> {
    let text = core::str::from_utf8(bytes).ok()?;
    let text = text.strip_suffix('Z')?;
    let (year, rest) = match tag {
        0x17 => {
            let yy: i32 = text.get(..2)?.parse().ok()?;
            let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
            (year, text.get(2..)?)
        }
        0x18 => (text.get(..4)?.parse().ok()?, text.get(4..)?),
        _ => return None,
    };
    let month: u8 = rest.get(..2)?.parse().ok()?;
    let day: u8 = rest.get(2..4)?.parse().ok()?;
    let hour: u8 = rest.get(4..6)?.parse().ok()?;
    let minute: u8 = rest.get(6..8)?.parse().ok()?;
    let second: u8 = rest.get(8..10).map_or(Some(0), |s| s.parse().ok())?;

    let date = Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()?;
    let time = Time::from_hms(hour, minute, second).ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
