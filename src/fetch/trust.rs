//! The pinned certificate authority used for HTTPS downloads.
//!
//! Provisioning the certificate is someone else's job; this module only
//! carries it around as an opaque PEM blob and hands it to the HTTP client.

use std::fmt;
use std::path::Path;

use crate::core::ParamsError;

const PEM_CERTIFICATE_HEADER: &str = "-----BEGIN CERTIFICATE-----";

/// A PEM encoded certificate authority that HTTPS servers must chain to.
#[derive(Clone)]
pub struct TrustAnchor {
    pem: Vec<u8>,
    origin: String,
}

impl TrustAnchor {
    /// Wrap PEM bytes. `origin` names where they came from, for messages.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::TrustAnchorError`] if the bytes hold no PEM
    /// certificate.
    pub fn from_pem(pem: impl Into<Vec<u8>>, origin: impl Into<String>) -> Result<Self, ParamsError> {
        let pem = pem.into();
        let origin = origin.into();

        if !String::from_utf8_lossy(&pem).contains(PEM_CERTIFICATE_HEADER) {
            return Err(ParamsError::TrustAnchorError {
                path: origin,
                reason: "no PEM certificate found".to_string(),
            });
        }

        Ok(Self { pem, origin })
    }

    /// Read a PEM file.
    pub async fn from_file(path: &Path) -> Result<Self, ParamsError> {
        let pem = tokio::fs::read(path).await.map_err(|e| ParamsError::TrustAnchorError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_pem(pem, path.display().to_string())
    }

    /// Convert to a certificate the HTTP client accepts.
    pub fn to_certificate(&self) -> Result<reqwest::Certificate, ParamsError> {
        reqwest::Certificate::from_pem(&self.pem).map_err(|e| ParamsError::TrustAnchorError {
            path: self.origin.clone(),
            reason: e.to_string(),
        })
    }

    /// Where the certificate came from.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl fmt::Debug for TrustAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustAnchor")
            .field("origin", &self.origin)
            .field("len", &self.pem.len())
            .finish()
    }
}
