//! Self-signed certificate generation.

use axum_server::tls_rustls::RustlsConfig;
use rcgen::{generate_simple_self_signed, CertifiedKey};

use super::TlsError;

/// PEM-encoded certificate and private key, valid for the given SANs.
#[derive(Clone)]
pub struct SelfSignedCertificate {
    pub cert_pem: String,
    pub key_pem: String,
}

impl SelfSignedCertificate {
    /// Generate a new key pair and a certificate covering `sans`.
    ///
    /// Entries that parse as IP addresses become IP SANs, the rest DNS names.
    pub fn generate(sans: Vec<String>) -> Result<Self, TlsError> {
        let CertifiedKey { cert, signing_key } = generate_simple_self_signed(sans)?;
        Ok(Self {
            cert_pem: cert.pem(),
            key_pem: signing_key.serialize_pem(),
        })
    }

    /// Load the certificate into a rustls server configuration.
    pub async fn rustls_config(&self) -> Result<RustlsConfig, TlsError> {
        let config = RustlsConfig::from_pem(
            self.cert_pem.clone().into_bytes(),
            self.key_pem.clone().into_bytes(),
        )
        .await?;
        Ok(config)
    }
}

impl std::fmt::Debug for SelfSignedCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelfSignedCertificate")
            .field("cert_pem", &self.cert_pem)
            .field("key_pem", &"<redacted>")
            .finish()
    }
}
