//! Ephemeral TLS for HTTPS mode.
//!
//! The certificate is self-signed and generated fresh on every start. It lists
//! every name and address the host is likely reachable under, so browsers on
//! the LAN only complain about the unknown issuer.

mod cert;
mod san;

pub use cert::SelfSignedCertificate;
pub use san::{assemble_sans, default_sans};

/// TLS setup errors.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("Failed to generate self-signed certificate: {0}")]
    Generate(#[from] rcgen::Error),

    #[error("Failed to load TLS configuration: {0}")]
    Load(#[from] std::io::Error),
}
