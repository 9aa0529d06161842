//! Top-level error type of the binary.
//!
//! Every variant is fatal: `main` prints it and exits with status 1. Errors
//! that only degrade output (no hostname, no interface list) never get here.

use crate::config::ConfigError;
use crate::http::ServerError;
use crate::net::NetError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
