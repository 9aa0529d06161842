//! HTTP server module with optional self-signed TLS.
//!
//! The server runs in one of two modes:
//! - **Plain**: HTTP only
//! - **Self-signed**: HTTPS with a certificate generated at startup for the
//!   host's names and LAN address
//!
//! Both shut down on SIGTERM/SIGINT.

mod server;
pub mod static_files;

pub use server::{start_server, ServerError};
