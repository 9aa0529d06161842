//! lanserve - share a directory over HTTP(S) in the local network.
//!
//! Besides serving files, the crate works out which address other machines
//! should use to reach this host, and can generate a throwaway self-signed
//! certificate covering the host's names and LAN address.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod net;
pub mod router;
pub mod tls;

pub use config::ServeConfig;
pub use error::AppError;
pub use router::{apply_middleware, create_router};
