//! Request middleware wrapped around the file service.
//!
//! Layers, outermost first:
//! 1. [`recovery`]: turns handler panics into `500 Internal Server Error`
//! 2. [`access_log`]: one log line per request with status and byte count
//! 3. [`basic_auth`]: optional, only when credentials are configured
//!
//! Recovery must stay outermost so that panics raised while logging are
//! caught as well.

pub mod access_log;
pub mod basic_auth;
pub mod recovery;

pub use access_log::{access_log_layer, AccessEntry, RequestId, ACCESS_LOG_TARGET};
pub use basic_auth::basic_auth_layer;
pub use recovery::handle_panic;
