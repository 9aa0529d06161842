//! Panic recovery.
//!
//! Used with `tower_http::catch_panic::CatchPanicLayer::custom` so that a
//! panicking handler costs one request instead of the connection.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Log the panic payload and answer with a generic 500.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(message) = err.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        *message
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %details, "Request handler panicked");

    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
