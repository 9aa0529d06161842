//! HTTP basic authentication.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};

use crate::config::{Credentials, AUTH_REALM};

/// Middleware that rejects requests without the configured credentials.
///
/// Missing, malformed or wrong credentials are answered with 401 and a
/// `WWW-Authenticate` challenge so browsers prompt for a login.
pub async fn basic_auth_layer(
    State(credentials): State<Arc<Credentials>>,
    request: Request,
    next: Next,
) -> Response {
    let supplied = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(decode_basic);

    match supplied {
        Some((username, password)) if credentials_match(&credentials, &username, &password) => {
            next.run(request).await
        }
        Some((username, _)) => {
            tracing::warn!(%username, "Rejected basic auth credentials");
            challenge()
        }
        None => challenge(),
    }
}

/// Decode the `user:pass` pair of a `Basic` authorization header value.
fn decode_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Compare digests so the comparison time does not depend on where the
/// supplied values first differ.
fn credentials_match(expected: &Credentials, username: &str, password: &str) -> bool {
    let user_ok = Sha256::digest(expected.username.as_bytes()) == Sha256::digest(username.as_bytes());
    let pass_ok = Sha256::digest(expected.password.as_bytes()) == Sha256::digest(password.as_bytes());
    user_ok & pass_ok
}

fn challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(WWW_AUTHENTICATE, format!("Basic realm=\"{}\"", AUTH_REALM))],
        "Unauthorized",
    )
        .into_response()
}
