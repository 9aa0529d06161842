//! Router construction.
//!
//! Every path is handled by the static file service rooted at the configured
//! directory. The middleware stack is applied around it in a fixed order; see
//! [`crate::middleware`].

use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::{Credentials, ServeConfig};
use crate::http::static_files::create_static_service;
use crate::middleware::{access_log_layer, basic_auth_layer, handle_panic};

/// Creates the router serving `config.http.root`.
pub fn create_router(config: &ServeConfig) -> Router {
    let files = Router::new().fallback_service(create_static_service(&config.http.root));
    apply_middleware(files, config.auth.clone())
}

/// Wrap `router` in basic auth (if credentials are given), access logging and
/// panic recovery, innermost to outermost.
pub fn apply_middleware(router: Router, auth: Option<Credentials>) -> Router {
    let router = match auth {
        Some(credentials) => {
            tracing::info!(username = %credentials.username, "Basic auth enabled");
            router.layer(middleware::from_fn_with_state(
                Arc::new(credentials),
                basic_auth_layer,
            ))
        }
        None => router,
    };

    router
        // Access log - one line per request, after the body is sent
        .layer(middleware::from_fn(access_log_layer))
        // Recovery - outermost so it also covers the layers above
        .layer(CatchPanicLayer::custom(handle_panic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get};
    use tower::ServiceExt;

    fn request(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_files_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "shared notes").unwrap();

        let mut config = ServeConfig::default();
        config.http.root = dir.path().to_path_buf();

        let response = create_router(&config)
            .oneshot(request("/notes.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"shared notes");

        let response = create_router(&config)
            .oneshot(request("/absent.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_auth_applies_to_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();

        let mut config = ServeConfig::default();
        config.http.root = dir.path().to_path_buf();
        config.auth = Some(Credentials::parse("u:p").unwrap());

        let response = create_router(&config).oneshot(request("/a.txt")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_recovery_covers_auth_and_handler() {
        let app = apply_middleware(
            Router::new().route("/boom", get(|| async { panic!("boom") as () })),
            Some(Credentials::parse("u:p").unwrap()),
        );
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/boom")
                    .header("authorization", "Basic dTpw")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
