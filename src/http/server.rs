//! HTTP/HTTPS server startup logic.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;

use crate::config::{ConfigError, ServeConfig, SHUTDOWN_GRACE_SECS};
use crate::net::{NetError, Platform, SystemInterfaces};
use crate::tls::{default_sans, SelfSignedCertificate, TlsError};

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Start the HTTP or HTTPS server based on configuration.
///
/// This function blocks until the server shuts down.
pub async fn start_server(app: Router, config: &ServeConfig) -> Result<(), ServerError> {
    let addr = config.http.socket_addr()?;
    let handle = Handle::new();

    if config.http.https {
        let sans = default_sans(&SystemInterfaces, Platform::current())?;
        start_self_signed_server(app, addr, sans, handle).await
    } else {
        start_plain_server(app, addr, handle).await
    }
}

/// Start a plain HTTP server (no TLS).
async fn start_plain_server(
    app: Router,
    addr: SocketAddr,
    handle: Handle,
) -> Result<(), ServerError> {
    tracing::info!(%addr, "Starting HTTP server");

    stop_on_signal(handle.clone());

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;
    Ok(())
}

/// Start an HTTPS server with a freshly generated self-signed certificate.
async fn start_self_signed_server(
    app: Router,
    addr: SocketAddr,
    sans: Vec<String>,
    handle: Handle,
) -> Result<(), ServerError> {
    // Only aws-lc-rs is enabled; installing fails harmlessly if already set
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    tracing::info!(%addr, sans = ?sans, "Starting HTTPS server (self-signed certificate)");

    let certificate = SelfSignedCertificate::generate(sans)?;
    let rustls_config = certificate.rustls_config().await?;

    stop_on_signal(handle.clone());

    axum_server::bind_rustls(addr, rustls_config)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;
    Ok(())
}

/// Resolves when Ctrl+C or (on Unix) SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Stop the server behind `handle` once a shutdown signal arrives. Transfers
/// still running after the grace period are cut off.
fn stop_on_signal(handle: Handle) {
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!(grace_secs = SHUTDOWN_GRACE_SECS, "Shutting down");
        handle.graceful_shutdown(Some(Duration::from_secs(SHUTDOWN_GRACE_SECS)));
    });
}
