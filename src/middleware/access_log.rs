//! Access log middleware.
//!
//! Generates a UUID v4 for each incoming request and runs the inner service in
//! a `request` span carrying it. The response body is wrapped in
//! [`MeteredBody`], which forwards every frame and size hint unchanged while
//! counting data bytes; the access line is written once the body has been
//! fully sent or dropped.

use std::fmt;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Request},
    http::{header::USER_AGENT, Method, Version},
    middleware::Next,
    response::Response,
};
use http_body::{Body as HttpBody, Frame, SizeHint};
use tracing::Instrument;
use uuid::Uuid;

/// Log target of the per-request access lines.
pub const ACCESS_LOG_TARGET: &str = "lanserve::access";

/// Extension type for accessing the request ID in handlers if needed.
#[derive(Clone, Debug)]
pub struct RequestId(pub Uuid);

/// One access log line.
///
/// Rendered as
/// `<remoteAddr> [<method>] "<requestURI>" <proto> <status> <byteCount> "<userAgent>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEntry {
    pub remote_addr: String,
    pub method: Method,
    pub uri: String,
    pub version: Version,
    pub status: u16,
    pub bytes: u64,
    pub user_agent: String,
}

impl AccessEntry {
    /// Capture the request side of the entry. Status starts at 200.
    pub fn from_request(request: &Request) -> Self {
        let remote_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_else(|| "-".to_string());
        let user_agent = request
            .headers()
            .get(USER_AGENT)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .unwrap_or_default();

        Self {
            remote_addr,
            method: request.method().clone(),
            uri: request.uri().to_string(),
            version: request.version(),
            status: 200,
            bytes: 0,
            user_agent,
        }
    }
}

impl fmt::Display for AccessEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {:?} {:?} {} {} {:?}",
            self.remote_addr,
            self.method,
            self.uri,
            self.version,
            self.status,
            self.bytes,
            self.user_agent
        )
    }
}

/// Emits the entry when dropped, i.e. when the response body is finished.
struct LogOnDrop(AccessEntry);

impl Drop for LogOnDrop {
    fn drop(&mut self) {
        tracing::info!(target: ACCESS_LOG_TARGET, "{}", self.0);
    }
}

/// Response body decorator that counts the data bytes passing through.
///
/// Owns the log guard, so the access line is emitted when the body is dropped:
/// after the last frame was sent, or when the client went away.
struct MeteredBody {
    inner: Body,
    guard: LogOnDrop,
}

impl HttpBody for MeteredBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        // Body is a boxed body, hence Unpin
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        if let Poll::Ready(Some(Ok(frame))) = &polled {
            if let Some(data) = frame.data_ref() {
                this.guard.0.bytes += data.len() as u64;
            }
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

/// Middleware that logs every request after its response has been sent.
pub async fn access_log_layer(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let mut entry = AccessEntry::from_request(&request);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %entry.method,
        path = %request.uri().path(),
    );

    request.extensions_mut().insert(RequestId(request_id));

    let response = next.run(request).instrument(span).await;
    entry.status = response.status().as_u16();

    let (parts, body) = response.into_parts();
    let metered = MeteredBody {
        inner: body,
        guard: LogOnDrop(entry),
    };

    Response::from_parts(parts, Body::new(metered))
}
