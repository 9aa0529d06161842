//! End-to-end tests against a real listener.
//!
//! Each test binds the router to an ephemeral port on 127.0.0.1 and talks to it
//! with reqwest, the same way a browser in the LAN would.
//!
//! Run with: cargo test --test server_tests
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use axum::{routing::get, Router};
use lanserve::config::{Credentials, ServeConfig};
use lanserve::{apply_middleware, create_router};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

/// Log output of the whole test binary.
static LOGS: OnceLock<LogCapture> = OnceLock::new();

#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install a global subscriber writing into [`LOGS`]; server tasks run on
/// other threads, so a thread-local default would miss them.
fn logs() -> &'static LogCapture {
    LOGS.get_or_init(|| {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to install test subscriber");
        capture
    })
}

/// Wait for an access line containing `needle`. The line is written when the
/// server drops the response body, which can happen just after the client has
/// read it.
async fn wait_for_log(needle: &str) -> String {
    for _ in 0..50 {
        let contents = logs().contents();
        if contents.lines().any(|line| line.contains(needle)) {
            return contents;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("no log line containing {:?} in:\n{}", needle, logs().contents());
}

/// Serve `app` in the background and return its base URL.
async fn spawn_app(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    format!("http://{}", addr)
}

fn shared_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hello.txt"), "hello from the LAN").unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs/index.html"), "<p>docs</p>").unwrap();
    dir
}

fn config_for(root: &Path) -> ServeConfig {
    let mut config = ServeConfig::default();
    config.http.root = root.to_path_buf();
    config
}

#[tokio::test]
async fn serves_files_with_length() {
    let dir = shared_dir();
    let base = spawn_app(create_router(&config_for(dir.path()))).await;

    let response = reqwest::get(format!("{}/hello.txt", base)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.content_length(), Some(18));
    assert_eq!(response.text().await.unwrap(), "hello from the LAN");

    let response = reqwest::get(format!("{}/docs/", base)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "<p>docs</p>");

    let response = reqwest::get(format!("{}/nope.txt", base)).await.unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn survives_panicking_handler() {
    let app = apply_middleware(
        Router::new()
            .route("/panic", get(|| async { panic!("deliberate test panic") as () }))
            .route("/ok", get(|| async { "still here" })),
        None,
    );
    let base = spawn_app(app).await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let response = client.get(format!("{}/panic", base)).send().await.unwrap();
        assert_eq!(response.status(), 500);
        assert_eq!(response.text().await.unwrap(), "Internal Server Error");
    }

    let response = client.get(format!("{}/ok", base)).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "still here");
}

#[tokio::test]
async fn basic_auth_challenge_and_access() {
    let dir = shared_dir();
    let mut config = config_for(dir.path());
    config.auth = Some(Credentials::parse("guest:letmein").unwrap());
    let base = spawn_app(create_router(&config)).await;
    let client = reqwest::Client::new();
    let url = format!("{}/hello.txt", base);

    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), 401);
    assert_eq!(
        response.headers().get("www-authenticate").unwrap(),
        "Basic realm=\"lanserve\""
    );

    let response = client
        .get(&url)
        .basic_auth("guest", Some("wrong"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .get(&url)
        .basic_auth("guest", Some("letmein"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "hello from the LAN");
}

#[tokio::test]
async fn headers_pass_through_access_log() {
    let dir = shared_dir();
    let mut config = config_for(dir.path());
    config.auth = Some(Credentials::parse("guest:letmein").unwrap());
    let base = spawn_app(create_router(&config)).await;

    // Challenge body "Unauthorized" keeps its length instead of being chunked
    let response = reqwest::get(format!("{}/hello.txt", base)).await.unwrap();
    assert_eq!(response.status(), 401);
    assert_eq!(response.headers().get("content-length").unwrap(), "12");
    assert!(response.headers().get("transfer-encoding").is_none());

    let app = apply_middleware(
        Router::new().route(
            "/gone",
            get(|| async { (axum::http::StatusCode::NOT_FOUND, "nop") }),
        ),
        None,
    );
    let base = spawn_app(app).await;
    let response = reqwest::get(format!("{}/gone", base)).await.unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.headers().get("content-length").unwrap(), "3");
    assert!(response.headers().get("transfer-encoding").is_none());
}

#[tokio::test]
async fn access_line_reports_received_bytes() {
    logs();
    let dir = shared_dir();
    let base = spawn_app(create_router(&config_for(dir.path()))).await;

    let response = reqwest::Client::new()
        .get(format!("{}/hello.txt?from=access-test", base))
        .header("user-agent", "access-test-agent")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body = response.bytes().await.unwrap();
    assert_eq!(body.len(), 18);

    let expected = format!(
        r#"[GET] "/hello.txt?from=access-test" HTTP/1.1 200 {} "access-test-agent""#,
        body.len()
    );
    let logs = wait_for_log(&expected).await;
    let line = logs.lines().find(|line| line.contains(&expected)).unwrap();
    // Remote address comes from the connection
    assert!(line.contains("127.0.0.1:"), "{line}");
}
