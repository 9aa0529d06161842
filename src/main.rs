//! lanserve: share a directory in the local network.
//!
//! This is the application entry point. It parses the command line, loads the
//! optional configuration file, initializes tracing, prints where the files can
//! be reached and starts the HTTP(S) server.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lanserve::config::{LoggingConfig, Overrides, ServeConfig, DEFAULT_LOG_FILTER};
use lanserve::http::start_server;
use lanserve::net::{determine_lan_ip, InterfaceTable, Platform, SystemInterfaces};
use lanserve::tls::default_sans;
use lanserve::{create_router, AppError};

/// lanserve: Serve a directory over HTTP(S) in the local network
#[derive(Parser, Debug)]
#[command(name = "lanserve", version, about)]
struct Args {
    /// Directory to serve (default: current directory)
    path: Option<PathBuf>,

    /// Directory to serve, same as the positional argument
    #[arg(short, long, conflicts_with = "path")]
    dir: Option<PathBuf>,

    /// Address to bind to (default: 0.0.0.0)
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on (default: 8080)
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve HTTPS with a self-signed certificate generated at startup
    #[arg(short = 's', long)]
    https: bool,

    /// Require basic auth with the given credentials
    #[arg(short, long, value_name = "USER:PASS")]
    auth: Option<String>,

    /// Print the effective configuration and addresses, then exit
    #[arg(short, long)]
    test: bool,

    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level filter (e.g., "lanserve=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "Fatal error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    let config = match &args.config {
        Some(path) => ServeConfig::load(path)?,
        None => ServeConfig::default(),
    };
    let config = config.with_overrides(Overrides {
        bind: args.bind,
        port: args.port,
        root: args.path.or(args.dir),
        https: args.https,
        auth: args.auth,
    })?;

    init_tracing(args.log_level, &config.logging)?;
    config.validate()?;
    tracing::info!(config = ?config, "Loaded configuration");

    let platform = Platform::current();
    print_addresses(&config, platform)?;

    if args.test {
        if config.http.https {
            let sans = default_sans(&SystemInterfaces, platform)?;
            println!("Certificate names: {}", sans.join(", "));
        }
        println!("Dry run, not starting the server");
        return Ok(());
    }

    let app = create_router(&config);
    start_server(app, &config).await?;

    Ok(())
}

/// Initialize tracing with priority: CLI > env > default
fn init_tracing(log_level: Option<String>, logging: &LoggingConfig) -> Result<(), AppError> {
    let log_filter = log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));

    let result = if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| AppError::Logging(e.to_string()))
}

/// Print the served directory and the URLs to share.
///
/// When bound to all interfaces, the interface table and the URL of the LAN
/// address are printed too.
fn print_addresses(config: &ServeConfig, platform: Platform) -> Result<(), AppError> {
    let http = &config.http;
    let addr = http.socket_addr()?;

    println!(
        "Serving \"{}\" at {}://{}",
        http.root.display(),
        http.scheme(),
        addr
    );

    if !addr.ip().is_unspecified() {
        return Ok(());
    }

    let table = InterfaceTable::collect(&SystemInterfaces, platform)?;
    if !table.rows.is_empty() {
        println!();
        print!("{}", table);
        println!();
    }

    match determine_lan_ip(&SystemInterfaces, platform) {
        Ok(ip) if !ip.is_empty() => {
            println!("Share in your LAN: {}://{}:{}", http.scheme(), ip, http.port);
        }
        Ok(_) => {}
        Err(e) if e.is_fatal() => return Err(e.into()),
        Err(e) => tracing::debug!(error = %e, "Could not determine LAN IP"),
    }

    Ok(())
}
