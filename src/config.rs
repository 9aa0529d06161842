//! Configuration loading and constants.
//!
//! `ServeConfig` is built once at startup from defaults, an optional TOML file
//! and command line overrides, then validated. It is never mutated afterwards;
//! the router and server only read from it.

use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

// =============================================================================
// Defaults
// =============================================================================

/// Listen on all interfaces so other machines in the LAN can connect
pub const DEFAULT_BIND: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8080;

/// Serve the working directory
pub const DEFAULT_ROOT: &str = ".";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "lanserve=info,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Realm sent in the basic auth challenge
pub const AUTH_REALM: &str = "lanserve";

/// Seconds to wait for open connections after Ctrl+C / SIGTERM
pub const SHUTDOWN_GRACE_SECS: u64 = 1;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServeConfig {
    #[serde(default)]
    pub http: HttpConfig,
    /// Basic auth credentials; no auth when absent
    #[serde(default)]
    pub auth: Option<Credentials>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "HttpConfig::default_bind")]
    pub bind: String,
    #[serde(default = "HttpConfig::default_port")]
    pub port: u16,
    /// Directory whose contents are served
    #[serde(default = "HttpConfig::default_root")]
    pub root: PathBuf,
    /// Serve HTTPS with an ephemeral self-signed certificate
    #[serde(default)]
    pub https: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            port: Self::default_port(),
            root: Self::default_root(),
            https: false,
        }
    }
}

impl HttpConfig {
    fn default_bind() -> String {
        DEFAULT_BIND.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_PORT
    }

    fn default_root() -> PathBuf {
        PathBuf::from(DEFAULT_ROOT)
    }

    pub fn scheme(&self) -> &'static str {
        if self.https {
            "https"
        } else {
            "http"
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        // Bracket bare IPv6 literals so "::" and "::1" parse with a port
        let host = if self.bind.contains(':') && !self.bind.starts_with('[') {
            format!("[{}]", self.bind)
        } else {
            self.bind.clone()
        };
        format!("{}:{}", host, self.port).parse().map_err(|e| {
            ConfigError::Validation(format!(
                "Invalid bind address {}:{}: {}",
                self.bind, self.port, e
            ))
        })
    }
}

/// Basic auth username and password
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Parse a `user:pass` pair. The password may itself contain colons.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let (username, password) = value.split_once(':').ok_or_else(|| {
            ConfigError::Validation("Credentials must have the form user:pass".to_string())
        })?;
        let credentials = Self {
            username: username.to_string(),
            password: password.to_string(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.username.is_empty() {
            return Err(ConfigError::Validation(
                "Basic auth username must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub root: Option<PathBuf>,
    pub https: bool,
    pub auth: Option<String>,
}

impl ServeConfig {
    /// Load from a TOML file. All tables and fields are optional.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply command line values on top of the loaded configuration.
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(bind) = overrides.bind {
            self.http.bind = bind;
        }
        if let Some(port) = overrides.port {
            self.http.port = port;
        }
        if let Some(root) = overrides.root {
            self.http.root = root;
        }
        // A flag can only switch HTTPS on
        self.http.https |= overrides.https;
        if let Some(auth) = overrides.auth {
            self.auth = Some(Credentials::parse(&auth)?);
        }
        Ok(self)
    }

    /// Check everything the server needs before binding.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.http.socket_addr()?;
        if !self.http.root.is_dir() {
            return Err(ConfigError::Validation(format!(
                "Root {} is not a directory",
                self.http.root.display()
            )));
        }
        if let Some(auth) = &self.auth {
            auth.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
