//! Server configuration from environment variables.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use http::HeaderValue;

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// `*`: any origin.
    Any,
    /// Explicit list of origins.
    List(Vec<HeaderValue>),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Server port to listen on.
    pub port: u16,
    /// Storage directory for persisted state, created at startup if absent.
    pub db_path: PathBuf,
    /// Directory served under `/media`.
    pub media_path: PathBuf,
    /// Directory of markdown content files.
    pub content_path: PathBuf,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins.
    pub cors_allowed_origins: CorsOrigins,
    /// Upper bound on handling time for one request.
    pub request_timeout: Duration,
    /// Attempts per file read, including the first.
    pub file_read_attempts: u32,
    /// Maximum number of rendered documents kept in memory.
    pub render_cache_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            db_path: PathBuf::from("storage"),
            media_path: PathBuf::from("media"),
            content_path: PathBuf::from("content"),
            log_level: "info".to_string(),
            cors_allowed_origins: CorsOrigins::Any,
            request_timeout: Duration::from_secs(10),
            file_read_attempts: 3,
            render_cache_capacity: 256,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// All optional:
    /// - `SERVER_HOST`: Bind address (default: 0.0.0.0; `localhost` accepted)
    /// - `SERVER_PORT`: Server port (default: 3000)
    /// - `DB_PATH`: Storage directory (default: "storage")
    /// - `MEDIA_PATH`: Static media directory (default: "media")
    /// - `CONTENT_PATH`: Markdown directory (default: "content")
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Comma-separated origins or "*" (default: "*")
    /// - `REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 10)
    /// - `FILE_READ_ATTEMPTS`: Attempts per file read (default: 3)
    /// - `RENDER_CACHE_CAPACITY`: Cached rendered documents (default: 256)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = match var("SERVER_HOST") {
            Some(raw) => parse_host(&raw)?,
            None => defaults.host,
        };
        let port = parse_or("SERVER_PORT", var("SERVER_PORT"), defaults.port)?;

        let request_timeout_secs: u64 = parse_or(
            "REQUEST_TIMEOUT_SECS",
            var("REQUEST_TIMEOUT_SECS"),
            defaults.request_timeout.as_secs(),
        )?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "REQUEST_TIMEOUT_SECS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let file_read_attempts: u32 = parse_or(
            "FILE_READ_ATTEMPTS",
            var("FILE_READ_ATTEMPTS"),
            defaults.file_read_attempts,
        )?;
        if file_read_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "FILE_READ_ATTEMPTS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let cors_allowed_origins = match var("CORS_ALLOWED_ORIGINS") {
            Some(raw) => parse_cors_origins(&raw)?,
            None => defaults.cors_allowed_origins,
        };

        Ok(Self {
            host,
            port,
            db_path: var("DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            media_path: var("MEDIA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_path),
            content_path: var("CONTENT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.content_path),
            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),
            cors_allowed_origins,
            request_timeout: Duration::from_secs(request_timeout_secs),
            file_read_attempts,
            render_cache_capacity: parse_or(
                "RENDER_CACHE_CAPACITY",
                var("RENDER_CACHE_CAPACITY"),
                defaults.render_cache_capacity,
            )?,
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_host(raw: &str) -> Result<IpAddr, ConfigError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("localhost") {
        return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        name: "SERVER_HOST".to_string(),
        reason: format!("{raw:?} is not an IP address"),
    })
}

fn parse_cors_origins(raw: &str) -> Result<CorsOrigins, ConfigError> {
    if raw.trim() == "*" {
        return Ok(CorsOrigins::Any);
    }

    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidValue {
                name: "CORS_ALLOWED_ORIGINS".to_string(),
                reason: format!("invalid origin {origin:?}"),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(CorsOrigins::List)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
