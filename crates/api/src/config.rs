//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `THEKAWATCH_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `THEKAWATCH_HOST` - Bind address (default: 127.0.0.1)
//! - `THEKAWATCH_PORT` - Listen port (default: 5000)
//! - `OVERPASS_API_URL` - Overpass interpreter endpoint (default: public overpass-api.de)
//! - `OSRM_API_URL` - OSRM base URL (default: public router.project-osrm.org)
//! - `SHOPS_CACHE_TTL_SECS` - Nearby-shops cache lifetime (default: 300)
//! - `CORS_ALLOWED_ORIGINS` - Comma-separated origins (default: any origin)
//! - `THEKAWATCH_TRUST_PROXY_HEADERS` - Key the vote rate limiter on
//!   `X-Forwarded-For`/`X-Real-IP` (default: false; enable only behind a proxy)
//! - `LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, for local development.
    #[default]
    Pretty,
    /// One JSON object per line, for log shipping.
    Json,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Upstream services
    pub upstream: UpstreamConfig,
    /// How long a nearby-shops response is served from memory
    pub shops_cache_ttl: Duration,
    /// Allowed CORS origins; empty means any origin
    pub cors_allowed_origins: Vec<String>,
    /// Whether client IPs come from proxy headers instead of the socket peer
    pub trust_proxy_headers: bool,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// External services the API proxies to.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Overpass API interpreter endpoint (POI discovery)
    pub overpass_url: Url,
    /// OSRM base URL (routing)
    pub osrm_url: Url,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("THEKAWATCH_DATABASE_URL")?;
        let host = parse_env_or_default::<IpAddr>("THEKAWATCH_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("THEKAWATCH_PORT", "5000")?;
        let upstream = UpstreamConfig::from_env()?;
        let shops_cache_ttl =
            Duration::from_secs(parse_env_or_default::<u64>("SHOPS_CACHE_TTL_SECS", "300")?);
        let cors_allowed_origins = get_optional_env("CORS_ALLOWED_ORIGINS")
            .map_or_else(Vec::new, |v| parse_origins(&v));
        let trust_proxy_headers =
            parse_env_or_default::<bool>("THEKAWATCH_TRUST_PROXY_HEADERS", "false")?;
        let log_format = parse_log_format(&get_env_or_default("LOG_FORMAT", "pretty"))?;

        Ok(Self {
            database_url,
            host,
            port,
            upstream,
            shops_cache_ttl,
            cors_allowed_origins,
            trust_proxy_headers,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default::<f32>("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default::<f32>(
                "SENTRY_TRACES_SAMPLE_RATE",
                "0.0",
            )?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl UpstreamConfig {
    /// Load upstream URLs from the environment, falling back to public instances.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a URL does not parse or is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            overpass_url: parse_url(
                "OVERPASS_API_URL",
                &get_env_or_default("OVERPASS_API_URL", DEFAULT_OVERPASS_URL),
            )?,
            osrm_url: parse_url(
                "OSRM_API_URL",
                &get_env_or_default("OSRM_API_URL", DEFAULT_OSRM_URL),
            )?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` naming `primary_key` if neither is set.
pub fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse and check an upstream base URL.
fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(ConfigError::InvalidEnvVar(
            "LOG_FORMAT".to_string(),
            format!("expected 'pretty' or 'json', got '{other}'"),
        )),
    }
}

/// Configuration for unit tests; never connects anywhere.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://localhost/thekawatch_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 5000,
        upstream: UpstreamConfig {
            overpass_url: Url::parse(DEFAULT_OVERPASS_URL).unwrap(),
            osrm_url: Url::parse(DEFAULT_OSRM_URL).unwrap(),
        },
        shops_cache_ttl: Duration::from_secs(300),
        cors_allowed_origins: Vec::new(),
        trust_proxy_headers: false,
        log_format: LogFormat::Pretty,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_parse_url_accepts_http() {
        let url = parse_url("OSRM_API_URL", "http://localhost:5001").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        let result = parse_url("OSRM_API_URL", "ftp://example.org");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
        assert!(parse_url("OSRM_API_URL", "not a url").is_err());
    }

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins("http://localhost:3000/, https://thekawatch.app ,,");
        assert_eq!(origins, vec!["http://localhost:3000", "https://thekawatch.app"]);
    }

    #[test]
    fn test_parse_log_format() {
        assert_eq!(parse_log_format("JSON").unwrap(), LogFormat::Json);
        assert_eq!(parse_log_format("pretty").unwrap(), LogFormat::Pretty);
        assert!(parse_log_format("xml").is_err());
    }

    #[test]
    fn test_debug_does_not_leak_database_url() {
        let debug_output = format!("{:?}", test_config());
        assert!(!debug_output.contains("thekawatch_test"));
    }
}
