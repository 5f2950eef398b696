//! Application configuration loaded from environment variables.

use std::env;
use std::ops::Range;
use std::time::Duration;

/// Default game site.
pub const DEFAULT_SITE_BASE_URL: &str = "https://www.margonem.pl";

/// Which store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Google Cloud Firestore (production)
    Firestore,
    /// In-process store (tests and local runs, not persisted)
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Store backend
    pub storage_backend: StorageBackend,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,

    // --- Sampler ---
    /// Base URL of the game site (no trailing slash)
    pub site_base_url: String,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Sleep between sampler ticks
    pub tick_interval: Duration,
    /// Which `news-body` blocks of the online page to scan (0-based, half-open)
    pub feed_blocks: Range<usize>,
    /// Whether to run the sampler alongside the API
    pub sampler_enabled: bool,
}

impl Config {
    /// Config for tests: memory store, sampler disabled.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            storage_backend: StorageBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            site_base_url: "http://127.0.0.1:9".to_string(),
            http_timeout: Duration::from_secs(2),
            tick_interval: Duration::from_millis(10),
            feed_blocks: 1..9,
            sampler_enabled: false,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let gcp_project_id = env::var("GCP_PROJECT_ID").ok();
        let storage_backend = match env::var("STORAGE_BACKEND").ok().as_deref() {
            Some("firestore") => StorageBackend::Firestore,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid("STORAGE_BACKEND", other.to_string()))
            }
            None if gcp_project_id.is_some() => StorageBackend::Firestore,
            None => StorageBackend::Memory,
        };

        if storage_backend == StorageBackend::Firestore && gcp_project_id.is_none() {
            return Err(ConfigError::Missing("GCP_PROJECT_ID"));
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage_backend,
            gcp_project_id: gcp_project_id.unwrap_or_else(|| "local-dev".to_string()),
            site_base_url: env::var("SITE_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_SITE_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(parse_positive_var("HTTP_TIMEOUT_SECS", 10)?),
            tick_interval: Duration::from_millis(parse_positive_var("TICK_INTERVAL_MS", 1000)?),
            feed_blocks: match env::var("FEED_BLOCKS") {
                Ok(raw) => parse_block_range(&raw)
                    .ok_or(ConfigError::Invalid("FEED_BLOCKS", raw))?,
                Err(_) => 1..9,
            },
            sampler_enabled: match env::var("SAMPLER_ENABLED") {
                Ok(raw) => match raw.as_str() {
                    "1" | "true" => true,
                    "0" | "false" => false,
                    _ => return Err(ConfigError::Invalid("SAMPLER_ENABLED", raw)),
                },
                Err(_) => true,
            },
        })
    }
}

/// Parse a non-zero numeric variable, falling back to `default` when unset.
fn parse_positive_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::Invalid(name, raw)),
        },
        Err(_) => Ok(default),
    }
}

/// Parse `start..end` into a non-empty range.
fn parse_block_range(raw: &str) -> Option<Range<usize>> {
    let (start, end) = raw.trim().split_once("..")?;
    let start: usize = start.trim().parse().ok()?;
    let end: usize = end.trim().parse().ok()?;
    (start < end).then_some(start..end)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
