use crate::pipeline::{ChunkingError, ChunkingParams};
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default Gemini model used when `GEMINI_MODEL` is not provided.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
/// Default Gemini REST endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default maximum characters per section.
pub const DEFAULT_CHUNK_SIZE: usize = 4000;
/// Default overlap between consecutive sections.
pub const DEFAULT_CHUNK_OVERLAP: usize = 0;
/// Default pause after each section, sized for the free Gemini tier.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 5000;
/// Default timeout applied to each generation request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Chunking parameters cannot guarantee forward progress.
    #[error("Invalid chunking configuration: {0}")]
    Chunking(#[from] ChunkingError),
}

/// Runtime configuration for Studypack.
///
/// Built once at startup and handed to the components that need it; nothing reads the
/// environment after this point.
#[derive(Clone)]
pub struct Config {
    /// Credential for the Gemini API.
    pub gemini_api_key: String,
    /// Gemini model identifier.
    pub gemini_model: String,
    /// Base URL of the Gemini REST API.
    pub gemini_base_url: String,
    /// Section size and overlap used when splitting documents.
    pub chunking: ChunkingParams,
    /// Pause enforced after every section to stay under the provider rate limit.
    pub request_delay: Duration,
    /// Timeout applied to each generation request.
    pub request_timeout: Duration,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("chunking", &self.chunking)
            .field("request_delay", &self.request_delay)
            .field("request_timeout", &self.request_timeout)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let gemini_api_key = get("GEMINI_API_KEY")
            .map(|value| value.trim().to_string())
            .ok_or_else(|| ConfigError::MissingVariable("GEMINI_API_KEY".to_string()))?;

        let delay_ms = parse_optional(
            get("STUDYPACK_REQUEST_DELAY_MS"),
            "STUDYPACK_REQUEST_DELAY_MS",
        )?
        .unwrap_or(DEFAULT_REQUEST_DELAY_MS);
        let timeout_secs = parse_optional(
            get("STUDYPACK_REQUEST_TIMEOUT_SECS"),
            "STUDYPACK_REQUEST_TIMEOUT_SECS",
        )?
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Ok(Self {
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            chunking: chunking_from_lookup(&get)?,
            request_delay: Duration::from_millis(delay_ms),
            request_timeout: Duration::from_secs(timeout_secs),
            server_port: parse_optional(get("STUDYPACK_SERVER_PORT"), "STUDYPACK_SERVER_PORT")?,
        })
    }
}

/// Read only the chunking parameters from the process environment.
///
/// Used by commands that never contact the generation service and so need no credential.
pub fn chunking_from_env() -> Result<ChunkingParams, ConfigError> {
    chunking_from_lookup(&|key: &str| env::var(key).ok().filter(|value| !value.trim().is_empty()))
}

fn chunking_from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<ChunkingParams, ConfigError> {
    let max_chars = parse_optional(get("STUDYPACK_CHUNK_SIZE"), "STUDYPACK_CHUNK_SIZE")?
        .unwrap_or(DEFAULT_CHUNK_SIZE);
    let overlap = parse_optional(get("STUDYPACK_CHUNK_OVERLAP"), "STUDYPACK_CHUNK_OVERLAP")?
        .unwrap_or(DEFAULT_CHUNK_OVERLAP);
    Ok(ChunkingParams::new(max_chars, overlap)?)
}

fn parse_optional<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Load `.env` (when present) and build the configuration from the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        model = %config.gemini_model,
        base_url = %config.gemini_base_url,
        chunk_size = config.chunking.max_chars(),
        overlap = config.chunking.overlap(),
        delay_ms = config.request_delay.as_millis() as u64,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    Ok(config)
}
