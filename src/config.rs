//! Client configuration parsed from environment variables.
//!
//! The backend origin and the currency-formatting locale are supplied by the
//! host application — nothing in the core hard-codes either. Timing knobs
//! default to the production values but stay configurable so tests can run
//! them at millisecond scale.

use std::time::Duration;

pub const DEFAULT_ROTATE_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_FETCH_RETRY_BACKOFF_MS: u64 = 5_000;
pub const DEFAULT_FETCH_RETRY_LIMIT: u8 = 3;
pub const DEFAULT_FAILURE_ADVANCE_DELAY_MS: u64 = 2_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {var}")]
    MissingVar { var: String },
    #[error("unknown currency locale: {0}")]
    UnknownLocale(String),
}

/// Separator pair used by the currency mask.
///
/// `pt-BR` writes `3.500,00`; `en-US` writes `3,500.00`. The storage form is
/// always the canonical decimal-point string, independent of locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyLocale {
    pub decimal: char,
    pub thousands: char,
}

impl CurrencyLocale {
    #[must_use]
    pub const fn pt_br() -> Self {
        Self { decimal: ',', thousands: '.' }
    }

    #[must_use]
    pub const fn en_us() -> Self {
        Self { decimal: '.', thousands: ',' }
    }

    /// Parse a locale tag (`pt-BR` / `en-US`, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownLocale` for any other tag.
    pub fn from_tag(tag: &str) -> Result<Self, ConfigError> {
        match tag.to_ascii_lowercase().as_str() {
            "pt-br" | "pt_br" => Ok(Self::pt_br()),
            "en-us" | "en_us" => Ok(Self::en_us()),
            other => Err(ConfigError::UnknownLocale(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, without trailing slash. Also the base for resolving
    /// relative media paths.
    pub base_url: String,
    pub currency_locale: CurrencyLocale,
    /// Delay between automatic banner rotations.
    pub rotate_interval: Duration,
    /// Fixed backoff between banner fetch retries.
    pub fetch_retry_backoff: Duration,
    /// Consecutive failed banner-fetch attempts before the slot gives up;
    /// a limit of 3 means two automatically scheduled retries.
    pub fetch_retry_limit: u8,
    /// Delay before rotating away from a banner whose image failed to load.
    pub failure_advance_delay: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Config with production defaults for the given backend origin.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            currency_locale: CurrencyLocale::pt_br(),
            rotate_interval: Duration::from_millis(DEFAULT_ROTATE_INTERVAL_MS),
            fetch_retry_backoff: Duration::from_millis(DEFAULT_FETCH_RETRY_BACKOFF_MS),
            fetch_retry_limit: DEFAULT_FETCH_RETRY_LIMIT,
            failure_advance_delay: Duration::from_millis(DEFAULT_FAILURE_ADVANCE_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Build typed client config from environment variables.
    ///
    /// Required:
    /// - `IMOVLOCAL_BASE_URL`
    ///
    /// Optional:
    /// - `IMOVLOCAL_CURRENCY_LOCALE`: `pt-BR` (default) or `en-US`
    /// - `IMOVLOCAL_ROTATE_INTERVAL_MS`: default 5000
    /// - `IMOVLOCAL_FETCH_RETRY_BACKOFF_MS`: default 5000
    /// - `IMOVLOCAL_FETCH_RETRY_LIMIT`: default 3
    /// - `IMOVLOCAL_FAILURE_ADVANCE_DELAY_MS`: default 2000
    /// - `IMOVLOCAL_REQUEST_TIMEOUT_SECS`: default 30
    /// - `IMOVLOCAL_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is absent or the locale tag is
    /// unrecognized.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("IMOVLOCAL_BASE_URL")
            .map_err(|_| ConfigError::MissingVar { var: "IMOVLOCAL_BASE_URL".into() })?;

        let currency_locale = match std::env::var("IMOVLOCAL_CURRENCY_LOCALE") {
            Ok(tag) => CurrencyLocale::from_tag(&tag)?,
            Err(_) => CurrencyLocale::pt_br(),
        };

        let mut config = Self::new(base_url);
        config.currency_locale = currency_locale;
        config.rotate_interval =
            Duration::from_millis(env_parse_u64("IMOVLOCAL_ROTATE_INTERVAL_MS", DEFAULT_ROTATE_INTERVAL_MS));
        config.fetch_retry_backoff = Duration::from_millis(env_parse_u64(
            "IMOVLOCAL_FETCH_RETRY_BACKOFF_MS",
            DEFAULT_FETCH_RETRY_BACKOFF_MS,
        ));
        config.fetch_retry_limit = env_parse_u8("IMOVLOCAL_FETCH_RETRY_LIMIT", DEFAULT_FETCH_RETRY_LIMIT);
        config.failure_advance_delay = Duration::from_millis(env_parse_u64(
            "IMOVLOCAL_FAILURE_ADVANCE_DELAY_MS",
            DEFAULT_FAILURE_ADVANCE_DELAY_MS,
        ));
        config.request_timeout =
            Duration::from_secs(env_parse_u64("IMOVLOCAL_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS));
        config.connect_timeout =
            Duration::from_secs(env_parse_u64("IMOVLOCAL_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS));
        Ok(config)
    }

    /// Resolve a media path from the backend against the configured origin.
    ///
    /// Absolute URLs (with scheme) pass through verbatim; relative paths are
    /// joined to `base_url`.
    #[must_use]
    pub fn resolve_media_url(&self, raw: &str) -> String {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return raw.to_owned();
        }
        if raw.starts_with('/') {
            format!("{}{raw}", self.base_url)
        } else {
            format!("{}/{raw}", self.base_url)
        }
    }
}

// =============================================================================
// ENV HELPERS
// =============================================================================

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_parse_u8(key: &str, default: u8) -> u8 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
