//! Environment-backed configuration.
//!
//! Every setting has a default. Values that are set but malformed are rejected so the
//! process never serves evaluations against a silently substituted rubric.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_EVALUATION_CACHE_TTL_SECS, DEFAULT_MAX_AD_RATIO, DEFAULT_MIN_CONTENT_LENGTH,
    DEFAULT_MIN_QUALITY_SCORE, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_TIMEOUT_SECS,
    DEFAULT_OLLAMA_URL, DEFAULT_PORT,
};

/// Server-side evaluation thresholds.
///
/// These values steer scoring and must never reach the party whose content is being
/// scored. `Debug` is redacted so they cannot leak through `{:?}` in logs.
#[derive(Clone, Copy, PartialEq)]
pub struct Rubric {
    /// Pages whose text is shorter than this (in characters) skip the model call.
    pub min_content_length: usize,

    /// Scores at or above this mark a page as useful.
    pub min_quality_score: f64,

    /// Highest acceptable share of advertising in a page, stated to the model.
    pub max_ad_ratio: f64,
}

impl Default for Rubric {
    fn default() -> Self {
        Self {
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
            min_quality_score: DEFAULT_MIN_QUALITY_SCORE,
            max_ad_ratio: DEFAULT_MAX_AD_RATIO,
        }
    }
}

impl fmt::Debug for Rubric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rubric").finish_non_exhaustive()
    }
}

impl Rubric {
    /// Usefulness is a pure function of the score and the quality threshold.
    #[inline]
    pub fn is_useful(&self, score: f64) -> bool {
        score >= self.min_quality_score
    }

    /// Checks that both ratios lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_quality_score) {
            return Err(ConfigError::OutOfUnitRange {
                name: Config::ENV_MIN_QUALITY_SCORE,
            });
        }
        if !(0.0..=1.0).contains(&self.max_ad_ratio) {
            return Err(ConfigError::OutOfUnitRange {
                name: Config::ENV_MAX_AD_RATIO,
            });
        }
        Ok(())
    }
}

/// Process-wide configuration, built once at startup and shared read-only.
///
/// Use [`Config::from_env`] followed by [`Config::validate`].
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP facade port. Default: `8000`.
    pub port: u16,

    /// IP address the facade binds to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Base URL of the Ollama-compatible model server.
    pub ollama_url: String,

    /// Model identifier passed with every generate request.
    pub ollama_model: String,

    /// Budget for a single generate call.
    pub request_timeout: Duration,

    /// Scoring thresholds.
    pub rubric: Rubric,

    /// Reserved for result caching; no cache reads it yet.
    pub cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_OLLAMA_TIMEOUT_SECS),
            rubric: Rubric::default(),
            cache_ttl: Duration::from_secs(DEFAULT_EVALUATION_CACHE_TTL_SECS),
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "EVALUATOR_PORT";
    const ENV_BIND_ADDR: &'static str = "EVALUATOR_BIND_ADDR";
    const ENV_OLLAMA_URL: &'static str = "OLLAMA_URL";
    const ENV_OLLAMA_MODEL: &'static str = "OLLAMA_MODEL";
    const ENV_OLLAMA_TIMEOUT: &'static str = "OLLAMA_TIMEOUT";
    const ENV_MIN_CONTENT_LENGTH: &'static str = "MIN_CONTENT_LENGTH";
    const ENV_MIN_QUALITY_SCORE: &'static str = "MIN_QUALITY_SCORE";
    const ENV_MAX_AD_RATIO: &'static str = "MAX_AD_RATIO";
    const ENV_CACHE_TTL: &'static str = "EVALUATION_CACHE_TTL";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let ollama_url = Self::parse_string_from_env(Self::ENV_OLLAMA_URL, defaults.ollama_url)?;
        let ollama_model =
            Self::parse_string_from_env(Self::ENV_OLLAMA_MODEL, defaults.ollama_model)?;
        let timeout_secs =
            Self::parse_u64_from_env(Self::ENV_OLLAMA_TIMEOUT, defaults.request_timeout.as_secs())?;
        let min_content_length = Self::parse_u64_from_env(
            Self::ENV_MIN_CONTENT_LENGTH,
            defaults.rubric.min_content_length as u64,
        )? as usize;
        let min_quality_score = Self::parse_f64_from_env(
            Self::ENV_MIN_QUALITY_SCORE,
            defaults.rubric.min_quality_score,
        )?;
        let max_ad_ratio =
            Self::parse_f64_from_env(Self::ENV_MAX_AD_RATIO, defaults.rubric.max_ad_ratio)?;
        let cache_ttl_secs =
            Self::parse_u64_from_env(Self::ENV_CACHE_TTL, defaults.cache_ttl.as_secs())?;

        Ok(Self {
            port,
            bind_addr,
            ollama_url,
            ollama_model,
            request_timeout: Duration::from_secs(timeout_secs),
            rubric: Rubric {
                min_content_length,
                min_quality_score,
                max_ad_ratio,
            },
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }

    /// Validates ranges, the gateway URL and the timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url =
            reqwest::Url::parse(&self.ollama_url).map_err(|e| ConfigError::InvalidUrl {
                value: self.ollama_url.clone(),
                reason: e.to_string(),
            })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                value: self.ollama_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.ollama_model.trim().is_empty() {
            return Err(ConfigError::Empty {
                name: Self::ENV_OLLAMA_MODEL,
            });
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        self.rubric.validate()
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        std::net::SocketAddr::new(self.bind_addr, self.port).to_string()
    }

    /// Liveness URL a local probe should hit. Wildcard binds are reached via loopback.
    pub fn health_check_url(&self) -> String {
        let ip = match self.bind_addr {
            IpAddr::V4(v4) if v4.is_unspecified() => IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            IpAddr::V6(v6) if v6.is_unspecified() => IpAddr::V6(std::net::Ipv6Addr::LOCALHOST),
            ip => ip,
        };
        format!("http://{}/healthz", std::net::SocketAddr::new(ip, self.port))
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(name: &'static str, default: String) -> Result<String, ConfigError> {
        match env::var(name) {
            Ok(value) => {
                let value = value.trim().to_string();
                if value.is_empty() {
                    return Err(ConfigError::Empty { name });
                }
                Ok(value)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_u64_from_env(name: &'static str, default: u64) -> Result<u64, ConfigError> {
        match env::var(name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::IntParseError {
                    name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_f64_from_env(name: &'static str, default: f64) -> Result<f64, ConfigError> {
        match env::var(name) {
            Ok(value) => {
                let parsed: f64 =
                    value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::FloatParseError {
                            name,
                            value: value.clone(),
                            source: e,
                        })?;
                if !parsed.is_finite() {
                    return Err(ConfigError::OutOfUnitRange { name });
                }
                Ok(parsed)
            }
            Err(_) => Ok(default),
        }
    }
}
