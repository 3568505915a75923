//! Explicit configuration values injected at construction time.
//!
//! The library never reads the environment on its own; binaries call
//! [`GatewayConfig::from_env`] once and hand the result down.

use crate::{Horizon, ValidationError};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "FERROCAST_API_URL";
pub const TIMEOUT_ENV: &str = "FERROCAST_TIMEOUT_MS";

/// Paths rendered per simulation chart.
pub const DEFAULT_PATH_CAP: usize = 20;
/// Calendar days between consecutive simulated path samples.
pub const DEFAULT_STRIDE_DAYS: u32 = 5;

/// Endpoint settings for the remote gateway.
///
/// Requests carry no timeout unless one is set; a hung request keeps its
/// view loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    base_url: String,
    pub timeout_ms: Option<u64>,
    pub user_agent: String,
}

impl GatewayConfig {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ValidationError> {
        Ok(Self {
            base_url: normalize_base_url(base_url.as_ref())?,
            timeout_ms: None,
            user_agent: String::from(concat!("ferrocast/", env!("CARGO_PKG_VERSION"))),
        })
    }

    /// Reads `FERROCAST_API_URL` (local development default when unset) and
    /// the optional `FERROCAST_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ValidationError> {
        let base_url =
            std::env::var(API_URL_ENV).unwrap_or_else(|_| String::from(DEFAULT_API_URL));
        let timeout_ms = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok());

        let config = Self::new(base_url)?;
        Ok(match timeout_ms {
            Some(timeout_ms) => config.with_timeout_ms(timeout_ms),
            None => config,
        })
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins an absolute service path (`/forecast/SPY`) onto the base url.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_API_URL),
            timeout_ms: None,
            user_agent: String::from(concat!("ferrocast/", env!("CARGO_PKG_VERSION"))),
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());

    if !has_host {
        return Err(ValidationError::InvalidBaseUrl {
            value: raw.to_owned(),
        });
    }

    Ok(trimmed.to_owned())
}

/// Display constants shared by the view reducers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    pub horizons: Vec<Horizon>,
    pub path_cap: usize,
    pub stride_days: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            horizons: Horizon::STANDARD.to_vec(),
            path_cap: DEFAULT_PATH_CAP,
            stride_days: DEFAULT_STRIDE_DAYS,
        }
    }
}
