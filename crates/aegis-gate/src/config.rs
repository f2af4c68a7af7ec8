//! Configuration for the gate

use crate::document::parse_selector;
use crate::error::GateError;
use aegis_analysis::{HttpClassifier, DEFAULT_ENDPOINT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Gmail's message body class pair
pub const DEFAULT_SELECTOR: &str = ".a3s.aiL";

/// How a verdict is shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    /// Style-isolated banner prepended to the active message
    Banner,
    /// Blocking notification
    Notification,
}

impl Default for Presentation {
    fn default() -> Self {
        Presentation::Banner
    }
}

/// Configuration for the gate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// CSS selector for message bodies; the last match is the active message
    pub selector: String,

    /// Quiescence window after the last mutation (milliseconds)
    pub debounce_ms: u64,

    /// Message text must be longer than this many characters
    pub min_length: usize,

    /// Classification endpoint
    pub endpoint: String,

    /// Show a banner for safe verdicts too
    pub always_show_banner: bool,

    /// Banner or blocking notification
    pub presentation: Presentation,

    /// Show an "unknown risk" banner when the verdict fails the schema check
    pub warn_on_invalid_response: bool,

    /// Give up on a classification request after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl GateConfig {
    /// Get the debounce window as a Duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Get the request timeout as a Duration, if one is set
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.selector.trim().is_empty() {
            return Err("selector must not be empty".to_string());
        }
        parse_selector(&self.selector).map_err(|e| e.to_string())?;
        if self.debounce_ms == 0 {
            return Err("debounce_ms must be greater than 0".to_string());
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Build the HTTP classifier this configuration points at
    pub fn classifier(&self) -> Result<HttpClassifier, GateError> {
        let classifier = match self.request_timeout() {
            Some(timeout) => HttpClassifier::with_timeout(&self.endpoint, timeout)?,
            None => HttpClassifier::new(&self.endpoint)?,
        };
        Ok(classifier)
    }
}

impl Default for GateConfig {
    /// Strict defaults: only threats are shown
    fn default() -> Self {
        Self {
            selector: DEFAULT_SELECTOR.to_string(),
            debounce_ms: 1_000,
            min_length: 50,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            always_show_banner: false,
            presentation: Presentation::Banner,
            warn_on_invalid_response: true,
            request_timeout_secs: None,
        }
    }
}

impl GateConfig {
    /// Permissive preset: every verdict, safe ones included, gets a banner
    pub fn permissive() -> Self {
        Self {
            always_show_banner: true,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, GateError> {
        let config: GateConfig = toml::from_str(toml_str)?;
        config.validate().map_err(GateError::Config)?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, GateError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }
}
