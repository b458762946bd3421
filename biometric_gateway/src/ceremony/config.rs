use std::time::Duration;

use super::platform::CaptureConstraints;
use crate::config::{ConfigError, env_value};

const DEFAULT_PASSKEY_TIMEOUT_SECS: u32 = 60;
const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.8;
const DEFAULT_ANALYSIS_WINDOW_MS: u64 = 2000;

/// Relying party settings for the WebAuthn factor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasskeyConfig {
    pub(crate) origin: String,
    pub(crate) rp_id: String,
    pub(crate) rp_name: String,
    pub(crate) timeout_secs: u32,
}

impl PasskeyConfig {
    /// Builds the relying party identity from an origin such as `https://example.com:3443`.
    ///
    /// The RP id is the origin's host; the RP name defaults to the origin.
    pub fn new(
        origin: &str,
        rp_name: Option<String>,
        timeout_secs: u32,
    ) -> Result<Self, ConfigError> {
        let url = url::Url::parse(origin)
            .map_err(|e| ConfigError::invalid("ORIGIN", format!("{origin}: {e}")))?;
        let rp_id = url
            .host_str()
            .ok_or_else(|| ConfigError::invalid("ORIGIN", format!("{origin} has no host")))?
            .to_string();
        if timeout_secs == 0 {
            return Err(ConfigError::invalid("PASSKEY_TIMEOUT", "must be positive"));
        }

        Ok(Self {
            origin: origin.trim_end_matches('/').to_string(),
            rp_id,
            rp_name: rp_name.unwrap_or_else(|| origin.trim_end_matches('/').to_string()),
            timeout_secs,
        })
    }

    /// Reads `ORIGIN` (required), `PASSKEY_RP_NAME` and `PASSKEY_TIMEOUT` (seconds)
    pub fn from_env() -> Result<Self, ConfigError> {
        let origin =
            std::env::var("ORIGIN").map_err(|_| ConfigError::Missing("ORIGIN".to_string()))?;
        let rp_name = std::env::var("PASSKEY_RP_NAME").ok();
        let timeout = env_value::<u32>("PASSKEY_TIMEOUT").unwrap_or(DEFAULT_PASSKEY_TIMEOUT_SECS);
        Self::new(&origin, rp_name, timeout)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn rp_id(&self) -> &str {
        &self.rp_id
    }
}

/// Settings for the camera based factor
#[derive(Debug, Clone, PartialEq)]
pub struct FacialConfig {
    pub(crate) confidence_threshold: f32,
    pub(crate) analysis_window: Duration,
    pub(crate) constraints: CaptureConstraints,
}

impl FacialConfig {
    pub fn new(confidence_threshold: f32, analysis_window: Duration) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(ConfigError::invalid(
                "FACIAL_CONFIDENCE_THRESHOLD",
                "must be within [0, 1]",
            ));
        }
        Ok(Self {
            confidence_threshold,
            analysis_window,
            constraints: CaptureConstraints::default(),
        })
    }

    pub fn with_constraints(mut self, constraints: CaptureConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Reads `FACIAL_CONFIDENCE_THRESHOLD` and `FACIAL_ANALYSIS_WINDOW_MS`
    pub fn from_env() -> Result<Self, ConfigError> {
        let threshold = env_value::<f32>("FACIAL_CONFIDENCE_THRESHOLD")
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);
        let window_ms =
            env_value::<u64>("FACIAL_ANALYSIS_WINDOW_MS").unwrap_or(DEFAULT_ANALYSIS_WINDOW_MS);
        Self::new(threshold, Duration::from_millis(window_ms))
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }
}

impl Default for FacialConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            analysis_window: Duration::from_millis(DEFAULT_ANALYSIS_WINDOW_MS),
            constraints: CaptureConstraints::default(),
        }
    }
}
