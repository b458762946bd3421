use std::time::Duration;

use chrono::TimeDelta;

use super::authorization::AuthorizationConfig;
use super::matcher::PathMatcher;
use crate::config::{ConfigError, env_flag, env_list, env_value};

pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 900_000;
pub const DEFAULT_RATE_LIMITED_PREFIX: &str = "/api";

/// Fixed-window admission limits, shared by every client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    max: u32,
    window: Duration,
}

impl RateLimitConfig {
    /// Both values must be positive
    pub fn new(max: u32, window: Duration) -> Result<Self, ConfigError> {
        if max == 0 {
            return Err(ConfigError::invalid("RATE_LIMIT_MAX", "must be positive"));
        }
        if window.is_zero() {
            return Err(ConfigError::invalid("RATE_LIMIT_WINDOW", "must be positive"));
        }
        if TimeDelta::from_std(window).is_err() {
            return Err(ConfigError::invalid("RATE_LIMIT_WINDOW", "is too large"));
        }
        Ok(Self { max, window })
    }

    /// Reads `RATE_LIMIT_MAX` and `RATE_LIMIT_WINDOW` (milliseconds).
    ///
    /// Unparseable values fall back to the defaults; zero or negative values are
    /// rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        let max = env_value::<i64>("RATE_LIMIT_MAX").unwrap_or(DEFAULT_RATE_LIMIT_MAX as i64);
        let window_ms =
            env_value::<i64>("RATE_LIMIT_WINDOW").unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_MS as i64);

        let max = u32::try_from(max)
            .map_err(|_| ConfigError::invalid("RATE_LIMIT_MAX", format!("{max} is out of range")))?;
        let window_ms = u64::try_from(window_ms).map_err(|_| {
            ConfigError::invalid("RATE_LIMIT_WINDOW", format!("{window_ms} is negative"))
        })?;

        Self::new(max, Duration::from_millis(window_ms))
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub(crate) fn window_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.window).unwrap_or(TimeDelta::MAX)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max: DEFAULT_RATE_LIMIT_MAX,
            window: Duration::from_millis(DEFAULT_RATE_LIMIT_WINDOW_MS),
        }
    }
}

/// Everything the gateway needs at construction time
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub rate_limit: RateLimitConfig,
    /// Paths subject to rate limiting
    pub rate_limited_paths: PathMatcher,
    /// Take the client address from `X-Forwarded-For`/`X-Real-IP`. Only enable
    /// behind a reverse proxy that overwrites these headers.
    pub trust_proxy_headers: bool,
    /// `None` selects the no-op authorization stage
    pub authorization: Option<AuthorizationConfig>,
}

impl GatewayConfig {
    pub fn new(rate_limit: RateLimitConfig, rate_limited_paths: PathMatcher) -> Self {
        Self {
            rate_limit,
            rate_limited_paths,
            trust_proxy_headers: false,
            authorization: None,
        }
    }

    pub fn with_trusted_proxy(mut self) -> Self {
        self.trust_proxy_headers = true;
        self
    }

    pub fn with_authorization(mut self, authorization: AuthorizationConfig) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Reads the rate limit settings, `GATEWAY_RATE_LIMIT_PREFIXES`,
    /// `GATEWAY_TRUST_PROXY` (default off) and the authorization settings
    pub fn from_env() -> Result<Self, ConfigError> {
        let prefixes = env_list("GATEWAY_RATE_LIMIT_PREFIXES")
            .unwrap_or_else(|| vec![DEFAULT_RATE_LIMITED_PREFIX.to_string()]);

        Ok(Self {
            rate_limit: RateLimitConfig::from_env()?,
            rate_limited_paths: PathMatcher::prefixes(prefixes),
            trust_proxy_headers: env_flag("GATEWAY_TRUST_PROXY", false),
            authorization: AuthorizationConfig::from_env()?,
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(
            RateLimitConfig::default(),
            PathMatcher::prefixes([DEFAULT_RATE_LIMITED_PREFIX]),
        )
    }
}
