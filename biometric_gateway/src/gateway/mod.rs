mod authorization;
mod client_id;
mod clock;
mod config;
mod matcher;
mod pipeline;
mod rate_limit;
mod security_headers;

pub use authorization::{
    AuthorizationConfig, AuthorizationError, AuthorizationOutcome, AuthorizationStage, Claims,
    JwtAuthorizer,
};
pub use client_id::{UNKNOWN_CLIENT, client_identifier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW_MS, DEFAULT_RATE_LIMITED_PREFIX,
    GatewayConfig, RateLimitConfig,
};
pub use matcher::PathMatcher;
pub use pipeline::{Gateway, GatewayDecision, GatewayRequest, RATE_LIMIT_MESSAGE};
pub use rate_limit::{
    RateLimitDecision, RateLimitEntry, RateLimitStatus, RateLimiter, SweepPolicy,
    X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET,
};
pub use security_headers::{
    CONTENT_SECURITY_POLICY_VALUE, apply_security_headers, security_headers,
};
