//! biometric_gateway - Biometric credential ceremonies and request admission
//!
//! Two independent halves:
//!
//! - [`CeremonyEngine`] drives fingerprint (WebAuthn platform authenticator) and
//!   facial (camera capture plus scoring) ceremonies against injected platform
//!   capabilities, always resolving to a [`CeremonyResult`].
//! - [`Gateway`] admits inbound requests: fixed-window rate limiting per client,
//!   an optional JWT authorization stage and a fixed set of security headers.
//!
//! Transport bindings live in `biometric-gateway-axum`.

mod ceremony;
mod config;
mod gateway;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::ConfigError;

pub use ceremony::{
    AuthenticationOptions, CameraDevice, Capabilities, CaptureConstraints, CeremonyEngine,
    CeremonyErrorKind, CeremonyResult, CredentialAssertion, CredentialFactor, DEFAULT_USER_NAME,
    FaceAnalysis, FaceScorer, FacialConfig, FacialRecognition, FingerprintAuth, Frame,
    HeadlessPlatform, MediaStream, PasskeyConfig, PlatformAuthenticator, PlatformError,
    PublicKeyCredential, RegistrationOptions, SupportState, authenticate_or_register,
};

pub use gateway::{
    AuthorizationConfig, AuthorizationError, AuthorizationOutcome, AuthorizationStage, Claims,
    Clock, CONTENT_SECURITY_POLICY_VALUE, DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW_MS,
    DEFAULT_RATE_LIMITED_PREFIX, Gateway, GatewayConfig, GatewayDecision, GatewayRequest,
    JwtAuthorizer, ManualClock, PathMatcher, RATE_LIMIT_MESSAGE, RateLimitConfig,
    RateLimitDecision, RateLimitEntry, RateLimitStatus, RateLimiter, SweepPolicy, SystemClock,
    UNKNOWN_CLIENT, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET,
    apply_security_headers, client_identifier, security_headers,
};
