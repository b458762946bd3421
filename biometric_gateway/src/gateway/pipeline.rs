use std::net::IpAddr;
use std::sync::Arc;

use http::HeaderMap;

use super::authorization::{AuthorizationOutcome, AuthorizationStage, Claims};
use super::client_id::client_identifier;
use super::clock::{Clock, SystemClock};
use super::config::GatewayConfig;
use super::matcher::PathMatcher;
use super::rate_limit::{RateLimitDecision, RateLimitStatus, RateLimiter, SweepPolicy};

/// Body message of a rate-limited response
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// The parts of an inbound request the gateway looks at
#[derive(Debug, Clone, Copy)]
pub struct GatewayRequest<'a> {
    pub path: &'a str,
    pub headers: &'a HeaderMap,
    /// Socket peer address, when the transport knows it
    pub peer: Option<IpAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayDecision {
    /// Hand the request to the handler
    Forward { claims: Option<Claims> },
    /// Answer 429 with the rate limit headers
    RateLimited(RateLimitStatus),
    /// Answer with a temporary redirect to the login surface
    Redirect(String),
}

/// Admission pipeline run before every handler: rate limiting on matching
/// paths, then the authorization stage. Security headers are added to the
/// response by the transport layer whatever the decision.
pub struct Gateway {
    limiter: RateLimiter,
    rate_limited: PathMatcher,
    trust_proxy_headers: bool,
    authorization: AuthorizationStage,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock), SweepPolicy::default())
    }

    pub fn with_clock(config: GatewayConfig, clock: Arc<dyn Clock>, sweep: SweepPolicy) -> Self {
        let authorization = AuthorizationStage::from_config(config.authorization);
        tracing::info!(
            "Gateway ready: rate limited paths {:?}, proxy headers {}, authorization {}",
            config.rate_limited_paths,
            if config.trust_proxy_headers { "trusted" } else { "ignored" },
            if authorization.is_enabled() { "on" } else { "off" }
        );
        Self {
            limiter: RateLimiter::new(config.rate_limit, clock, sweep),
            rate_limited: config.rate_limited_paths,
            trust_proxy_headers: config.trust_proxy_headers,
            authorization,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn admit(&self, request: GatewayRequest<'_>) -> GatewayDecision {
        if self.rate_limited.matches(request.path) {
            let client_id =
                client_identifier(request.headers, request.peer, self.trust_proxy_headers);
            if let RateLimitDecision::Rejected(status) = self.limiter.check(&client_id) {
                tracing::warn!(
                    "Rate limit exceeded for {} on {}, resets at {}",
                    client_id,
                    request.path,
                    status.reset_at
                );
                return GatewayDecision::RateLimited(status);
            }
        }

        match self.authorization.evaluate(request.path, request.headers) {
            AuthorizationOutcome::Public => GatewayDecision::Forward { claims: None },
            AuthorizationOutcome::Authorized(claims) => GatewayDecision::Forward {
                claims: Some(claims),
            },
            AuthorizationOutcome::Denied { location, .. } => GatewayDecision::Redirect(location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::authorization::AuthorizationConfig;
    use crate::gateway::clock::ManualClock;
    use crate::gateway::config::RateLimitConfig;
    use crate::test_utils::sign_token;
    use chrono::TimeDelta;
    use http::HeaderValue;
    use http::header::AUTHORIZATION;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    const SECRET: &[u8] = b"pipeline-secret";

    fn gateway(max: u32, authorization: bool) -> (Gateway, ManualClock) {
        let clock = ManualClock::at_epoch();
        let mut config = GatewayConfig::new(
            RateLimitConfig::new(max, Duration::from_secs(1)).unwrap(),
            PathMatcher::prefixes(["/api"]),
        );
        if authorization {
            config = config.with_authorization(AuthorizationConfig::new(SECRET).unwrap());
        }
        let gateway = Gateway::with_clock(config, Arc::new(clock.clone()), SweepPolicy::default());
        (gateway, clock)
    }

    fn request<'a>(path: &'a str, headers: &'a HeaderMap) -> GatewayRequest<'a> {
        GatewayRequest {
            path,
            headers,
            peer: Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10))),
        }
    }

    #[test]
    fn test_rate_limit_only_on_matching_paths() {
        let (gateway, _clock) = gateway(1, false);
        let headers = HeaderMap::new();

        assert_eq!(
            gateway.admit(request("/api/x", &headers)),
            GatewayDecision::Forward { claims: None }
        );
        assert!(matches!(
            gateway.admit(request("/api/x", &headers)),
            GatewayDecision::RateLimited(status) if status.remaining == 0 && status.limit == 1
        ));
        for _ in 0..5 {
            assert_eq!(
                gateway.admit(request("/health", &headers)),
                GatewayDecision::Forward { claims: None }
            );
        }
        assert_eq!(gateway.limiter().len(), 1);
    }

    #[test]
    fn test_window_reset_admits_again() {
        let (gateway, clock) = gateway(1, false);
        let headers = HeaderMap::new();

        assert!(matches!(
            gateway.admit(request("/api", &headers)),
            GatewayDecision::Forward { .. }
        ));
        assert!(matches!(
            gateway.admit(request("/api", &headers)),
            GatewayDecision::RateLimited(_)
        ));
        clock.advance(TimeDelta::milliseconds(1000));
        assert!(matches!(
            gateway.admit(request("/api", &headers)),
            GatewayDecision::Forward { .. }
        ));
    }

    #[test]
    fn test_rate_limit_checked_before_authorization() {
        let clock = ManualClock::at_epoch();
        let mut authorization = AuthorizationConfig::new(SECRET).unwrap();
        authorization.protected_paths = PathMatcher::all();
        let config = GatewayConfig::new(
            RateLimitConfig::new(1, Duration::from_secs(1)).unwrap(),
            PathMatcher::all(),
        )
        .with_authorization(authorization);
        let gateway = Gateway::with_clock(config, Arc::new(clock), SweepPolicy::Never);
        let headers = HeaderMap::new();

        assert!(matches!(
            gateway.admit(request("/admin", &headers)),
            GatewayDecision::Redirect(_)
        ));
        assert!(matches!(
            gateway.admit(request("/admin", &headers)),
            GatewayDecision::RateLimited(_)
        ));
    }

    #[test]
    fn test_authorization_redirect_and_claims() {
        let (gateway, _clock) = gateway(10, true);

        assert_eq!(
            gateway.admit(request("/dashboard", &HeaderMap::new())),
            GatewayDecision::Redirect("/login?from=%2Fdashboard".to_string())
        );

        let token = sign_token(SECRET, "alice", "admin", 600);
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        match gateway.admit(request("/dashboard", &headers)) {
            GatewayDecision::Forward { claims: Some(claims) } => assert_eq!(claims.sub, "alice"),
            other => panic!("Expected forward with claims, got {other:?}"),
        }
    }

    #[test]
    fn test_clients_without_address_share_bucket() {
        let (gateway, _clock) = gateway(1, false);
        let headers = HeaderMap::new();
        let anonymous = GatewayRequest {
            path: "/api",
            headers: &headers,
            peer: None,
        };

        assert!(matches!(gateway.admit(anonymous), GatewayDecision::Forward { .. }));
        assert!(matches!(gateway.admit(anonymous), GatewayDecision::RateLimited(_)));
        assert!(gateway.limiter().entry("unknown").is_some());
    }

    #[test]
    fn test_forwarded_client_only_counted_behind_trusted_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));
        let config = || {
            GatewayConfig::new(
                RateLimitConfig::new(5, Duration::from_secs(1)).unwrap(),
                PathMatcher::prefixes(["/api"]),
            )
        };

        let direct = Gateway::with_clock(
            config(),
            Arc::new(ManualClock::at_epoch()),
            SweepPolicy::Never,
        );
        direct.admit(request("/api", &headers));
        assert!(direct.limiter().entry("192.0.2.10").is_some());
        assert!(direct.limiter().entry("203.0.113.9").is_none());

        let proxied = Gateway::with_clock(
            config().with_trusted_proxy(),
            Arc::new(ManualClock::at_epoch()),
            SweepPolicy::Never,
        );
        proxied.admit(request("/api", &headers));
        assert!(proxied.limiter().entry("203.0.113.9").is_some());
        assert!(proxied.limiter().entry("192.0.2.10").is_none());
    }
}
