use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

use biometric_gateway::{
    Gateway, GatewayDecision, GatewayRequest, RATE_LIMIT_MESSAGE, RateLimitStatus,
    apply_security_headers,
};

use super::claims::AuthClaims;

#[derive(Debug, Serialize)]
struct RejectionBody {
    success: bool,
    error: &'static str,
}

fn rate_limited_response(status: &RateLimitStatus) -> Response {
    let body = RejectionBody {
        success: false,
        error: RATE_LIMIT_MESSAGE,
    };
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response.headers_mut().extend(status.headers());
    response
}

/// Runs the admission pipeline in front of the wrapped routes.
///
/// Rejected requests get a 429 JSON body or a temporary redirect to the login
/// page; admitted requests carry their verified claims as [`AuthClaims`].
/// Every response, including rejections, leaves with the security headers.
///
/// The peer address is read from `ConnectInfo<SocketAddr>` when the server was
/// started with `into_make_service_with_connect_info`. Forwarding headers are
/// only consulted when the gateway was configured to trust a proxy.
pub async fn gateway_middleware(
    State(gateway): State<Arc<Gateway>>,
    mut req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let decision = gateway.admit(GatewayRequest {
        path: req.uri().path(),
        headers: req.headers(),
        peer,
    });

    let mut response = match decision {
        GatewayDecision::Forward { claims } => {
            if let Some(claims) = claims {
                req.extensions_mut().insert(AuthClaims(claims));
            }
            next.run(req).await
        }
        GatewayDecision::RateLimited(status) => rate_limited_response(&status),
        GatewayDecision::Redirect(location) => {
            tracing::debug!("Redirecting to {}", location);
            Redirect::temporary(&location).into_response()
        }
    };

    apply_security_headers(response.headers_mut());
    response
}

/// Wraps every route of `router`, fallback included, with [`gateway_middleware`]
pub fn with_gateway<S>(router: Router<S>, gateway: Arc<Gateway>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gateway, gateway_middleware))
}
