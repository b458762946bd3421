use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{StatusCode, request::Parts},
};

use biometric_gateway::Claims;

/// Token claims verified by the gateway's authorization stage.
///
/// Present only on protected paths when the stage is enabled. Extract
/// `Option<AuthClaims>` on routes that may be reached anonymously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthClaims(pub Claims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthClaims>().cloned().ok_or_else(|| {
            tracing::debug!("No verified claims on request to {}", parts.uri.path());
            (StatusCode::UNAUTHORIZED, "Unauthorized")
        })
    }
}

impl<S> OptionalFromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthClaims>().cloned())
    }
}
