//! biometric_gateway_axum - axum bindings for biometric-gateway
//!
//! - [`with_gateway`] / [`gateway_middleware`] put the admission pipeline in
//!   front of an application's routes.
//! - [`AuthClaims`] hands the verified token claims to handlers.
//! - [`ceremony_router`] serves the ceremony capability endpoint.

mod claims;
mod middleware;
mod router;

pub use claims::AuthClaims;
pub use middleware::{gateway_middleware, with_gateway};
pub use router::{ceremony_router, ceremony_router_no_trace};

pub use biometric_gateway::{CeremonyEngine, Gateway, GatewayConfig};
