//! Ceremony endpoints for the login surface

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use biometric_gateway::{
    Capabilities, CeremonyEngine, CeremonyResult, authenticate_or_register,
};

/// Router exposing the ceremony engine, with HTTP tracing.
///
/// Mount it under the auth prefix of the application, e.g. `/api/auth`:
/// - `GET {prefix}/capabilities` returns `{"fingerprint": bool, "facial": bool}`
/// - `POST {prefix}/fingerprint/register` registers a new platform credential
/// - `POST {prefix}/fingerprint/authenticate` authenticates, registering once on failure
/// - `POST {prefix}/facial/authenticate` runs the camera ceremony
///
/// Ceremony endpoints always answer 200 with a `CeremonyResult` body; the
/// outcome is in its `status` field.
pub fn ceremony_router(engine: Arc<CeremonyEngine>) -> Router {
    ceremony_router_no_trace(engine).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`ceremony_router`] without the tracing layer
pub fn ceremony_router_no_trace(engine: Arc<CeremonyEngine>) -> Router {
    Router::new()
        .route("/capabilities", get(capabilities))
        .route("/fingerprint/register", post(register_fingerprint))
        .route("/fingerprint/authenticate", post(authenticate_fingerprint))
        .route("/facial/authenticate", post(authenticate_facial))
        .with_state(engine)
}

async fn capabilities(State(engine): State<Arc<CeremonyEngine>>) -> Json<Capabilities> {
    Json(engine.capabilities().await)
}

async fn register_fingerprint(State(engine): State<Arc<CeremonyEngine>>) -> Json<CeremonyResult> {
    Json(engine.fingerprint().register().await)
}

async fn authenticate_fingerprint(
    State(engine): State<Arc<CeremonyEngine>>,
) -> Json<CeremonyResult> {
    Json(authenticate_or_register(engine.fingerprint()).await)
}

async fn authenticate_facial(State(engine): State<Arc<CeremonyEngine>>) -> Json<CeremonyResult> {
    Json(engine.facial().authenticate().await)
}
