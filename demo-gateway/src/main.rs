use std::sync::Arc;

use axum::Router;

use biometric_gateway::{FacialConfig, HeadlessPlatform, PasskeyConfig};
use biometric_gateway_axum::{
    CeremonyEngine, Gateway, GatewayConfig, ceremony_router, with_gateway,
};

mod handlers;
mod server;

use crate::server::{Ports, TlsPaths, init_tracing, spawn_http_server, spawn_https_server};

fn build_engine() -> Result<CeremonyEngine, Box<dyn std::error::Error>> {
    // No biometric hardware is reachable from a server process; every ceremony
    // resolves to a NotSupported failure.
    let platform = Arc::new(HeadlessPlatform);
    Ok(CeremonyEngine::from_platform(
        PasskeyConfig::from_env()?,
        FacialConfig::from_env()?,
        platform.clone(),
        platform.clone(),
        platform,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing(env!("CARGO_CRATE_NAME"));

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::warn!("A rustls CryptoProvider was already installed");
    }

    let engine = Arc::new(build_engine()?);
    let gateway = Arc::new(Gateway::new(GatewayConfig::from_env()?));

    let app = Router::new()
        .merge(handlers::router())
        .nest(handlers::AUTH_ROUTE_PREFIX, ceremony_router(engine));
    let app = with_gateway(app, gateway);

    let ports = Ports::from_env();
    let http_server = spawn_http_server(ports.http, app.clone());

    match TlsPaths::from_env() {
        Some(tls) => {
            let https_server = spawn_https_server(ports.https, app, &tls).await?;
            let (http, https) = tokio::try_join!(http_server, https_server)?;
            http?;
            https?;
        }
        None => {
            tracing::info!("TLS_CERT_PATH/TLS_KEY_PATH not set, serving HTTP only");
            http_server.await??;
        }
    }

    Ok(())
}
