use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub(crate) struct Ports {
    pub(crate) http: u16,
    pub(crate) https: u16,
}

impl Ports {
    /// `HTTP_PORT` and `HTTPS_PORT`, defaulting to 3001 and 3443
    pub(crate) fn from_env() -> Self {
        let port = |name: &str, default: u16| {
            parse_port(name, std::env::var(name).ok().as_deref(), default)
        };
        Self {
            http: port("HTTP_PORT", 3001),
            https: port("HTTPS_PORT", 3443),
        }
    }
}

fn parse_port(name: &str, raw: Option<&str>, default: u16) -> u16 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(port) => port,
        Err(_) => {
            tracing::warn!("Invalid {}: {}. Using default '{}'", name, raw, default);
            default
        }
    }
}

/// PEM files for the HTTPS listener, from `TLS_CERT_PATH` and `TLS_KEY_PATH`
pub(crate) struct TlsPaths {
    pub(crate) cert: String,
    pub(crate) key: String,
}

impl TlsPaths {
    pub(crate) fn from_env() -> Option<Self> {
        match (std::env::var("TLS_CERT_PATH"), std::env::var("TLS_KEY_PATH")) {
            (Ok(cert), Ok(key)) => Some(Self { cert, key }),
            _ => None,
        }
    }
}

pub(crate) fn spawn_http_server(port: u16, app: Router) -> JoinHandle<std::io::Result<()>> {
    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        tracing::info!("HTTP server listening on {}", addr);
        axum_server::bind(addr)
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
    })
}

pub(crate) async fn spawn_https_server(
    port: u16,
    app: Router,
    tls: &TlsPaths,
) -> std::io::Result<JoinHandle<std::io::Result<()>>> {
    let config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("HTTPS server listening on {}", addr);
    Ok(tokio::spawn(async move {
        axum_server::bind_rustls(addr, config)
            .serve(app.into_make_service_with_connect_info::<SocketAddr>())
            .await
    }))
}

pub(crate) fn init_tracing(app_name: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        #[cfg(debug_assertions)]
        {
            format!(
                "biometric_gateway_axum=debug,biometric_gateway=debug,{}=debug,info",
                app_name
            )
            .into()
        }

        #[cfg(not(debug_assertions))]
        {
            "info".into()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    #[cfg(debug_assertions)]
    tracing::info!("Debug build: gateway and ceremony logs at DEBUG by default");
    tracing::info!("Set RUST_LOG to change verbosity, e.g. RUST_LOG=biometric_gateway=trace");
}
