use std::net::IpAddr;

use http::HeaderMap;

/// Bucket shared by every client whose address cannot be determined
pub const UNKNOWN_CLIENT: &str = "unknown";

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Best-effort client identifier for rate limiting.
///
/// With `trust_proxy_headers` set, uses the first hop of `X-Forwarded-For`,
/// then `X-Real-IP`, then the socket peer. Otherwise only the socket peer is
/// used, since any client can send those headers on a direct connection.
/// Requests with no usable address share the `"unknown"` bucket.
pub fn client_identifier(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trust_proxy_headers: bool,
) -> String {
    if trust_proxy_headers {
        if let Some(ip) = proxy_reported_client(headers) {
            return ip;
        }
    }

    match peer {
        Some(ip) => ip.to_string(),
        None => {
            tracing::debug!("No client address available, using shared bucket");
            UNKNOWN_CLIENT.to_string()
        }
    }
}

fn proxy_reported_client(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    headers
        .get(X_REAL_IP)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
