//! Helpers shared by the unit tests of this crate

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{EncodingKey, Header};

use crate::gateway::Claims;

/// Runs `test` with `key` set to `value` (or removed for `None`), restoring the
/// previous value afterwards. Callers must be `#[serial]`.
pub(crate) fn with_env_var<F, R>(key: &str, value: Option<&str>, test: F) -> R
where
    F: FnOnce() -> R,
{
    let original = env::var(key).ok();

    match value {
        Some(val) => unsafe { env::set_var(key, val) },
        None => unsafe { env::remove_var(key) },
    }

    let result = test();

    match original {
        Some(val) => unsafe { env::set_var(key, val) },
        None => unsafe { env::remove_var(key) },
    }

    result
}

/// HS256 token expiring `ttl_secs` from now (negative for an expired token)
pub(crate) fn sign_token(secret: &[u8], sub: &str, role: &str, ttl_secs: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let claims = Claims {
        sub: sub.to_string(),
        role: role.to_string(),
        exp: (now + ttl_secs) as u64,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}
