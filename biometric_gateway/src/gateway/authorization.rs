use headers::authorization::Bearer;
use headers::{Authorization, Cookie, HeaderMapExt};
use http::HeaderMap;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::matcher::PathMatcher;
use crate::config::{ConfigError, env_flag, env_list};

const DEFAULT_AUTH_COOKIE: &str = "token";
const DEFAULT_LOGIN_URL: &str = "/login";
const DEFAULT_ALLOWED_ROLE: &str = "admin";
const DEFAULT_PROTECTED_PREFIXES: [&str; 2] = ["/dashboard", "/admin"];

/// Claims carried by the bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("No bearer token in cookie or Authorization header")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Role '{0}' is not allowed")]
    RoleNotAllowed(String),
}

impl From<jsonwebtoken::errors::Error> for AuthorizationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidToken(err.to_string())
    }
}

/// Settings of the token checking stage
#[derive(Clone)]
pub struct AuthorizationConfig {
    secret: Vec<u8>,
    pub cookie_name: String,
    pub allowed_roles: Vec<String>,
    pub protected_paths: PathMatcher,
    pub login_url: String,
}

impl AuthorizationConfig {
    /// HS256 secret, defaults for everything else
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::invalid("GATEWAY_JWT_SECRET", "must not be empty"));
        }
        Ok(Self {
            secret,
            cookie_name: DEFAULT_AUTH_COOKIE.to_string(),
            allowed_roles: vec![DEFAULT_ALLOWED_ROLE.to_string()],
            protected_paths: PathMatcher::prefixes(DEFAULT_PROTECTED_PREFIXES),
            login_url: DEFAULT_LOGIN_URL.to_string(),
        })
    }

    /// `None` unless `GATEWAY_AUTHORIZATION` is switched on, in which case
    /// `GATEWAY_JWT_SECRET` is required
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        if !env_flag("GATEWAY_AUTHORIZATION", false) {
            return Ok(None);
        }

        let secret = std::env::var("GATEWAY_JWT_SECRET")
            .map_err(|_| ConfigError::Missing("GATEWAY_JWT_SECRET".to_string()))?;
        let mut config = Self::new(secret)?;

        if let Ok(cookie_name) = std::env::var("GATEWAY_AUTH_COOKIE") {
            config.cookie_name = cookie_name;
        }
        if let Some(roles) = env_list("GATEWAY_ALLOWED_ROLES") {
            config.allowed_roles = roles;
        }
        if let Some(prefixes) = env_list("GATEWAY_PROTECTED_PREFIXES") {
            config.protected_paths = PathMatcher::prefixes(prefixes);
        }
        if let Ok(login_url) = std::env::var("GATEWAY_LOGIN_URL") {
            config.login_url = login_url;
        }

        Ok(Some(config))
    }
}

impl std::fmt::Debug for AuthorizationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationConfig")
            .field("secret", &"[redacted]")
            .field("cookie_name", &self.cookie_name)
            .field("allowed_roles", &self.allowed_roles)
            .field("protected_paths", &self.protected_paths)
            .field("login_url", &self.login_url)
            .finish()
    }
}

/// Checks the bearer token and role claim on protected paths
pub struct JwtAuthorizer {
    config: AuthorizationConfig,
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthorizer {
    pub fn new(config: AuthorizationConfig) -> Self {
        let key = DecodingKey::from_secret(&config.secret);
        Self {
            config,
            key,
            validation: Validation::new(Algorithm::HS256),
        }
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<Claims, AuthorizationError> {
        let token = self.extract_token(headers)?;
        let claims = jsonwebtoken::decode::<Claims>(&token, &self.key, &self.validation)?.claims;

        if !self.config.allowed_roles.iter().any(|r| *r == claims.role) {
            return Err(AuthorizationError::RoleNotAllowed(claims.role));
        }
        Ok(claims)
    }

    /// Cookie first, then `Authorization: Bearer`
    fn extract_token(&self, headers: &HeaderMap) -> Result<String, AuthorizationError> {
        if let Some(cookies) = headers.typed_get::<Cookie>() {
            if let Some(token) = cookies.get(&self.config.cookie_name) {
                if !token.is_empty() {
                    return Ok(token.to_string());
                }
            }
        }
        headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_string())
            .ok_or(AuthorizationError::MissingToken)
    }

    /// Whether `path` is the login page itself, which is never protected
    fn is_login_path(&self, path: &str) -> bool {
        let login_url = self.config.login_url.as_str();
        if login_url.starts_with('/') {
            let login_path = login_url.split(['?', '#']).next().unwrap_or(login_url);
            return path == login_path;
        }
        url::Url::parse(login_url)
            .map(|url| url.path() == path)
            .unwrap_or(false)
    }

    fn login_redirect(&self, path: &str) -> String {
        let separator = if self.config.login_url.contains('?') {
            '&'
        } else {
            '?'
        };
        format!(
            "{}{}from={}",
            self.config.login_url,
            separator,
            urlencoding::encode(path)
        )
    }
}

/// Outcome of the authorization stage for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    /// Path is not protected, or the stage is disabled
    Public,
    Authorized(Claims),
    /// Send the client to the login surface
    Denied {
        location: String,
        reason: AuthorizationError,
    },
}

/// Authorization step of the gateway pipeline, toggled independently of rate
/// limiting and header injection
pub enum AuthorizationStage {
    NoOp,
    Jwt(JwtAuthorizer),
}

impl AuthorizationStage {
    pub fn from_config(config: Option<AuthorizationConfig>) -> Self {
        match config {
            Some(config) => Self::Jwt(JwtAuthorizer::new(config)),
            None => Self::NoOp,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Jwt(_))
    }

    pub fn evaluate(&self, path: &str, headers: &HeaderMap) -> AuthorizationOutcome {
        let authorizer = match self {
            Self::NoOp => return AuthorizationOutcome::Public,
            Self::Jwt(authorizer) => authorizer,
        };
        if !authorizer.config.protected_paths.matches(path) || authorizer.is_login_path(path) {
            return AuthorizationOutcome::Public;
        }

        match authorizer.authorize(headers) {
            Ok(claims) => {
                tracing::debug!("Authorized {} as {}", claims.sub, claims.role);
                AuthorizationOutcome::Authorized(claims)
            }
            Err(reason) => {
                tracing::warn!("Denied access to {}: {}", path, reason);
                AuthorizationOutcome::Denied {
                    location: authorizer.login_redirect(path),
                    reason,
                }
            }
        }
    }
}
