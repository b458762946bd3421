use askama::Template;
use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::Html,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};

use biometric_gateway::Claims;
use biometric_gateway_axum::AuthClaims;

pub(crate) const AUTH_ROUTE_PREFIX: &str = "/api/auth";

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    auth_route_prefix: &'a str,
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate<'a> {
    from: &'a str,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate<'a> {
    claims: Option<&'a Claims>,
}

pub(super) fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/dashboard", get(dashboard))
        .route("/admin", get(dashboard))
        .route("/api/ping", get(ping))
}

async fn index() -> Result<Html<String>, (StatusCode, String)> {
    let template = IndexTemplate {
        auth_route_prefix: AUTH_ROUTE_PREFIX,
    };
    let html = Html(
        template
            .render()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
    );
    Ok(html)
}

#[derive(Debug, Deserialize)]
struct LoginQuery {
    from: Option<String>,
}

async fn login(Query(query): Query<LoginQuery>) -> Result<Html<String>, (StatusCode, String)> {
    let from = query.from.as_deref().unwrap_or("/");
    tracing::debug!("Login page requested, return path {}", from);
    let template = LoginTemplate { from };
    let html = Html(
        template
            .render()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
    );
    Ok(html)
}

async fn dashboard(claims: Option<AuthClaims>) -> Result<Html<String>, (StatusCode, String)> {
    let template = DashboardTemplate {
        claims: claims.as_ref().map(|AuthClaims(claims)| claims),
    };
    let html = Html(
        template
            .render()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
    );
    Ok(html)
}

async fn ping() -> Json<Value> {
    Json(json!({ "success": true, "message": "pong" }))
}
