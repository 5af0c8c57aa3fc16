//! Single-account cookie auth for the API.

use std::collections::HashSet;
use std::sync::Mutex;

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use super::extract::ApiJson;
use super::{ApiError, AppState};

pub const AUTH_COOKIE: &str = "auth_token";

/// Seven days.
const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Configured credentials plus the tokens issued since startup.
pub struct AuthState {
    credentials: Option<Credentials>,
    tokens: Mutex<HashSet<String>>,
}

impl AuthState {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            credentials,
            tokens: Mutex::new(HashSet::new()),
        }
    }

    /// False when no credentials are configured and the API is open.
    pub fn enabled(&self) -> bool {
        self.credentials.is_some()
    }

    fn accepts(&self, username: &str, password: &str) -> bool {
        match &self.credentials {
            Some(c) => {
                digest(username) == digest(&c.username) && digest(password) == digest(&c.password)
            }
            None => true,
        }
    }

    fn issue(&self, username: &str) -> String {
        let token = digest(&format!(
            "{}:{}:{}",
            username,
            Uuid::new_v4(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        self.lock().insert(token.clone());
        token
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.lock().contains(token)
    }

    fn revoke(&self, token: &str) {
        self.lock().remove(token);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.tokens.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        if !self.enabled() {
            return true;
        }
        token_from_headers(headers).is_some_and(|token| self.is_valid(token))
    }
}

fn digest(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Pull the auth token out of the `Cookie` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

fn session_cookie(token: &str, max_age: u64) -> HeaderValue {
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        AUTH_COOKIE, token, max_age
    );
    // Token is hex and the rest is ASCII.
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub authenticated: bool,
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    if !state.auth.accepts(&body.username, &body.password) {
        warn!(username = %body.username, "Login rejected");
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let token = state.auth.issue(&body.username);
    info!(username = %body.username, "Login accepted");

    let mut response = Json(json!({ "success": true })).into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, session_cookie(&token, COOKIE_MAX_AGE_SECS));
    Ok(response)
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = token_from_headers(&headers) {
        state.auth.revoke(token);
    }

    let mut response = Json(json!({ "success": true })).into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, session_cookie("", 0));
    response
}

pub async fn check(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let authenticated = state.auth.is_authenticated(&headers);
    let status = if authenticated {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (status, Json(CheckResponse { authenticated })).into_response()
}

/// Rejects requests without a valid auth cookie when credentials are set.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.auth.is_authenticated(request.headers()) {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthenticated request");
    ApiError::unauthorized("Authentication required").into_response()
}
