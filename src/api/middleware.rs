//! API middleware
//!
//! Contains:
//! - Shared application state
//! - The JSON error type for unexpected failures
//! - Session token extraction (cookie or Bearer header)
//! - Authentication middleware and the user extractors built on it

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;

use crate::api::results::Failure;
use crate::config::{AuthConfig, BlogConfig};
use crate::models::User;
use crate::services::{BlogService, UserService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub blog_service: Arc<BlogService>,
    pub auth: Arc<AuthConfig>,
    pub blog: Arc<BlogConfig>,
}

/// Error body for unexpected failures
///
/// Expected failures use the `Failure` envelope; this one is always a 500.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Log an unexpected error and hide its details from the client
    pub fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!("Request failed: {:#}", err);
        Self {
            error: ApiErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message: "Internal server error".to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

/// Extract the session token from request headers
///
/// A `Bearer` authorization header wins over the session cookie.
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_str) = cookie_header.to_str() else {
            continue;
        };
        for cookie in cookie_str.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                if name == cookie_name && !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// The current user, if the request carried a valid session
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(Failure::not_logged_in)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|u| u.0.clone()),
        ))
    }
}

async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<Option<User>, ApiError> {
    let Some(token) = extract_session_token(headers, &state.auth.cookie_name) else {
        return Ok(None);
    };

    state
        .user_service
        .validate_session(&token)
        .await
        .map_err(ApiError::internal)
}

/// Authentication middleware
///
/// Rejects the request with 401 unless it carries a live session.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<AuthenticatedUser>().is_some() {
        return next.run(request).await;
    }

    match resolve_user(&state, request.headers()).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(AuthenticatedUser(user));
            next.run(request).await
        }
        Ok(None) => Failure::not_logged_in().into_response(),
        Err(e) => e.into_response(),
    }
}

/// Optional authentication middleware
///
/// Attaches the user when the session is valid; never rejects.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_user(&state, request.headers()).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(AuthenticatedUser(user));
        }
        Ok(None) => {}
        Err(_) => {
            tracing::debug!("Continuing without a user after session lookup failed");
        }
    }
    next.run(request).await
}

// ============================================================================
// Tests
// ============================================================================
