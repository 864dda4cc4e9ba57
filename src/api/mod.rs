//! API layer - HTTP handlers and routing
//!
//! - Auth endpoints (session check, login, register, logout)
//! - Blog endpoints (list, read, create, update, delete)
//! - Result envelopes and shared middleware

pub mod auth;
pub mod blogs;
pub mod common;
pub mod middleware;
pub mod results;

#[cfg(test)]
mod tests;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};

/// Build the route table
pub fn build_api_router(state: AppState) -> Router<AppState> {
    let protected_routes = blogs::protected_router().route_layer(
        axum_middleware::from_fn_with_state(state, middleware::require_auth),
    );

    Router::new()
        .merge(auth::router())
        .merge(blogs::public_router())
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;

    // Cookie auth needs credentials allowed
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Ok(build_api_router(state.clone())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
