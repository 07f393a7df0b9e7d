//! Krishop marketplace web application.
//!
//! This crate provides the whole site as a library so the binary, the CLI
//! and the tests share one router and one set of services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, http::Request, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::state::AppState;

/// Build the application router.
///
/// Sentry layers are not included; `main` adds them around the result.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `session_store` - Where session records live
pub fn app<Store>(state: AppState, session_store: Store) -> Router
where
    Store: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(session_store, state.config());
    let auth_limiter = state
        .config()
        .auth_rate_limit
        .then(middleware::auth_rate_limiter);

    Router::new()
        .route("/health", get(routes::pages::health))
        .route("/health/ready", get(routes::pages::readiness))
        .merge(routes::routes(auth_limiter))
        .nest_service("/static", ServeDir::new(&state.config().static_dir))
        .layer(axum::middleware::from_fn(middleware::error_page_middleware))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<axum::body::Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
