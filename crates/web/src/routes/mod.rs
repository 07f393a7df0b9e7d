//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Listing index
//! GET  /home                      - Listing index
//! GET  /about                     - About page
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (store ping)
//!
//! # Auth
//! GET  /register                  - Registration page
//! POST /register                  - Registration action (rate limited)
//! GET  /login                     - Login page
//! POST /login                     - Login action (rate limited)
//! GET  /logout                    - Logout action
//!
//! # Account (requires auth)
//! GET  /account                   - Profile page
//! POST /account                   - Update username/email
//!
//! # Listings
//! GET  /post/new                  - New listing form (requires auth)
//! POST /post/new                  - Create listing (requires auth)
//! GET  /post/new/{item_id}        - Listing detail
//! GET  /post/new/{item_id}/update - Update form (owner only)
//! POST /post/{item_id}/delete     - Delete listing (owner only)
//! ```

pub mod account;
pub mod auth;
pub mod home;
pub mod pages;
pub mod posts;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::{rate_limit::RateLimiterLayer, take_flashes};
use crate::models::{CurrentUser, Flash, session_keys};
use crate::state::AppState;

/// Data every page layout needs: who is logged in and pending notices.
#[derive(Debug, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub flashes: Vec<Flash>,
}

impl PageContext {
    /// Read the logged-in user and drain the queued flash notices.
    ///
    /// Call this when rendering, after any notices for this response were queued.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails.
    pub async fn build(session: &Session) -> Result<Self, AppError> {
        let user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await?;
        let flashes = take_flashes(session).await?;
        Ok(Self { user, flashes })
    }
}

/// Create the auth routes router.
///
/// When `limiter` is given it wraps only the POST handlers.
pub fn auth_routes(limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let (login, register) = match limiter {
        Some(layer) => (
            post(auth::login).layer(layer.clone()),
            post(auth::register).layer(layer),
        ),
        None => (post(auth::login), post(auth::register)),
    };

    Router::new()
        .route("/login", login.get(auth::login_page))
        .route("/register", register.get(auth::register_page))
        .route("/logout", get(auth::logout))
}

/// Create the listing routes router.
pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/new", get(posts::new_post_page).post(posts::new_post))
        .route("/new/{item_id}", get(posts::view_item))
        .route("/new/{item_id}/update", get(posts::update_item))
        .route("/{item_id}/delete", post(posts::delete_item))
}

/// Create all page routes.
pub fn routes(auth_limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/home", get(home::home))
        .route("/about", get(pages::about))
        .route("/account", get(account::account_page).post(account::update_account))
        .merge(auth_routes(auth_limiter))
        .nest("/post", post_routes())
}
