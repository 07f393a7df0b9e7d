//! Session middleware configuration.
//!
//! Builds the tower-sessions layer over whichever store the storage backend
//! provides (`PostgresStore` or `MemoryStore`).

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "krishop_session";

/// Default session expiry in seconds (7 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Expiry for "remember me" logins in seconds (30 days of inactivity).
const REMEMBER_ME_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Create the session layer over `store`.
///
/// # Arguments
///
/// * `store` - Session store (the `tower_sessions.session` table must exist
///   when this is a `PostgresStore`)
/// * `config` - Web configuration (cookie `Secure` flag follows the base URL)
#[must_use]
pub fn create_session_layer<Store>(store: Store, config: &WebConfig) -> SessionManagerLayer<Store>
where
    Store: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Session lifetime chosen at login.
///
/// Remembered logins survive browser restarts for 30 days of inactivity;
/// others end with the browser session.
#[must_use]
pub const fn login_expiry(remember: bool) -> Expiry {
    if remember {
        Expiry::OnInactivity(tower_sessions::cookie::time::Duration::seconds(
            REMEMBER_ME_EXPIRY_SECONDS,
        ))
    } else {
        Expiry::OnSessionEnd
    }
}
