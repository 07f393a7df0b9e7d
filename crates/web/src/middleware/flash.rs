//! One-shot notices carried in the session until the next rendered page.

use tower_sessions::Session;

use crate::models::{Flash, session_keys};

/// Queue a notice for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or modified.
pub async fn push_flash(
    session: &Session,
    flash: Flash,
) -> Result<(), tower_sessions::session::Error> {
    let mut flashes: Vec<Flash> = session
        .get(session_keys::FLASHES)
        .await?
        .unwrap_or_default();
    flashes.push(flash);
    session.insert(session_keys::FLASHES, flashes).await
}

/// Drain queued notices.
///
/// Sessions without notices are left unmodified, so rendering a page does
/// not by itself create or rewrite a session record.
///
/// # Errors
///
/// Returns an error if the session cannot be read or modified.
pub async fn take_flashes(session: &Session) -> Result<Vec<Flash>, tower_sessions::session::Error> {
    match session.get::<Vec<Flash>>(session_keys::FLASHES).await? {
        Some(flashes) => {
            session
                .remove::<Vec<Flash>>(session_keys::FLASHES)
                .await?;
            Ok(flashes)
        }
        None => Ok(Vec::new()),
    }
}
