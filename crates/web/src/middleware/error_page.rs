//! Error pages with the logged-in user's navigation.

use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::Session;

use crate::error::ErrorPage;
use crate::models::{CurrentUser, session_keys};
use crate::routes::PageContext;

/// Re-render error pages for logged-in users.
///
/// `AppError` has no session to read while converting into a response, so its
/// page always shows the logged-out navigation. Must run inside the session
/// layer. Queued flashes are left for the next page.
pub async fn error_page_middleware(session: Session, request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let Some(page) = response.extensions().get::<ErrorPage>().copied() else {
        return response;
    };

    match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(Some(user)) => page.render(PageContext {
            user: Some(user),
            flashes: Vec::new(),
        }),
        Ok(None) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read session for error page");
            response
        }
    }
}
