//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. Handlers return `Result<T, AppError>`;
//! every error becomes an HTML page rendered from `error.html`. The page is
//! rendered logged-out here; `middleware::error_page_middleware` re-renders it
//! for logged-in users.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::filters;
use crate::routes::PageContext;
use crate::services::{AuthError, ListingError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Listing operation failed.
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_)
            | Self::Listing(ListingError::NotFound)
            | Self::Auth(AuthError::UserNotFound) => StatusCode::NOT_FOUND,
            Self::Listing(ListingError::Forbidden) => StatusCode::FORBIDDEN,
            Self::Auth(AuthError::WeakPassword(_) | AuthError::InvalidEmail(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::UsernameTaken | AuthError::EmailTaken) => StatusCode::CONFLICT,
            Self::Repository(_)
            | Self::Session(_)
            | Self::Listing(ListingError::Repository(_))
            | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    ctx: PageContext,
    title: String,
    heading: &'static str,
    message: &'static str,
}

/// What an error page shows for a status.
///
/// Left on the response as an extension so the page can be re-rendered once
/// the session user is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPage {
    pub status: StatusCode,
    heading: &'static str,
    message: &'static str,
}

impl ErrorPage {
    /// Generic page text for `status`; internal details never reach the client.
    #[must_use]
    pub fn for_status(status: StatusCode) -> Self {
        let (heading, message) = match status.as_u16() {
            404 => (
                "Oops. Page Not Found (404)",
                "That page does not exist. Please try a different location.",
            ),
            403 => (
                "You don't have permission to do that (403)",
                "Please check your account and try again.",
            ),
            400 | 401 | 409 => (
                "Bad Request",
                "The request could not be processed. Please go back and try again.",
            ),
            _ => (
                "Something went wrong (500)",
                "We're experiencing some trouble on our end. Please try again in a moment.",
            ),
        };
        Self {
            status,
            heading,
            message,
        }
    }

    /// Render the page inside the site layout described by `ctx`.
    #[must_use]
    pub fn render(self, ctx: PageContext) -> Response {
        let page = ErrorTemplate {
            ctx,
            title: self
                .status
                .canonical_reason()
                .unwrap_or("Error")
                .to_owned(),
            heading: self.heading,
            message: self.message,
        };

        let mut response = match page.render() {
            Ok(body) => (self.status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                (self.status, self.heading).into_response()
            }
        };
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        ErrorPage::for_status(status).render(PageContext::default())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("listing", "Listing posted", Some(&[("item_id", "7")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::CurrentUser;
    use krishop_core::{Email, UserId};

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("item 12".to_string());
        assert_eq!(err.to_string(), "Not found: item 12");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AuthError::UsernameTaken.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::PasswordHash.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_listing_errors_map_to_client_statuses() {
        assert_eq!(
            get_status(ListingError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ListingError::Forbidden.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(ListingError::Repository(RepositoryError::NotFound).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_page_hides_internal_details() {
        let err = AppError::Repository(RepositoryError::DataCorruption(
            "connection refused at 10.0.0.5".to_string(),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.extensions().get::<ErrorPage>(),
            Some(&ErrorPage::for_status(StatusCode::INTERNAL_SERVER_ERROR))
        );

        let body = body_text(response).await;
        assert!(body.contains("Something went wrong"));
        assert!(!body.contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_error_page_shows_logged_in_navigation() {
        let ctx = PageContext {
            user: Some(CurrentUser {
                id: UserId::new(1),
                username: "kri".to_owned(),
                email: Email::parse("kri@example.com").unwrap(),
            }),
            flashes: Vec::new(),
        };

        let body = body_text(ErrorPage::for_status(StatusCode::FORBIDDEN).render(ctx)).await;
        assert!(body.contains("Logout"));
        assert!(body.contains("(403)"));
    }
}
