//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::forms::{FormErrors, UpdateAccountForm};
use crate::middleware::{RequireAuth, clear_current_user, push_flash, set_current_user};
use crate::models::{CurrentUser, Flash, User};
use crate::routes::PageContext;
use crate::routes::auth::{EMAIL_TAKEN, USERNAME_TAKEN};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Path prefix the stored image filename is appended to.
const PROFILE_IMAGE_PREFIX: &str = "/static/image-placeholder.png";

/// Flash shown after the account is saved.
pub const ACCOUNT_UPDATED: &str = "your account has been updated!";

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub ctx: PageContext,
    pub title: &'static str,
    pub image_file: String,
    pub form: UpdateAccountForm,
    pub errors: FormErrors,
}

/// Profile image URL as the account page has always built it: the stored
/// filename is concatenated onto the placeholder path.
// TODO: serve the stored filename on its own once profile uploads exist.
#[must_use]
pub fn profile_image_url(user: &User) -> String {
    format!("{PROFILE_IMAGE_PREFIX}{}", user.image_file_or_empty())
}

async fn render_account(
    session: &Session,
    user: &User,
    form: UpdateAccountForm,
    errors: FormErrors,
) -> Result<Response> {
    Ok(AccountTemplate {
        ctx: PageContext::build(session).await?,
        title: "Account",
        image_file: profile_image_url(user),
        form,
        errors,
    }
    .into_response())
}

/// Load the stored user behind the session, logging out stale sessions.
async fn load_user(
    state: &AppState,
    session: &Session,
    current: &CurrentUser,
) -> Result<Option<User>> {
    match AuthService::new(state.users()).get_user(current.id).await {
        Ok(user) => Ok(Some(user)),
        Err(AuthError::UserNotFound) => {
            tracing::warn!(user_id = %current.id, "Session refers to a missing user");
            clear_current_user(session).await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Display the account page, pre-filled with the stored username and email.
///
/// # Errors
///
/// Returns an error if the store or the session fails.
#[instrument(skip_all)]
pub async fn account_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Response> {
    let Some(user) = load_user(&state, &session, &current).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let form = UpdateAccountForm {
        username: user.username.to_string(),
        email: user.email.to_string(),
    };
    render_account(&session, &user, form, FormErrors::new()).await
}

/// Handle the account update form.
///
/// # Errors
///
/// Returns an error if the store or the session fails. Validation failures
/// and taken usernames/emails re-render the form instead.
#[instrument(skip_all)]
pub async fn update_account(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Form(form): Form<UpdateAccountForm>,
) -> Result<Response> {
    let Some(user) = load_user(&state, &session, &current).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let (username, email) = match form.validate() {
        Ok(values) => values,
        Err(errors) => return render_account(&session, &user, form.trimmed(), errors).await,
    };

    let auth = AuthService::new(state.users());
    match auth.update_account(user.id, &username, &email).await {
        Ok(updated) => {
            set_current_user(&session, &CurrentUser::from(&updated)).await?;
            tracing::info!(user_id = %updated.id, "Account updated");
            push_flash(&session, Flash::success(ACCOUNT_UPDATED)).await?;
            Ok(Redirect::to("/account").into_response())
        }
        Err(AuthError::UsernameTaken) => {
            let mut errors = FormErrors::new();
            errors.add("username", USERNAME_TAKEN);
            render_account(&session, &user, form.trimmed(), errors).await
        }
        Err(AuthError::EmailTaken) => {
            let mut errors = FormErrors::new();
            errors.add("email", EMAIL_TAKEN);
            render_account(&session, &user, form.trimmed(), errors).await
        }
        Err(e) => Err(e.into()),
    }
}
