//! Authentication route handlers.
//!
//! Handles registration, login and logout with local password accounts.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::forms::{FormErrors, LoginForm, RegistrationForm};
use crate::middleware::{OptionalAuth, login_expiry, push_flash, safe_next, set_current_user};
use crate::models::{CurrentUser, Flash};
use crate::routes::PageContext;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Shown inline when registration or an account update hits a taken username.
pub const USERNAME_TAKEN: &str = "That username is taken. Please choose a different one.";

/// Shown inline when registration or an account update hits a taken email.
pub const EMAIL_TAKEN: &str = "That email is taken. Please choose a different one.";

/// Flash shown after a successful registration.
pub const ACCOUNT_CREATED: &str = "Account created successfully!";

/// Flash shown for any failed login.
pub const LOGIN_FAILED: &str = "Login Unsuccessful. Please check username and password.";

// =============================================================================
// Query Types
// =============================================================================

/// Where to go after logging in.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub title: &'static str,
    pub form: RegistrationForm,
    pub errors: FormErrors,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub title: &'static str,
    pub form: LoginForm,
    pub errors: FormErrors,
}

async fn render_register(
    session: &Session,
    form: RegistrationForm,
    errors: FormErrors,
) -> Result<Response> {
    Ok(RegisterTemplate {
        ctx: PageContext::build(session).await?,
        title: "Register",
        form,
        errors,
    }
    .into_response())
}

async fn render_login(session: &Session, form: LoginForm, errors: FormErrors) -> Result<Response> {
    Ok(LoginTemplate {
        ctx: PageContext::build(session).await?,
        title: "Login",
        form,
        errors,
    }
    .into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
#[instrument(skip_all)]
pub async fn register_page(session: Session, OptionalAuth(user): OptionalAuth) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    render_register(&session, RegistrationForm::default(), FormErrors::new()).await
}

/// Handle registration form submission.
///
/// # Errors
///
/// Returns an error if the store or the session fails. Validation failures
/// and taken usernames/emails re-render the form instead.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<RegistrationForm>,
) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(errors) => return render_register(&session, form.without_passwords(), errors).await,
    };

    let auth = AuthService::new(state.users());
    match auth
        .register(
            registration.username,
            registration.email,
            &registration.password,
        )
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User registered");
            push_flash(&session, Flash::success(ACCOUNT_CREATED)).await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(AuthError::UsernameTaken) => {
            let mut errors = FormErrors::new();
            errors.add("username", USERNAME_TAKEN);
            render_register(&session, form.without_passwords(), errors).await
        }
        Err(AuthError::EmailTaken) => {
            let mut errors = FormErrors::new();
            errors.add("email", EMAIL_TAKEN);
            render_register(&session, form.without_passwords(), errors).await
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
#[instrument(skip_all)]
pub async fn login_page(session: Session, OptionalAuth(user): OptionalAuth) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    render_login(&session, LoginForm::default(), FormErrors::new()).await
}

/// Handle login form submission.
///
/// On success the session id is cycled before the user is stored in it.
///
/// # Errors
///
/// Returns an error if the store or the session fails. Bad credentials
/// re-render the form with a flash notice instead.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let echo = LoginForm {
        email: form.email.trim().to_owned(),
        password: String::new(),
        remember: form.remember.clone(),
    };

    let email = match form.validate() {
        Ok(email) => email,
        Err(errors) => return render_login(&session, echo, errors).await,
    };

    let auth = AuthService::new(state.users());
    match auth.login(email.as_str(), &form.password).await {
        Ok(user) => {
            session.cycle_id().await?;
            session.set_expiry(Some(login_expiry(form.remember())));
            set_current_user(&session, &CurrentUser::from(&user)).await?;
            set_sentry_user(&user.id, Some(user.email.as_str()));
            tracing::info!(user_id = %user.id, "User logged in");

            Ok(Redirect::to(safe_next(query.next.as_deref())).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login failed");
            push_flash(&session, Flash::danger(LOGIN_FAILED)).await?;
            render_login(&session, echo, FormErrors::new()).await
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Log out and return to the home page.
///
/// Works without a session too.
///
/// # Errors
///
/// Returns an error if the session store cannot delete the session.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Response> {
    session.flush().await?;
    clear_sentry_user();
    Ok(Redirect::to("/").into_response())
}
