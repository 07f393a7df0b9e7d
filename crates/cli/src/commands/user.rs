//! User management commands.
//!
//! Users created here go through the same validation and password hashing as
//! the registration form.

use krishop_web::db::{self, PgUserRepository};
use krishop_web::forms::RegistrationForm;
use krishop_web::services::{AuthError, AuthService};
use thiserror::Error;

use super::{CommandError, database_url};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Command(#[from] CommandError),

    /// One or more fields failed validation.
    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Build the form the web page would have posted and validate it.
fn registration_form(username: &str, email: &str, password: &str) -> RegistrationForm {
    RegistrationForm {
        username: username.to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
        confirm_password: password.to_owned(),
    }
}

/// Describe the failing fields in one line.
fn describe_errors(errors: &krishop_web::forms::FormErrors) -> String {
    ["username", "email", "password"]
        .iter()
        .filter_map(|field| errors.get(field).map(|msg| format!("{field}: {msg}")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Create a new user.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError::Invalid` for bad input, and an auth error if the
/// username or email is taken or the database fails.
pub async fn create(username: &str, email: &str, password: &str) -> Result<i32, UserError> {
    let registration = registration_form(username, email, password)
        .validate()
        .map_err(|errors| UserError::Invalid(describe_errors(&errors)))?;

    let url = database_url()?;
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&url)
        .await
        .map_err(CommandError::from)?;

    let users = PgUserRepository::new(pool);
    let user = AuthService::new(&users)
        .register(
            registration.username,
            registration.email,
            &registration.password,
        )
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Email: {}",
        user.id,
        user.username,
        user.email
    );

    Ok(user.id.as_i32())
}
