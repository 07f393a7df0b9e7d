//! Authentication service.
//!
//! Provides password registration, login and profile updates.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use krishop_core::{Email, UserId, Username};

use crate::db::{NewUser, RepositoryError, UserRepository};
use crate::models::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles user registration, login, and account maintenance.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserRepository) -> Self {
        Self { users }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new user with username, email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UsernameTaken` / `AuthError::EmailTaken` if either
    /// value is already registered.
    pub async fn register(
        &self,
        username: Username,
        email: Email,
        password: &str,
    ) -> Result<User, AuthError> {
        // Validate password
        validate_password(password)?;

        // Hash password
        let password_hash = hash_password(password)?;

        // Create user
        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(map_conflict)?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // Validate email format
        let email = Email::parse(email)?;

        // Get user with password hash
        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Verify password
        verify_password(password, &password_hash)?;

        Ok(user)
    }

    // =========================================================================
    // Account Management
    // =========================================================================

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Change a user's username and email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user was removed, and
    /// `AuthError::UsernameTaken` / `AuthError::EmailTaken` on collisions.
    pub async fn update_account(
        &self,
        user_id: UserId,
        username: &Username,
        email: &Email,
    ) -> Result<User, AuthError> {
        self.users
            .update_profile(user_id, username, email)
            .await
            .map_err(map_conflict)
    }
}

fn map_conflict(e: RepositoryError) -> AuthError {
    match e {
        RepositoryError::Conflict(field) if field == "email" => AuthError::EmailTaken,
        RepositoryError::Conflict(_) => AuthError::UsernameTaken,
        RepositoryError::NotFound => AuthError::UserNotFound,
        other => AuthError::Repository(other),
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryRepository;

    fn username(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("battery staple", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_password("correct horse").unwrap();
        let b = hash_password("correct horse").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let repo = MemoryRepository::new();
        let auth = AuthService::new(&repo);

        let user = auth
            .register(username("kri"), email("kri@example.com"), "password123")
            .await
            .unwrap();
        let logged_in = auth.login("kri@example.com", "password123").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_login_unknown_email_and_wrong_password_look_alike() {
        let repo = MemoryRepository::new();
        let auth = AuthService::new(&repo);
        auth.register(username("kri"), email("kri@example.com"), "password123")
            .await
            .unwrap();

        assert!(matches!(
            auth.login("nobody@example.com", "password123").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("kri@example.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_reports_taken_fields() {
        let repo = MemoryRepository::new();
        let auth = AuthService::new(&repo);
        auth.register(username("kri"), email("kri@example.com"), "password123")
            .await
            .unwrap();

        assert!(matches!(
            auth.register(username("kri"), email("new@example.com"), "password123")
                .await,
            Err(AuthError::UsernameTaken)
        ));
        assert!(matches!(
            auth.register(username("new"), email("kri@example.com"), "password123")
                .await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_update_account_conflict() {
        let repo = MemoryRepository::new();
        let auth = AuthService::new(&repo);
        auth.register(username("kri"), email("kri@example.com"), "password123")
            .await
            .unwrap();
        let other = auth
            .register(username("shop"), email("shop@example.com"), "password123")
            .await
            .unwrap();

        let err = auth
            .update_account(other.id, &username("kri"), &other.email)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));

        let updated = auth
            .update_account(other.id, &username("shop2"), &email("shop2@example.com"))
            .await
            .unwrap();
        assert_eq!(updated.username.as_str(), "shop2");
        assert_eq!(updated.email.as_str(), "shop2@example.com");
    }
}
