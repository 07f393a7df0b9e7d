//! Persistence for users and listings.
//!
//! Handlers and services talk to the [`UserRepository`] and
//! [`ItemRepository`] traits; two backends implement them:
//!
//! - [`users::PgUserRepository`] / [`items::PgItemRepository`] over a `PgPool`
//! - [`memory::MemoryRepository`] for tests and `KRISHOP_STORAGE=memory`
//!
//! ## Tables
//!
//! - `users` - Accounts (unique username and email)
//! - `items` - Listings, owned by a user
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p krishop-cli -- migrate
//! ```

pub mod items;
pub mod memory;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use krishop_core::{Email, ItemId, Price, UserId, Username};

use crate::models::{Item, User};

pub use items::PgItemRepository;
pub use memory::MemoryRepository;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is invalid or corrupted.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Record not found.
    #[error("not found")]
    NotFound,

    /// A unique field already holds this value. Carries the field name.
    #[error("conflict on {0}")]
    Conflict(String),
}

/// Data needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Data needed to insert a listing.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub price: Price,
    pub store: String,
    pub image_file: String,
}

/// Storage operations for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict("username" | "email")` when either
    /// value is already taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Get a user by ID.
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Get a user together with their password hash, for login.
    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Change a user's username and email, returning the stored row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user is gone and
    /// `RepositoryError::Conflict` if the new values collide with another user.
    async fn update_profile(
        &self,
        id: UserId,
        username: &Username,
        email: &Email,
    ) -> Result<User, RepositoryError>;

    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Storage operations for listings.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// All listings in insertion order.
    async fn list(&self) -> Result<Vec<Item>, RepositoryError>;

    /// Get a listing by ID.
    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError>;

    /// Insert a listing owned by `owner`.
    async fn create(&self, owner: UserId, item: NewItem) -> Result<Item, RepositoryError>;

    /// Delete a listing if `owner` owns it. Returns whether a row was removed.
    async fn delete(&self, id: ItemId, owner: UserId) -> Result<bool, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to `Conflict` naming the field.
pub(crate) fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let field = match db_err.constraint() {
            Some(c) if c.contains("email") => "email",
            _ => "username",
        };
        return RepositoryError::Conflict(field.to_owned());
    }
    RepositoryError::Database(e)
}
