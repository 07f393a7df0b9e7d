//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use krishop_core::{Email, UserId, Username};

/// A registered marketplace user (domain type).
///
/// The password hash is deliberately absent; it only travels through
/// `UserRepository::get_password_hash`.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique display name.
    pub username: Username,
    /// Unique email address, used to log in.
    pub email: Email,
    /// Profile image filename, if one was ever set.
    pub image_file: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The image suffix appended to the placeholder path on the account page.
    #[must_use]
    pub fn image_file_or_empty(&self) -> &str {
        self.image_file.as_deref().unwrap_or_default()
    }
}
