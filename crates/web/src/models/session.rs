//! Session-related types.
//!
//! Types stored in the session for authentication state and notices.

use std::fmt;

use serde::{Deserialize, Serialize};

use krishop_core::{Email, UserId};

use super::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's display name.
    pub username: String,
    /// User's email address.
    pub email: Email,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.as_str().to_owned(),
            email: user.email.clone(),
        }
    }
}

/// Severity of a flash notice, used as a CSS class suffix.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Danger,
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Danger => "danger",
        })
    }
}

/// A one-shot notice shown on the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for queued flash notices.
    pub const FLASHES: &str = "_flashes";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_level_css_suffix() {
        assert_eq!(FlashLevel::Success.to_string(), "success");
        assert_eq!(FlashLevel::Danger.to_string(), "danger");
    }

    #[test]
    fn test_current_user_session_roundtrip() {
        let user = CurrentUser {
            id: UserId::new(3),
            username: "kri".to_owned(),
            email: Email::parse("kri@example.com").unwrap(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["id"], 3);
        let back: CurrentUser = serde_json::from_value(value).unwrap();
        assert_eq!(back, user);
    }
}
