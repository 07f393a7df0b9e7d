//! Listing domain type.

use chrono::{DateTime, Utc};

use krishop_core::{ItemId, Price, UserId};

/// Image filename used when a listing is posted without one.
pub const DEFAULT_ITEM_IMAGE: &str = "image-placeholder.png";

/// A product listing posted by a user.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    pub store: String,
    /// Placeholder image filename under `/static`.
    pub image_file: String,
    /// Owner of the listing.
    pub user_id: UserId,
    /// Owner's username at read time, for display.
    pub owner_username: String,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Whether `user` may update or delete this listing.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.user_id == user
    }
}
