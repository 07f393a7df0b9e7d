//! Listing service.
//!
//! Reads are public; deletion and the update form are limited to the owner.

use thiserror::Error;

use krishop_core::{ItemId, UserId};

use crate::db::{ItemRepository, NewItem, RepositoryError};
use crate::models::Item;

/// Errors that can occur during listing operations.
#[derive(Debug, Error)]
pub enum ListingError {
    /// No listing with this ID.
    #[error("listing not found")]
    NotFound,

    /// The acting user does not own the listing.
    #[error("listing belongs to another user")]
    Forbidden,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Listing service.
pub struct ListingService<'a> {
    items: &'a dyn ItemRepository,
}

impl<'a> ListingService<'a> {
    /// Create a new listing service.
    #[must_use]
    pub const fn new(items: &'a dyn ItemRepository) -> Self {
        Self { items }
    }

    /// All listings, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::Repository` if the store fails.
    pub async fn list_all(&self) -> Result<Vec<Item>, ListingError> {
        Ok(self.items.list().await?)
    }

    /// Post a new listing owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::Repository` if the store fails.
    pub async fn create(&self, owner: UserId, item: NewItem) -> Result<Item, ListingError> {
        Ok(self.items.create(owner, item).await?)
    }

    /// Get a listing by ID.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::NotFound` if no such listing exists.
    pub async fn get(&self, id: ItemId) -> Result<Item, ListingError> {
        self.items.get(id).await?.ok_or(ListingError::NotFound)
    }

    /// Get a listing the acting user owns.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::NotFound` first, then `ListingError::Forbidden`
    /// if the listing belongs to someone else.
    pub async fn get_owned(&self, id: ItemId, user: UserId) -> Result<Item, ListingError> {
        let item = self.get(id).await?;
        if !item.is_owned_by(user) {
            return Err(ListingError::Forbidden);
        }
        Ok(item)
    }

    /// Delete a listing the acting user owns, returning what was removed.
    ///
    /// # Errors
    ///
    /// Same as [`ListingService::get_owned`]. A listing that vanishes between
    /// the check and the delete is reported as `NotFound`.
    pub async fn delete_owned(&self, id: ItemId, user: UserId) -> Result<Item, ListingError> {
        let item = self.get_owned(id, user).await?;
        if !self.items.delete(id, user).await? {
            return Err(ListingError::NotFound);
        }
        Ok(item)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use krishop_core::{Email, Price, Username};

    use super::*;
    use crate::db::{MemoryRepository, NewUser, UserRepository};
    use crate::models::DEFAULT_ITEM_IMAGE;

    async fn seed_user(repo: &MemoryRepository, name: &str) -> UserId {
        UserRepository::create(
            repo,
            NewUser {
                username: Username::parse(name).unwrap(),
                email: Email::parse(&format!("{name}@example.com")).unwrap(),
                password_hash: "hash".to_owned(),
            },
        )
        .await
        .unwrap()
        .id
    }

    fn lamp() -> NewItem {
        NewItem {
            name: "Lamp".to_owned(),
            price: Price::parse("12.50").unwrap(),
            store: "Attic".to_owned(),
            image_file: DEFAULT_ITEM_IMAGE.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let repo = MemoryRepository::new();
        let listings = ListingService::new(&repo);
        assert!(matches!(
            listings.get(ItemId::new(42)).await,
            Err(ListingError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_carries_owner_username() {
        let repo = MemoryRepository::new();
        let owner = seed_user(&repo, "alice").await;
        let listings = ListingService::new(&repo);

        let item = listings.create(owner, lamp()).await.unwrap();
        assert_eq!(item.owner_username, "alice");
        assert_eq!(item.price.to_string(), "12.50");
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let repo = MemoryRepository::new();
        let alice = seed_user(&repo, "alice").await;
        let bob = seed_user(&repo, "bob").await;
        let listings = ListingService::new(&repo);
        let item = listings.create(alice, lamp()).await.unwrap();

        assert!(matches!(
            listings.get_owned(item.id, bob).await,
            Err(ListingError::Forbidden)
        ));
        assert!(matches!(
            listings.delete_owned(item.id, bob).await,
            Err(ListingError::Forbidden)
        ));
        assert!(listings.get(item.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_owner_delete_removes_listing() {
        let repo = MemoryRepository::new();
        let alice = seed_user(&repo, "alice").await;
        let listings = ListingService::new(&repo);
        let item = listings.create(alice, lamp()).await.unwrap();

        let deleted = listings.delete_owned(item.id, alice).await.unwrap();
        assert_eq!(deleted.id, item.id);
        assert!(matches!(
            listings.get(item.id).await,
            Err(ListingError::NotFound)
        ));
        assert!(listings.list_all().await.unwrap().is_empty());
    }
}
