//! In-process repository backing `KRISHOP_STORAGE=memory` and the tests.
//!
//! Mirrors the `PostgreSQL` schema: serial ids, unique username and email,
//! listings ordered by id, and deletes scoped to the owner.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use krishop_core::{Email, ItemId, UserId, Username};

use super::{ItemRepository, NewItem, NewUser, RepositoryError, UserRepository};
use crate::models::{Item, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, (User, String)>,
    items: BTreeMap<ItemId, Item>,
    next_user_id: i32,
    next_item_id: i32,
}

impl Tables {
    fn check_unique(
        &self,
        username: &Username,
        email: &Email,
        except: Option<UserId>,
    ) -> Result<(), RepositoryError> {
        for (user, _) in self.users.values() {
            if Some(user.id) == except {
                continue;
            }
            if &user.username == username {
                return Err(RepositoryError::Conflict("username".to_owned()));
            }
            if &user.email == email {
                return Err(RepositoryError::Conflict("email".to_owned()));
            }
        }
        Ok(())
    }
}

/// Both repositories over one shared set of tables.
///
/// Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.check_unique(&user.username, &user.email, None)?;

        tables.next_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: UserId::new(tables.next_user_id),
            username: user.username,
            email: user.email,
            image_file: None,
            created_at: now,
            updated_at: now,
        };
        tables
            .users
            .insert(created.id, (created.clone(), user.password_hash));
        Ok(created)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|(user, _)| &user.email == email)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: UserId,
        username: &Username,
        email: &Email,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.check_unique(username, email, Some(id))?;

        let (user, _) = tables.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.username = username.clone();
        user.email = email.clone();
        user.updated_at = Utc::now();
        let updated = user.clone();

        // Listings show the owner's current name, as the SQL join does.
        for item in tables.items.values_mut().filter(|i| i.user_id == id) {
            item.owner_username = username.as_str().to_owned();
        }

        Ok(updated)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl ItemRepository for MemoryRepository {
    async fn list(&self) -> Result<Vec<Item>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.items.values().cloned().collect())
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.items.get(&id).cloned())
    }

    async fn create(&self, owner: UserId, item: NewItem) -> Result<Item, RepositoryError> {
        let mut tables = self.tables.write().await;
        let owner_username = tables
            .users
            .get(&owner)
            .map(|(user, _)| user.username.as_str().to_owned())
            .ok_or(RepositoryError::NotFound)?;

        tables.next_item_id += 1;
        let created = Item {
            id: ItemId::new(tables.next_item_id),
            name: item.name,
            price: item.price,
            store: item.store,
            image_file: item.image_file,
            user_id: owner,
            owner_username,
            created_at: Utc::now(),
        };
        tables.items.insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete(&self, id: ItemId, owner: UserId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .items
            .get(&id)
            .is_some_and(|item| item.user_id == owner);
        if owned {
            tables.items.remove(&id);
        }
        Ok(owned)
    }
}
