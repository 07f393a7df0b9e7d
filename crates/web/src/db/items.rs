//! `PostgreSQL` listing repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use krishop_core::{ItemId, Price, UserId};

use super::{ItemRepository, NewItem, RepositoryError};
use crate::models::Item;

#[derive(FromRow)]
struct ItemRow {
    id: i32,
    name: String,
    price: Decimal,
    store: String,
    image_file: String,
    user_id: i32,
    owner_username: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(r: ItemRow) -> Result<Self, Self::Error> {
        let price = Price::from_decimal(r.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Self {
            id: ItemId::new(r.id),
            name: r.name,
            price,
            store: r.store,
            image_file: r.image_file,
            user_id: UserId::new(r.user_id),
            owner_username: r.owner_username,
            created_at: r.created_at,
        })
    }
}

/// Repository for listing database operations.
#[derive(Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    /// Create a new listing repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn list(&self) -> Result<Vec<Item>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT i.id, i.name, i.price, i.store, i.image_file, i.user_id,
                   u.username AS owner_username, i.created_at
            FROM items i
            JOIN users u ON u.id = i.user_id
            ORDER BY i.id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        sqlx::query_as::<_, ItemRow>(
            r"
            SELECT i.id, i.name, i.price, i.store, i.image_file, i.user_id,
                   u.username AS owner_username, i.created_at
            FROM items i
            JOIN users u ON u.id = i.user_id
            WHERE i.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Item::try_from)
        .transpose()
    }

    async fn create(&self, owner: UserId, item: NewItem) -> Result<Item, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            WITH inserted AS (
                INSERT INTO items (name, price, store, image_file, user_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, name, price, store, image_file, user_id, created_at
            )
            SELECT ins.id, ins.name, ins.price, ins.store, ins.image_file, ins.user_id,
                   u.username AS owner_username, ins.created_at
            FROM inserted ins
            JOIN users u ON u.id = ins.user_id
            ",
        )
        .bind(&item.name)
        .bind(item.price.amount())
        .bind(&item.store)
        .bind(&item.image_file)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn delete(&self, id: ItemId, owner: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
