//! Store repository
//!
//! Slug uniqueness is enforced by `stores_slug_key`; a collision surfaces as
//! `Conflict` through the classifier, never by a check-then-insert.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{StoreName, StoreSlug};

/// Store record from database
#[derive(Debug, Clone, FromRow)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new store
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: StoreName,
    pub slug: StoreSlug,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct StoreChanges {
    pub name: Option<StoreName>,
    pub slug: Option<StoreSlug>,
}

impl StoreChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.slug.is_none()
    }
}

/// Store repository
pub struct StoreRepo<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> StoreRepo<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&mut self, input: &NewStore) -> Result<Store> {
        let store = sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores (id, name, slug)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name.as_str())
        .bind(input.slug.as_str())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(store)
    }

    pub async fn get(&mut self, id: Uuid) -> Result<Store> {
        sqlx::query_as::<_, Store>(
            r#"
            SELECT id, name, slug, created_at, updated_at
            FROM stores
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| Error::not_found("store", id))
    }

    /// All stores, newest first.
    pub async fn list(&mut self) -> Result<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>(
            r#"
            SELECT id, name, slug, created_at, updated_at
            FROM stores
            ORDER BY created_at DESC, id
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(stores)
    }

    /// Apply `changes`; zero affected rows means the store is gone.
    pub async fn update(&mut self, id: Uuid, changes: &StoreChanges) -> Result<Store> {
        sqlx::query_as::<_, Store>(
            r#"
            UPDATE stores
            SET name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, slug, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name.as_ref().map(StoreName::as_str))
        .bind(changes.slug.as_ref().map(StoreSlug::as_str))
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| Error::not_found("store", id))
    }

    /// Delete a store; pages and widgets go with it (`ON DELETE CASCADE`).
    pub async fn delete(&mut self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("store", id));
        }

        Ok(())
    }

    /// Take the store's row lock for the rest of the transaction.
    ///
    /// Serialises home-flag changes per store.
    pub async fn lock(&mut self, id: Uuid) -> Result<()> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM stores WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?
            .map(|_| ())
            .ok_or_else(|| Error::not_found("store", id))
    }
}
