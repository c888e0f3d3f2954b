//! Page repository
//!
//! `is_home` is written here but only ever decided by the engine: callers
//! setting it to `true` must hold the store lock and call
//! [`PageRepo::clear_home`] first.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{PageName, PageRoute};

/// Page record from database
#[derive(Debug, Clone, FromRow)]
pub struct Page {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub route: String,
    pub is_home: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new page
#[derive(Debug, Clone)]
pub struct NewPage {
    pub name: PageName,
    pub route: PageRoute,
    pub is_home: bool,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct PageChanges {
    pub name: Option<PageName>,
    pub route: Option<PageRoute>,
    pub is_home: Option<bool>,
}

impl PageChanges {
    /// True when this update makes the page its store's home page.
    pub fn sets_home(&self) -> bool {
        self.is_home == Some(true)
    }
}

/// Page repository
pub struct PageRepo<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PageRepo<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&mut self, store_id: Uuid, input: &NewPage) -> Result<Page> {
        let page = sqlx::query_as::<_, Page>(
            r#"
            INSERT INTO pages (id, store_id, name, route, is_home)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, store_id, name, route, is_home, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(store_id)
        .bind(input.name.as_str())
        .bind(input.route.as_str())
        .bind(input.is_home)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(page)
    }

    pub async fn get(&mut self, id: Uuid) -> Result<Page> {
        sqlx::query_as::<_, Page>(
            r#"
            SELECT id, store_id, name, route, is_home, created_at, updated_at
            FROM pages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| Error::not_found("page", id))
    }

    /// Pages newest first, optionally scoped to one store.
    pub async fn list(&mut self, store_id: Option<Uuid>) -> Result<Vec<Page>> {
        let pages = sqlx::query_as::<_, Page>(
            r#"
            SELECT id, store_id, name, route, is_home, created_at, updated_at
            FROM pages
            WHERE $1::uuid IS NULL OR store_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(store_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(pages)
    }

    pub async fn update(&mut self, id: Uuid, changes: &PageChanges) -> Result<Page> {
        sqlx::query_as::<_, Page>(
            r#"
            UPDATE pages
            SET name = COALESCE($2, name),
                route = COALESCE($3, route),
                is_home = COALESCE($4, is_home),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, store_id, name, route, is_home, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name.as_ref().map(PageName::as_str))
        .bind(changes.route.as_ref().map(PageRoute::as_str))
        .bind(changes.is_home)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| Error::not_found("page", id))
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("page", id));
        }

        Ok(())
    }

    /// Read the page and hold its row lock until the transaction ends.
    ///
    /// Every position-mutating widget operation takes this lock first.
    pub async fn lock(&mut self, id: Uuid) -> Result<Page> {
        sqlx::query_as::<_, Page>(
            r#"
            SELECT id, store_id, name, route, is_home, created_at, updated_at
            FROM pages
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| Error::not_found("page", id))
    }

    /// Clear `is_home` on every page of the store except `keep`.
    pub async fn clear_home(&mut self, store_id: Uuid, keep: Option<Uuid>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE pages
            SET is_home = FALSE, updated_at = NOW()
            WHERE store_id = $1
              AND is_home
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(store_id)
        .bind(keep)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Number of home pages in a store (0 or 1 between transactions).
    pub async fn count_home(&mut self, store_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pages WHERE store_id = $1 AND is_home",
        )
        .bind(store_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_home_only_for_explicit_true() {
        assert!(!PageChanges::default().sets_home());
        assert!(!PageChanges {
            is_home: Some(false),
            ..Default::default()
        }
        .sets_home());
        assert!(PageChanges {
            is_home: Some(true),
            ..Default::default()
        }
        .sets_home());
    }
}
