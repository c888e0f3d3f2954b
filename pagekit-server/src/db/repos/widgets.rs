//! Widget repository
//!
//! Positions are only written by the engine while it holds the owning
//! page's row lock. `widgets_page_id_position_key` is checked at commit, so
//! renumbering inside one transaction may pass through duplicate states.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Patch, WidgetConfig, WidgetType};

/// Widget as stored; `type` is kept as text by the database
#[derive(Debug, FromRow)]
struct WidgetRow {
    id: Uuid,
    page_id: Uuid,
    #[sqlx(rename = "type")]
    widget_type: String,
    position: i32,
    config: Option<Json<WidgetConfig>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Widget record
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: Uuid,
    pub page_id: Uuid,
    pub widget_type: WidgetType,
    pub position: i32,
    pub config: Option<WidgetConfig>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<WidgetRow> for Widget {
    type Error = Error;

    fn try_from(row: WidgetRow) -> Result<Self> {
        let widget_type = row
            .widget_type
            .parse()
            .map_err(|e| Error::internal(format!("widget {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            page_id: row.page_id,
            widget_type,
            position: row.position,
            config: row.config.map(|Json(c)| c),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Validated input for a new widget; position is assigned by the engine
#[derive(Debug, Clone)]
pub struct NewWidget {
    pub widget_type: WidgetType,
    pub config: Option<WidgetConfig>,
}

/// Partial update. `config: Patch::Null` clears the configuration.
#[derive(Debug, Clone, Default)]
pub struct WidgetChanges {
    pub widget_type: Option<WidgetType>,
    pub config: Patch<WidgetConfig>,
}

const COLUMNS: &str = "id, page_id, type, position, config, created_at, updated_at";

/// Widget repository
pub struct WidgetRepo<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> WidgetRepo<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&mut self, page_id: Uuid, input: &NewWidget, position: i32) -> Result<Widget> {
        let row = sqlx::query_as::<_, WidgetRow>(&format!(
            r#"
            INSERT INTO widgets (id, page_id, type, position, config)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(page_id)
        .bind(input.widget_type.as_str())
        .bind(position)
        .bind(input.config.as_ref().map(Json))
        .fetch_one(&mut *self.conn)
        .await?;

        row.try_into()
    }

    pub async fn get(&mut self, id: Uuid) -> Result<Widget> {
        sqlx::query_as::<_, WidgetRow>(&format!("SELECT {COLUMNS} FROM widgets WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| Error::not_found("widget", id))?
            .try_into()
    }

    /// A page's widgets in display order.
    pub async fn list_for_page(&mut self, page_id: Uuid) -> Result<Vec<Widget>> {
        sqlx::query_as::<_, WidgetRow>(&format!(
            "SELECT {COLUMNS} FROM widgets WHERE page_id = $1 ORDER BY position ASC"
        ))
        .bind(page_id)
        .fetch_all(&mut *self.conn)
        .await?
        .into_iter()
        .map(Widget::try_from)
        .collect()
    }

    pub async fn update(&mut self, id: Uuid, changes: &WidgetChanges) -> Result<Widget> {
        let (touch_config, config) = match &changes.config {
            Patch::Absent => (false, None),
            Patch::Null => (true, None),
            Patch::Value(c) => (true, Some(Json(c))),
        };

        sqlx::query_as::<_, WidgetRow>(&format!(
            r#"
            UPDATE widgets
            SET type = COALESCE($2, type),
                config = CASE WHEN $3 THEN $4 ELSE config END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.widget_type.map(|t| t.as_str()))
        .bind(touch_config)
        .bind(config)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| Error::not_found("widget", id))?
        .try_into()
    }

    /// Delete a widget, returning the removed row so its gap can be closed.
    pub async fn delete(&mut self, id: Uuid) -> Result<Widget> {
        sqlx::query_as::<_, WidgetRow>(&format!(
            "DELETE FROM widgets WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| Error::not_found("widget", id))?
        .try_into()
    }

    /// `max(position) + 1`, or `0` for an empty page.
    pub async fn next_position(&mut self, page_id: Uuid) -> Result<i32> {
        let next = sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM widgets WHERE page_id = $1",
        )
        .bind(page_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(next)
    }

    /// Shift every widget after `position` down by one.
    pub async fn close_gap(&mut self, page_id: Uuid, position: i32) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE widgets
            SET position = position - 1, updated_at = NOW()
            WHERE page_id = $1 AND position > $2
            "#,
        )
        .bind(page_id)
        .bind(position)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// `(matching, total)`: how many of the page's widgets are named in `ids`,
    /// and how many widgets the page has.
    pub async fn count_matching(&mut self, page_id: Uuid, ids: &[Uuid]) -> Result<(i64, i64)> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*) FILTER (WHERE id = ANY($2)) AS matching,
                   COUNT(*) AS total
            FROM widgets
            WHERE page_id = $1
            "#,
        )
        .bind(page_id)
        .bind(ids)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(counts)
    }

    /// Set each widget's position to its index in `ids`, in one statement.
    pub async fn reorder(&mut self, page_id: Uuid, ids: &[Uuid]) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE widgets AS w
            SET position = (o.ord - 1)::int, updated_at = NOW()
            FROM UNNEST($2::uuid[]) WITH ORDINALITY AS o(id, ord)
            WHERE w.page_id = $1 AND w.id = o.id
            "#,
        )
        .bind(page_id)
        .bind(ids)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }
}
