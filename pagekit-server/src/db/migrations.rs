//! Schema migrations for stores, pages and widgets
//!
//! Idempotent: every statement is `IF NOT EXISTS` or guarded, so running on
//! every startup is safe.

use sqlx::PgPool;

use crate::error::Result;

const STATEMENTS: &[(&str, &str)] = &[
    (
        "stores",
        r#"
        CREATE TABLE IF NOT EXISTS stores (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT stores_slug_key UNIQUE (slug)
        )
        "#,
    ),
    (
        "pages",
        r#"
        CREATE TABLE IF NOT EXISTS pages (
            id UUID PRIMARY KEY,
            store_id UUID NOT NULL,
            name TEXT NOT NULL,
            route TEXT NOT NULL,
            is_home BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT pages_store_id_fkey FOREIGN KEY (store_id)
                REFERENCES stores(id) ON DELETE CASCADE,
            CONSTRAINT pages_store_id_route_key UNIQUE (store_id, route)
        )
        "#,
    ),
    (
        "pages_one_home_per_store",
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS pages_one_home_per_store
            ON pages (store_id) WHERE is_home
        "#,
    ),
    (
        "widgets",
        r#"
        CREATE TABLE IF NOT EXISTS widgets (
            id UUID PRIMARY KEY,
            page_id UUID NOT NULL,
            type TEXT NOT NULL,
            position INTEGER NOT NULL,
            config JSONB,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT widgets_page_id_fkey FOREIGN KEY (page_id)
                REFERENCES pages(id) ON DELETE CASCADE,
            CONSTRAINT widgets_type_check
                CHECK (type IN ('banner', 'product_grid', 'text', 'image', 'spacer')),
            CONSTRAINT widgets_position_check CHECK (position >= 0),
            CONSTRAINT widgets_page_id_position_key UNIQUE (page_id, position)
                DEFERRABLE INITIALLY DEFERRED
        )
        "#,
    ),
];

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<()> {
    tracing::info!("Running pagekit migrations...");

    for (name, sql) in STATEMENTS {
        sqlx::query(*sql).execute(pool).await?;
        tracing::debug!(step = *name, "migration applied");
    }

    tracing::info!(steps = STATEMENTS.len(), "Migrations complete");
    Ok(())
}
