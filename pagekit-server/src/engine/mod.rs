//! Invariant engine
//!
//! Orchestrates the repositories so that, between transactions:
//! - each store has at most one home page, and a home page is never deleted
//! - a page's widget positions are exactly `0..n`
//!
//! Every operation takes a [`Deadline`] bounding all of its storage work.
//! Multi-statement operations run in one [`UnitOfWork`]; lock order is
//! store row, then page row.

mod pages;
mod stores;
mod widgets;

pub use pages::PageDetail;

use sqlx::PgPool;

use crate::db::{Deadline, UnitOfWork};
use crate::error::Result;

/// Entry point for every store, page and widget operation
#[derive(Debug, Clone)]
pub struct Engine {
    pool: PgPool,
}

impl Engine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip to the database within `deadline`.
    pub async fn ping(&self, deadline: &Deadline) -> Result<()> {
        deadline
            .run(async {
                sqlx::query("SELECT 1").execute(&self.pool).await?;
                Ok(())
            })
            .await
    }

    async fn begin(&self, deadline: &Deadline) -> Result<UnitOfWork> {
        UnitOfWork::begin(&self.pool, deadline).await
    }
}
