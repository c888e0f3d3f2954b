//! Transaction scope shared by the repositories of one engine operation

use sqlx::{PgPool, Postgres, Transaction};

use super::repos::{PageRepo, StoreRepo, WidgetRepo};
use super::Deadline;
use crate::error::Result;

/// One database transaction.
///
/// Dropping a `UnitOfWork` without calling [`commit`](Self::commit) rolls it
/// back; this covers early `?` returns, deadline expiry and panics alike.
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork {
    /// Begin a transaction whose statements are bounded by `deadline`.
    pub async fn begin(pool: &PgPool, deadline: &Deadline) -> Result<Self> {
        let mut tx = pool.begin().await?;

        // Server-side cap so a dropped client future does not leave a
        // statement running past the deadline.
        let millis = deadline.remaining().as_millis().max(1);
        sqlx::query(&format!("SET LOCAL statement_timeout = {millis}"))
            .execute(&mut *tx)
            .await?;

        Ok(Self { tx })
    }

    pub fn stores(&mut self) -> StoreRepo<'_> {
        StoreRepo::new(&mut self.tx)
    }

    pub fn pages(&mut self) -> PageRepo<'_> {
        PageRepo::new(&mut self.tx)
    }

    pub fn widgets(&mut self) -> WidgetRepo<'_> {
        WidgetRepo::new(&mut self.tx)
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
