//! Store operations

use uuid::Uuid;

use super::Engine;
use crate::db::{Deadline, NewStore, Store, StoreChanges, StoreRepo};
use crate::error::Result;

impl Engine {
    pub async fn create_store(&self, deadline: &Deadline, input: NewStore) -> Result<Store> {
        deadline
            .run(async {
                let mut conn = self.pool.acquire().await?;
                let store = StoreRepo::new(&mut conn).insert(&input).await?;
                tracing::info!(store_id = %store.id, slug = %store.slug, "store created");
                Ok(store)
            })
            .await
    }

    pub async fn get_store(&self, deadline: &Deadline, id: Uuid) -> Result<Store> {
        deadline
            .run(async {
                let mut conn = self.pool.acquire().await?;
                StoreRepo::new(&mut conn).get(id).await
            })
            .await
    }

    pub async fn list_stores(&self, deadline: &Deadline) -> Result<Vec<Store>> {
        deadline
            .run(async {
                let mut conn = self.pool.acquire().await?;
                StoreRepo::new(&mut conn).list().await
            })
            .await
    }

    /// Partial update; an empty change set returns the store unchanged.
    pub async fn update_store(
        &self,
        deadline: &Deadline,
        id: Uuid,
        changes: StoreChanges,
    ) -> Result<Store> {
        deadline
            .run(async {
                let mut conn = self.pool.acquire().await?;
                let mut repo = StoreRepo::new(&mut conn);
                if changes.is_empty() {
                    return repo.get(id).await;
                }
                repo.update(id, &changes).await
            })
            .await
    }

    /// Delete a store with all of its pages and widgets.
    pub async fn delete_store(&self, deadline: &Deadline, id: Uuid) -> Result<()> {
        deadline
            .run(async {
                let mut conn = self.pool.acquire().await?;
                StoreRepo::new(&mut conn).delete(id).await?;
                tracing::info!(store_id = %id, "store deleted");
                Ok(())
            })
            .await
    }
}
