//! Page operations and home-page exclusivity
//!
//! Setting `is_home` locks the store row, clears the flag on the store's
//! other pages and writes the target page, all in one transaction. The
//! partial unique index `pages_one_home_per_store` backs this up.

use uuid::Uuid;

use super::Engine;
use crate::db::{Deadline, NewPage, Page, PageChanges, PageRepo, StoreRepo, Widget};
use crate::error::{Error, Invariant, Result};

/// A page with its widgets in display order
#[derive(Debug, Clone)]
pub struct PageDetail {
    pub page: Page,
    pub widgets: Vec<Widget>,
}

/// Pages addressed under the wrong store do not exist.
fn owned_by(page: Page, store_id: Uuid) -> Result<Page> {
    if page.store_id != store_id {
        return Err(Error::not_found("page", page.id));
    }
    Ok(page)
}

impl Engine {
    pub async fn create_page(
        &self,
        deadline: &Deadline,
        store_id: Uuid,
        input: NewPage,
    ) -> Result<Page> {
        deadline
            .run(async {
                let mut uow = self.begin(deadline).await?;

                if input.is_home {
                    uow.stores().lock(store_id).await?;
                    let cleared = uow.pages().clear_home(store_id, None).await?;
                    tracing::debug!(%store_id, cleared, "previous home page cleared");
                }

                let page = uow.pages().insert(store_id, &input).await?;
                uow.commit().await?;

                tracing::info!(page_id = %page.id, %store_id, is_home = page.is_home, "page created");
                Ok(page)
            })
            .await
    }

    /// Page with its widgets, ordered by position.
    pub async fn get_page(
        &self,
        deadline: &Deadline,
        store_id: Uuid,
        page_id: Uuid,
    ) -> Result<PageDetail> {
        deadline
            .run(async {
                let mut uow = self.begin(deadline).await?;
                let page = owned_by(uow.pages().get(page_id).await?, store_id)?;
                let widgets = uow.widgets().list_for_page(page_id).await?;
                uow.commit().await?;

                Ok(PageDetail { page, widgets })
            })
            .await
    }

    /// Pages across all stores, or one store's when `store_id` is given.
    pub async fn list_pages(&self, deadline: &Deadline, store_id: Option<Uuid>) -> Result<Vec<Page>> {
        deadline
            .run(async {
                let mut conn = self.pool.acquire().await?;
                PageRepo::new(&mut conn).list(store_id).await
            })
            .await
    }

    /// Pages of one existing store.
    pub async fn list_store_pages(&self, deadline: &Deadline, store_id: Uuid) -> Result<Vec<Page>> {
        deadline
            .run(async {
                let mut conn = self.pool.acquire().await?;
                StoreRepo::new(&mut conn).get(store_id).await?;
                PageRepo::new(&mut conn).list(Some(store_id)).await
            })
            .await
    }

    pub async fn update_page(
        &self,
        deadline: &Deadline,
        store_id: Uuid,
        page_id: Uuid,
        changes: PageChanges,
    ) -> Result<Page> {
        deadline
            .run(async {
                let mut uow = self.begin(deadline).await?;

                if changes.sets_home() {
                    uow.stores().lock(store_id).await?;
                }

                let current = owned_by(uow.pages().lock(page_id).await?, store_id)?;

                if changes.sets_home() && !current.is_home {
                    let cleared = uow.pages().clear_home(store_id, Some(page_id)).await?;
                    tracing::debug!(%store_id, cleared, "previous home page cleared");
                }

                let page = uow.pages().update(page_id, &changes).await?;
                uow.commit().await?;

                tracing::info!(%page_id, is_home = page.is_home, "page updated");
                Ok(page)
            })
            .await
    }

    /// Delete a page. Home pages are refused before anything is removed.
    pub async fn delete_page(&self, deadline: &Deadline, store_id: Uuid, page_id: Uuid) -> Result<()> {
        deadline
            .run(async {
                let mut uow = self.begin(deadline).await?;
                let page = owned_by(uow.pages().lock(page_id).await?, store_id)?;

                if page.is_home {
                    return Err(Error::Invariant(Invariant::HomePageDelete));
                }

                uow.pages().delete(page_id).await?;
                uow.commit().await?;

                tracing::info!(%page_id, %store_id, "page deleted");
                Ok(())
            })
            .await
    }
}
