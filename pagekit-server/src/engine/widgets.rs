//! Widget operations and the position contract
//!
//! Insert, delete and reorder lock the owning page row before touching
//! positions, so position-mutating transactions on one page run one at a
//! time. Other pages are unaffected.

use uuid::Uuid;

use super::Engine;
use crate::db::{Deadline, NewWidget, PageRepo, Widget, WidgetChanges, WidgetRepo};
use crate::error::{Error, Invariant, Result};
use crate::models::ValidationError;

/// `ids` must name every widget of the page exactly once.
///
/// `matching` counts the page's widgets whose id appears in `ids`; `total`
/// counts all of the page's widgets.
fn check_reorder_set(ids: &[Uuid], matching: i64, total: i64) -> Result<()> {
    let claimed = ids.len() as i64;
    if matching != claimed || total != claimed {
        return Err(Error::Invariant(Invariant::ReorderSetMismatch));
    }
    Ok(())
}

impl Engine {
    /// Append a widget at `max(position) + 1`.
    pub async fn create_widget(
        &self,
        deadline: &Deadline,
        page_id: Uuid,
        input: NewWidget,
    ) -> Result<Widget> {
        deadline
            .run(async {
                let mut uow = self.begin(deadline).await?;
                uow.pages().lock(page_id).await?;

                let position = uow.widgets().next_position(page_id).await?;
                let widget = uow.widgets().insert(page_id, &input, position).await?;
                uow.commit().await?;

                tracing::info!(widget_id = %widget.id, %page_id, position, "widget created");
                Ok(widget)
            })
            .await
    }

    pub async fn get_widget(&self, deadline: &Deadline, id: Uuid) -> Result<Widget> {
        deadline
            .run(async {
                let mut conn = self.pool.acquire().await?;
                WidgetRepo::new(&mut conn).get(id).await
            })
            .await
    }

    /// Widgets of an existing page, ordered by position.
    pub async fn list_widgets(&self, deadline: &Deadline, page_id: Uuid) -> Result<Vec<Widget>> {
        deadline
            .run(async {
                let mut conn = self.pool.acquire().await?;
                PageRepo::new(&mut conn).get(page_id).await?;
                WidgetRepo::new(&mut conn).list_for_page(page_id).await
            })
            .await
    }

    /// Change type and/or configuration. Position is never written here.
    pub async fn update_widget(
        &self,
        deadline: &Deadline,
        id: Uuid,
        changes: WidgetChanges,
    ) -> Result<Widget> {
        deadline
            .run(async {
                let mut conn = self.pool.acquire().await?;
                let mut repo = WidgetRepo::new(&mut conn);
                if changes.widget_type.is_none() && changes.config.is_absent() {
                    return repo.get(id).await;
                }
                repo.update(id, &changes).await
            })
            .await
    }

    /// Delete a widget and close the gap it leaves.
    pub async fn delete_widget(&self, deadline: &Deadline, id: Uuid) -> Result<()> {
        deadline
            .run(async {
                let mut uow = self.begin(deadline).await?;
                let page_id = uow.widgets().get(id).await?.page_id;
                uow.pages().lock(page_id).await?;

                let removed = uow.widgets().delete(id).await?;
                let shifted = uow.widgets().close_gap(page_id, removed.position).await?;
                uow.commit().await?;

                tracing::info!(widget_id = %id, %page_id, shifted, "widget deleted");
                Ok(())
            })
            .await
    }

    /// Replace the page's ordering with `ids`, returning the reordered widgets.
    ///
    /// Foreign ids, duplicates and omissions are all rejected before any
    /// position changes.
    pub async fn reorder_widgets(
        &self,
        deadline: &Deadline,
        page_id: Uuid,
        ids: Vec<Uuid>,
    ) -> Result<Vec<Widget>> {
        if ids.is_empty() {
            return Err(ValidationError::EmptyList { field: "widget_ids" }.into());
        }

        deadline
            .run(async {
                let mut uow = self.begin(deadline).await?;
                uow.pages().lock(page_id).await?;

                let (matching, total) = uow.widgets().count_matching(page_id, &ids).await?;
                check_reorder_set(&ids, matching, total)?;

                uow.widgets().reorder(page_id, &ids).await?;
                let widgets = uow.widgets().list_for_page(page_id).await?;
                uow.commit().await?;

                tracing::info!(%page_id, count = widgets.len(), "widgets reordered");
                Ok(widgets)
            })
            .await
    }
}
