//! Widget endpoints
//!
//! Position is assigned and maintained by the engine; request bodies that
//! carry a `position` are rejected as unknown fields.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{Deadline, NewWidget, Widget, WidgetChanges};
use crate::http::error::ApiError;
use crate::http::extractors::{StrictJson, ValidUuid};
use crate::http::server::AppState;
use crate::models::{Patch, ValidationError, WidgetConfig, WidgetType};

/// Create widget request
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateWidgetRequest {
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    #[serde(default)]
    pub config: Option<WidgetConfig>,
}

/// Partial update; `"config": null` clears the configuration
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateWidgetRequest {
    #[serde(default, rename = "type")]
    pub widget_type: Patch<WidgetType>,
    #[serde(default)]
    pub config: Patch<WidgetConfig>,
}

impl UpdateWidgetRequest {
    fn validate(self) -> Result<WidgetChanges, ValidationError> {
        Ok(WidgetChanges {
            widget_type: self.widget_type.required("widget type")?,
            config: self.config,
        })
    }
}

/// Reorder request: the page's complete widget set in the new order
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReorderRequest {
    pub widget_ids: Vec<Uuid>,
}

/// Widget response
#[derive(Serialize)]
pub struct WidgetResponse {
    pub id: Uuid,
    pub page_id: Uuid,
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub position: i32,
    pub config: Option<WidgetConfig>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Widget> for WidgetResponse {
    fn from(w: Widget) -> Self {
        Self {
            id: w.id,
            page_id: w.page_id,
            widget_type: w.widget_type,
            position: w.position,
            config: w.config,
            created_at: w.created_at.to_rfc3339(),
            updated_at: w.updated_at.to_rfc3339(),
        }
    }
}

fn widget_list(widgets: Vec<Widget>) -> Json<Vec<WidgetResponse>> {
    Json(widgets.into_iter().map(WidgetResponse::from).collect())
}

/// GET /pages/{page_id}/widgets - ordered by position
async fn list_widgets(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuid(page_id): ValidUuid,
) -> Result<Json<Vec<WidgetResponse>>, ApiError> {
    let widgets = state.engine.list_widgets(&deadline, page_id).await?;
    Ok(widget_list(widgets))
}

/// POST /pages/{page_id}/widgets - appended after the last widget
async fn create_widget(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuid(page_id): ValidUuid,
    StrictJson(req): StrictJson<CreateWidgetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = NewWidget {
        widget_type: req.widget_type,
        config: req.config,
    };
    let widget = state.engine.create_widget(&deadline, page_id, input).await?;
    let location = format!("/widgets/{}", widget.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(WidgetResponse::from(widget)),
    ))
}

/// POST /pages/{page_id}/widgets/reorder
async fn reorder_widgets(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuid(page_id): ValidUuid,
    StrictJson(req): StrictJson<ReorderRequest>,
) -> Result<Json<Vec<WidgetResponse>>, ApiError> {
    let widgets = state
        .engine
        .reorder_widgets(&deadline, page_id, req.widget_ids)
        .await?;
    Ok(widget_list(widgets))
}

/// GET /widgets/{widget_id}
async fn get_widget(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuid(id): ValidUuid,
) -> Result<Json<WidgetResponse>, ApiError> {
    let widget = state.engine.get_widget(&deadline, id).await?;
    Ok(Json(WidgetResponse::from(widget)))
}

/// PATCH|PUT /widgets/{widget_id}
async fn update_widget(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuid(id): ValidUuid,
    StrictJson(req): StrictJson<UpdateWidgetRequest>,
) -> Result<Json<WidgetResponse>, ApiError> {
    let changes = req.validate()?;
    let widget = state.engine.update_widget(&deadline, id, changes).await?;
    Ok(Json(WidgetResponse::from(widget)))
}

/// DELETE /widgets/{widget_id} - later widgets move up one position
async fn delete_widget(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuid(id): ValidUuid,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_widget(&deadline, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Widget routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/pages/{page_id}/widgets",
            get(list_widgets).post(create_widget),
        )
        .route("/pages/{page_id}/widgets/reorder", post(reorder_widgets))
        .route(
            "/widgets/{widget_id}",
            get(get_widget)
                .patch(update_widget)
                .put(update_widget)
                .delete(delete_widget),
        )
}
