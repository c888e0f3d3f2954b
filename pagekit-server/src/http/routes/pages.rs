//! Page endpoints
//!
//! Pages live under `/stores/{store_id}/pages`; `GET /pages` lists across
//! stores with an optional `store_id` filter.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::widgets::WidgetResponse;
use crate::db::{Deadline, NewPage, Page, PageChanges};
use crate::engine::PageDetail;
use crate::http::error::ApiError;
use crate::http::extractors::{StrictJson, ValidQuery, ValidUuid, ValidUuidPair};
use crate::http::server::AppState;
use crate::models::{PageName, PageRoute, Patch, ValidationError};

/// Create page request
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePageRequest {
    pub name: String,
    pub route: String,
    #[serde(default)]
    pub is_home: bool,
}

impl CreatePageRequest {
    fn validate(self) -> Result<NewPage, ValidationError> {
        Ok(NewPage {
            name: PageName::new(&self.name)?,
            route: PageRoute::new(&self.route)?,
            is_home: self.is_home,
        })
    }
}

/// Partial update; PUT and PATCH share it
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePageRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub route: Patch<String>,
    #[serde(default)]
    pub is_home: Patch<bool>,
}

impl UpdatePageRequest {
    fn validate(self) -> Result<PageChanges, ValidationError> {
        Ok(PageChanges {
            name: self
                .name
                .required("page name")?
                .map(|s| PageName::new(&s))
                .transpose()?,
            route: self
                .route
                .required("page route")?
                .map(|s| PageRoute::new(&s))
                .transpose()?,
            is_home: self.is_home.required("is_home")?,
        })
    }
}

/// `GET /pages` query
#[derive(Deserialize)]
pub struct ListPagesQuery {
    pub store_id: Option<String>,
}

/// Page response; `widgets` only when the page was loaded with them
#[derive(Serialize)]
pub struct PageResponse {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub route: String,
    pub is_home: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Vec<WidgetResponse>>,
}

impl From<Page> for PageResponse {
    fn from(p: Page) -> Self {
        Self {
            id: p.id,
            store_id: p.store_id,
            name: p.name,
            route: p.route,
            is_home: p.is_home,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
            widgets: None,
        }
    }
}

impl From<PageDetail> for PageResponse {
    fn from(d: PageDetail) -> Self {
        Self {
            widgets: Some(d.widgets.into_iter().map(WidgetResponse::from).collect()),
            ..Self::from(d.page)
        }
    }
}

fn page_list(pages: Vec<Page>) -> Json<Vec<PageResponse>> {
    Json(pages.into_iter().map(PageResponse::from).collect())
}

/// GET /pages?store_id=
async fn list_pages(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidQuery(query): ValidQuery<ListPagesQuery>,
) -> Result<Json<Vec<PageResponse>>, ApiError> {
    let store_id = match query.store_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat {
            field: "store_id",
            reason: "invalid UUID format",
        })?),
    };

    let pages = state.engine.list_pages(&deadline, store_id).await?;
    Ok(page_list(pages))
}

/// GET /stores/{store_id}/pages
async fn list_store_pages(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuid(store_id): ValidUuid,
) -> Result<Json<Vec<PageResponse>>, ApiError> {
    let pages = state.engine.list_store_pages(&deadline, store_id).await?;
    Ok(page_list(pages))
}

/// POST /stores/{store_id}/pages
async fn create_page(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuid(store_id): ValidUuid,
    StrictJson(req): StrictJson<CreatePageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = req.validate()?;
    let page = state.engine.create_page(&deadline, store_id, input).await?;
    let location = format!("/stores/{}/pages/{}", store_id, page.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(PageResponse::from(page)),
    ))
}

/// GET /stores/{store_id}/pages/{page_id} - includes widgets by position
async fn get_page(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuidPair(store_id, page_id): ValidUuidPair,
) -> Result<Json<PageResponse>, ApiError> {
    let detail = state.engine.get_page(&deadline, store_id, page_id).await?;
    Ok(Json(PageResponse::from(detail)))
}

/// PATCH|PUT /stores/{store_id}/pages/{page_id}
async fn update_page(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuidPair(store_id, page_id): ValidUuidPair,
    StrictJson(req): StrictJson<UpdatePageRequest>,
) -> Result<Json<PageResponse>, ApiError> {
    let changes = req.validate()?;
    let page = state
        .engine
        .update_page(&deadline, store_id, page_id, changes)
        .await?;
    Ok(Json(PageResponse::from(page)))
}

/// DELETE /stores/{store_id}/pages/{page_id} - refused for the home page
async fn delete_page(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuidPair(store_id, page_id): ValidUuidPair,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_page(&deadline, store_id, page_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Page routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pages", get(list_pages))
        .route(
            "/stores/{store_id}/pages",
            get(list_store_pages).post(create_page),
        )
        .route(
            "/stores/{store_id}/pages/{page_id}",
            get(get_page)
                .patch(update_page)
                .put(update_page)
                .delete(delete_page),
        )
}
