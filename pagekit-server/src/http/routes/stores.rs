//! Store endpoints

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

use crate::db::{Deadline, NewStore, Store, StoreChanges};
use crate::http::error::ApiError;
use crate::http::extractors::{StrictJson, ValidUuid};
use crate::http::server::AppState;
use crate::models::{Patch, StoreName, StoreSlug, ValidationError};

/// Create store request
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateStoreRequest {
    pub name: String,
    pub slug: String,
}

impl CreateStoreRequest {
    fn validate(self) -> Result<NewStore, ValidationError> {
        Ok(NewStore {
            name: StoreName::new(&self.name)?,
            slug: StoreSlug::new(&self.slug)?,
        })
    }
}

/// Partial update; PUT and PATCH share it
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStoreRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub slug: Patch<String>,
}

impl UpdateStoreRequest {
    fn validate(self) -> Result<StoreChanges, ValidationError> {
        Ok(StoreChanges {
            name: self
                .name
                .required("store name")?
                .map(|s| StoreName::new(&s))
                .transpose()?,
            slug: self
                .slug
                .required("store slug")?
                .map(|s| StoreSlug::new(&s))
                .transpose()?,
        })
    }
}

/// Store response
#[derive(Serialize)]
pub struct StoreResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Store> for StoreResponse {
    fn from(s: Store) -> Self {
        Self {
            id: s.id,
            name: s.name,
            slug: s.slug,
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}

/// GET /stores - newest first
async fn list_stores(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
) -> Result<Json<Vec<StoreResponse>>, ApiError> {
    let stores = state.engine.list_stores(&deadline).await?;
    Ok(Json(stores.into_iter().map(StoreResponse::from).collect()))
}

/// POST /stores
async fn create_store(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    StrictJson(req): StrictJson<CreateStoreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = req.validate()?;
    let store = state.engine.create_store(&deadline, input).await?;
    let location = format!("/stores/{}", store.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(StoreResponse::from(store)),
    ))
}

/// GET /stores/{store_id}
async fn get_store(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuid(id): ValidUuid,
) -> Result<Json<StoreResponse>, ApiError> {
    let store = state.engine.get_store(&deadline, id).await?;
    Ok(Json(StoreResponse::from(store)))
}

/// PATCH|PUT /stores/{store_id}
async fn update_store(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuid(id): ValidUuid,
    StrictJson(req): StrictJson<UpdateStoreRequest>,
) -> Result<Json<StoreResponse>, ApiError> {
    let changes = req.validate()?;
    let store = state.engine.update_store(&deadline, id, changes).await?;
    Ok(Json(StoreResponse::from(store)))
}

/// DELETE /stores/{store_id} - cascades to pages and widgets
async fn delete_store(
    State(state): State<Arc<AppState>>,
    deadline: Deadline,
    ValidUuid(id): ValidUuid,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_store(&deadline, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Store routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stores", get(list_stores).post(create_store))
        .route(
            "/stores/{store_id}",
            get(get_store)
                .patch(update_store)
                .put(update_store)
                .delete(delete_store),
        )
}
