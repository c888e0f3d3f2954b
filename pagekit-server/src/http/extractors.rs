//! Custom Axum extractors

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, FailedToBufferBody};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::header::CONTENT_LENGTH;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::error::ApiError;
use super::server::AppState;
use crate::db::Deadline;
use crate::decode::{decode, DecodeError};
use crate::models::ValidationError;

fn parse_id(raw: &str) -> Result<Uuid, ValidationError> {
    let id = Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat {
        field: "id",
        reason: "invalid UUID format",
    })?;

    if id.is_nil() {
        return Err(ValidationError::InvalidFormat {
            field: "id",
            reason: "must not be the nil UUID",
        });
    }

    Ok(id)
}

/// Extract and validate a UUID from a single-parameter path
pub struct ValidUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidUuid
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::from(ValidationError::Empty { field: "id" }))?;

        Ok(Self(parse_id(&raw)?))
    }
}

/// Extract and validate two UUIDs from a nested path (`/stores/{a}/pages/{b}`)
pub struct ValidUuidPair(pub Uuid, pub Uuid);

impl<S> FromRequestParts<S> for ValidUuidPair
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((outer, inner)): Path<(String, String)> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::from(ValidationError::Empty { field: "id" }))?;

        Ok(Self(parse_id(&outer)?, parse_id(&inner)?))
    }
}

/// Query-string extractor whose rejection is a `VALIDATION_ERROR` envelope
pub struct ValidQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection.body_text(), "query string rejected");
                ApiError::from(ValidationError::InvalidFormat {
                    field: "query",
                    reason: "malformed or repeated parameter",
                })
            })?;

        Ok(Self(value))
    }
}

/// Strict JSON body: one object, no unknown fields, bounded size.
///
/// Replaces `axum::Json` so every decode failure becomes a
/// `VALIDATION_ERROR` envelope instead of a plain-text rejection.
pub struct StrictJson<T>(pub T);

impl<T> FromRequest<Arc<AppState>> for StrictJson<T>
where
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let limit = state.config.body_limit;

        let declared = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > limit) {
            return Err(DecodeError::TooLarge { limit }.into());
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| read_failure(&rejection, limit))?;

        Ok(Self(decode(&bytes, limit)?))
    }
}

/// Buffering is capped by the router's `DefaultBodyLimit`.
fn read_failure(rejection: &BytesRejection, limit: usize) -> DecodeError {
    match rejection {
        BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_)) => {
            DecodeError::TooLarge { limit }
        }
        _ => DecodeError::Unreadable,
    }
}

/// Per-request storage deadline, started when the request is extracted
impl FromRequestParts<Arc<AppState>> for Deadline {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Deadline::after(state.config.request_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::routes::test_support::app;
    use axum::body::{to_bytes, Body};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[test]
    fn parses_uuid_ids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn rejects_malformed_and_nil() {
        assert!(matches!(
            parse_id("not-a-uuid"),
            Err(ValidationError::InvalidFormat { reason: "invalid UUID format", .. })
        ));
        assert!(matches!(
            parse_id("00000000-0000-0000-0000-000000000000"),
            Err(ValidationError::InvalidFormat { reason: "must not be the nil UUID", .. })
        ));
    }

    #[tokio::test]
    async fn declared_length_over_limit_is_rejected_unread() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/stores")
            .header("content-type", "application/json")
            .header(CONTENT_LENGTH, "2000000")
            .body(Body::from("{}"))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["error"]["message"],
            "body must not be larger than 1048576 bytes"
        );
    }
}
