//! Extractors that reject with `ApiError` instead of axum's plain-text
//! rejections.

use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;
use domains::{DomainError, PostId};

use crate::error::ApiError;

/// `axum::Json` whose rejection is a 400 `{"error": ...}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// The `{id}` path segment of a post route. Anything that is not a valid
/// identifier is reported as a missing post.
#[derive(Debug, Clone, Copy)]
pub struct PostPath(pub PostId);

impl<S> FromRequestParts<S> for PostPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError(DomainError::post_not_found()))?;
        Ok(PostPath(PostId::parse(&raw)?))
    }
}
