use axum::extract::{Query, State};
use axum::{Extension, Json};
use domains::{Claims, Post, PostDraft, PostPage};
use serde::Deserialize;

use super::MessageResponse;
use crate::error::ApiError;
use crate::extract::{AppJson, PostPath};
use crate::AppState;

/// Raw `?page=&limit=`; kept as strings so junk falls back to defaults
/// instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostPayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
}

impl TryFrom<PostPayload> for PostDraft {
    type Error = ApiError;

    fn try_from(payload: PostPayload) -> Result<Self, Self::Error> {
        Ok(PostDraft::new(payload.title, payload.content, payload.author)?)
    }
}

/// GET /api/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PostPage>, ApiError> {
    let request = state
        .posts
        .pagination()
        .page_request(query.page.as_deref(), query.limit.as_deref());

    Ok(Json(state.posts.list(request).await?))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    PostPath(id): PostPath,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.posts.get(id).await?))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<PostPayload>,
) -> Result<Json<Post>, ApiError> {
    let draft = PostDraft::try_from(payload)?;
    let post = state.posts.create(draft).await?;
    tracing::debug!(post_id = %post.id, by = %claims.username, "create handled");
    Ok(Json(post))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    PostPath(id): PostPath,
    AppJson(payload): AppJson<PostPayload>,
) -> Result<Json<Post>, ApiError> {
    let draft = PostDraft::replacement(payload.title, payload.content, payload.author);
    let post = state.posts.update(id, draft).await?;
    tracing::debug!(post_id = %id, by = %claims.username, "update handled");
    Ok(Json(post))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    PostPath(id): PostPath,
) -> Result<Json<MessageResponse>, ApiError> {
    state.posts.delete(id).await?;
    tracing::debug!(post_id = %id, by = %claims.username, "delete handled");
    Ok(Json(MessageResponse::new("Post deleted successfully")))
}
