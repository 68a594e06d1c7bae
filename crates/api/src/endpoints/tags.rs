//! Tag endpoints (read-only reference data).

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use foodgram_common::AppResult;
use foodgram_db::entities::tag;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Tag response.
#[derive(Serialize)]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<tag::Model> for TagResponse {
    fn from(tag: tag::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        }
    }
}

/// List all tags.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<TagResponse>>> {
    let tags = state.tag_service.list().await?;

    Ok(ApiResponse::ok(tags.into_iter().map(Into::into).collect()))
}

/// Get a tag by ID.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TagResponse>> {
    let tag = state.tag_service.get(&id).await?;

    Ok(ApiResponse::ok(tag.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show))
}
