//! Ingredient endpoints (read-only reference data).

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use foodgram_common::AppResult;
use foodgram_db::entities::ingredient;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Ingredient response.
#[derive(Serialize)]
pub struct IngredientResponse {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(ingredient: ingredient::Model) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// List ingredients request.
#[derive(Debug, Deserialize)]
pub struct ListIngredientsQuery {
    /// Name prefix to search for.
    pub name: Option<String>,
}

/// List ingredients, optionally prefix-searched by name.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListIngredientsQuery>,
) -> AppResult<ApiResponse<Vec<IngredientResponse>>> {
    let ingredients = state
        .ingredient_service
        .list(query.name.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        ingredients.into_iter().map(Into::into).collect(),
    ))
}

/// Get an ingredient by ID.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<IngredientResponse>> {
    let ingredient = state.ingredient_service.get(&id).await?;

    Ok(ApiResponse::ok(ingredient.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show))
}
