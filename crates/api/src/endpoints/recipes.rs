//! Recipe endpoints: CRUD, favorite/cart toggles, shopping-list download.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use foodgram_common::AppResult;
use foodgram_core::{CartService, RecipeInput};
use foodgram_db::{
    entities::{recipe, user},
    repositories::{IngredientLineRow, RecipeFilter},
};
use serde::Serialize;

use crate::{
    endpoints::tags::TagResponse,
    endpoints::users::UserResponse,
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Paginated},
};

/// Compact recipe representation used in toggles and subscription previews.
#[derive(Serialize)]
pub struct RecipeShortResponse {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

impl From<recipe::Model> for RecipeShortResponse {
    fn from(recipe: recipe::Model) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// One ingredient line in a recipe response.
#[derive(Serialize)]
pub struct IngredientLineResponse {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<IngredientLineRow> for IngredientLineResponse {
    fn from(row: IngredientLineRow) -> Self {
        Self {
            id: row.ingredient_id,
            name: row.name,
            measurement_unit: row.measurement_unit,
            amount: row.amount,
        }
    }
}

/// Full recipe representation.
#[derive(Serialize)]
pub struct RecipeResponse {
    pub id: String,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<IngredientLineResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub description: String,
    pub cooking_time: i32,
}

impl RecipeResponse {
    /// Build a full representation of `recipe` as seen by `viewer`.
    pub async fn build(
        state: &AppState,
        viewer: Option<&user::Model>,
        recipe: recipe::Model,
    ) -> AppResult<Self> {
        let tags = state.recipe_service.tags_of(&recipe.id).await?;
        let lines = state.recipe_service.ingredient_lines_of(&recipe.id).await?;
        let author = state.user_service.get(&recipe.author_id).await?;
        let author = UserResponse::build(state, viewer, author).await?;

        let (is_favorited, is_in_shopping_cart) = match viewer {
            Some(viewer) => (
                state
                    .favorite_service
                    .is_favorited(&viewer.id, &recipe.id)
                    .await?,
                state
                    .cart_service
                    .is_in_cart(&viewer.id, &recipe.id)
                    .await?,
            ),
            None => (false, false),
        };

        Ok(Self {
            id: recipe.id,
            tags: tags.into_iter().map(Into::into).collect(),
            author,
            ingredients: lines.into_iter().map(Into::into).collect(),
            is_favorited,
            is_in_shopping_cart,
            name: recipe.name,
            image: recipe.image,
            description: recipe.description,
            cooking_time: recipe.cooking_time,
        })
    }
}

/// Parsed recipe listing query.
///
/// Parsed by hand from the raw pairs because `tags` is a repeatable
/// parameter (`?tags=lunch&tags=dinner`).
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RecipeListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeListQuery {
    fn parse_bool(value: &str) -> bool {
        matches!(value.to_ascii_lowercase().as_str(), "1" | "true")
    }

    /// Build a query from raw key/value pairs.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();

        for (key, value) in pairs {
            match key.as_str() {
                "page" => query.page = value.parse().ok(),
                "limit" => query.limit = value.parse().ok(),
                "author" => query.author = Some(value),
                "tags" => query.tags.push(value),
                "is_favorited" => query.is_favorited = Self::parse_bool(&value),
                "is_in_shopping_cart" => query.is_in_shopping_cart = Self::parse_bool(&value),
                _ => {}
            }
        }

        query
    }

    /// Convert into a repository filter for the given viewer.
    ///
    /// The favorite/cart flags only apply to authenticated callers; for
    /// anonymous callers they are ignored and the listing is unfiltered.
    #[must_use]
    pub fn into_filter(self, viewer: Option<&user::Model>) -> RecipeFilter {
        RecipeFilter {
            author_id: self.author,
            tag_slugs: self.tags,
            favorited_by: viewer
                .filter(|_| self.is_favorited)
                .map(|user| user.id.clone()),
            in_cart_of: viewer
                .filter(|_| self.is_in_shopping_cart)
                .map(|user| user.id.clone()),
        }
    }
}

/// List recipes (paginated, filterable).
async fn list(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<ApiResponse<Paginated<RecipeResponse>>> {
    let query = RecipeListQuery::from_pairs(pairs);
    let limit = state.page_size(query.limit);
    let offset = query.page.unwrap_or(1).saturating_sub(1) * limit;

    let filter = query.into_filter(viewer.as_ref());
    let (recipes, count) = state.recipe_service.list(&filter, limit, offset).await?;

    let mut results = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        results.push(RecipeResponse::build(&state, viewer.as_ref(), recipe).await?);
    }

    Ok(ApiResponse::ok(Paginated { count, results }))
}

/// Create a recipe.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RecipeInput>,
) -> AppResult<ApiResponse<RecipeResponse>> {
    let recipe = state.recipe_service.create(&user.id, input).await?;
    let response = RecipeResponse::build(&state, Some(&user), recipe).await?;

    Ok(ApiResponse::ok(response))
}

/// Get a recipe by ID.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RecipeResponse>> {
    let recipe = state.recipe_service.get(&id).await?;
    let response = RecipeResponse::build(&state, viewer.as_ref(), recipe).await?;

    Ok(ApiResponse::ok(response))
}

/// Replace a recipe (author or admin only).
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<RecipeInput>,
) -> AppResult<ApiResponse<RecipeResponse>> {
    let recipe = state.recipe_service.update(&user, &id, input).await?;
    let response = RecipeResponse::build(&state, Some(&user), recipe).await?;

    Ok(ApiResponse::ok(response))
}

/// Delete a recipe (author or admin only).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.recipe_service.delete(&user, &id).await?;

    Ok(ApiResponse::ok(()))
}

/// Add a recipe to favorites.
async fn favorite_add(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RecipeShortResponse>> {
    state.favorite_service.add(&user.id, &id).await?;
    let recipe = state.recipe_service.get(&id).await?;

    Ok(ApiResponse::ok(recipe.into()))
}

/// Remove a recipe from favorites.
async fn favorite_remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.favorite_service.remove(&user.id, &id).await?;

    Ok(ApiResponse::ok(()))
}

/// Add a recipe to the shopping cart.
async fn cart_add(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RecipeShortResponse>> {
    state.cart_service.add(&user.id, &id).await?;
    let recipe = state.recipe_service.get(&id).await?;

    Ok(ApiResponse::ok(recipe.into()))
}

/// Remove a recipe from the shopping cart.
async fn cart_remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.cart_service.remove(&user.id, &id).await?;

    Ok(ApiResponse::ok(()))
}

/// Download the aggregated shopping list as a text attachment.
async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let text = state.cart_service.shopping_list(&user).await?;
    let filename = CartService::shopping_list_filename(&user);

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/plain; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        text,
    )
        .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/download_shopping_cart", get(download_shopping_cart))
        .route("/{id}", get(show).patch(update).delete(delete))
        .route("/{id}/favorite", post(favorite_add).delete(favorite_remove))
        .route("/{id}/shopping_cart", post(cart_add).delete(cart_remove))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_query_collects_repeated_tags() {
        let query = RecipeListQuery::from_pairs(vec![
            pair("tags", "lunch"),
            pair("tags", "dinner"),
            pair("page", "2"),
        ]);

        assert_eq!(query.tags, vec!["lunch", "dinner"]);
        assert_eq!(query.page, Some(2));
    }

    #[test]
    fn test_query_parses_boolean_flags() {
        let query = RecipeListQuery::from_pairs(vec![
            pair("is_favorited", "1"),
            pair("is_in_shopping_cart", "true"),
        ]);

        assert!(query.is_favorited);
        assert!(query.is_in_shopping_cart);

        let query = RecipeListQuery::from_pairs(vec![pair("is_favorited", "0")]);
        assert!(!query.is_favorited);
    }

    #[test]
    fn test_anonymous_viewer_ignores_flag_filters() {
        let query = RecipeListQuery::from_pairs(vec![
            pair("is_favorited", "1"),
            pair("is_in_shopping_cart", "1"),
        ]);

        let filter = query.into_filter(None);

        assert!(filter.favorited_by.is_none());
        assert!(filter.in_cart_of.is_none());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let query = RecipeListQuery::from_pairs(vec![pair("unknown", "x")]);
        assert_eq!(query, RecipeListQuery::default());
    }
}
