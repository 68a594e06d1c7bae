//! User and subscription endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Router,
};
use foodgram_common::AppResult;
use foodgram_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::recipes::RecipeShortResponse,
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Paginated},
};

/// User response.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserResponse {
    /// Build a response for `target` as seen by `viewer`.
    pub async fn build(
        state: &AppState,
        viewer: Option<&user::Model>,
        target: user::Model,
    ) -> AppResult<Self> {
        let is_subscribed = match viewer {
            Some(viewer) => {
                state
                    .follow_service
                    .is_following(&viewer.id, &target.id)
                    .await?
            }
            None => false,
        };

        Ok(Self {
            id: target.id,
            email: target.email,
            username: target.username,
            first_name: target.first_name,
            last_name: target.last_name,
            is_subscribed,
        })
    }
}

/// A followed author with a recipe preview.
#[derive(Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeShortResponse>,
    pub recipes_count: u64,
}

/// Page query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Subscription listing query parameters.
#[derive(Debug, Deserialize)]
pub struct SubscriptionsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Cap on the recipe preview per author; uncapped when absent.
    pub recipes_limit: Option<u64>,
}

/// List users (paginated).
async fn list(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Paginated<UserResponse>>> {
    let limit = state.page_size(query.limit);
    let offset = query.page.unwrap_or(1).saturating_sub(1) * limit;

    let (users, count) = state.user_service.list(limit, offset).await?;

    let mut results = Vec::with_capacity(users.len());
    for user in users {
        results.push(UserResponse::build(&state, viewer.as_ref(), user).await?);
    }

    Ok(ApiResponse::ok(Paginated { count, results }))
}

/// Get the current user.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    // A user is never subscribed to themselves
    let response = UserResponse::build(&state, None, user).await?;

    Ok(ApiResponse::ok(response))
}

/// Get a user by ID.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&id).await?;
    let response = UserResponse::build(&state, viewer.as_ref(), user).await?;

    Ok(ApiResponse::ok(response))
}

/// Recipes-limit query for the subscribe toggle.
#[derive(Debug, Deserialize)]
pub struct RecipesLimitQuery {
    pub recipes_limit: Option<u64>,
}

async fn build_subscription(
    state: &AppState,
    author: user::Model,
    recipes_limit: Option<u64>,
) -> AppResult<SubscriptionResponse> {
    let recipes = state
        .recipe_service
        .by_author(&author.id, recipes_limit)
        .await?;
    let recipes_count = state.recipe_service.count_by_author(&author.id).await?;

    Ok(SubscriptionResponse {
        id: author.id,
        email: author.email,
        username: author.username,
        first_name: author.first_name,
        last_name: author.last_name,
        is_subscribed: true,
        recipes: recipes.into_iter().map(Into::into).collect(),
        recipes_count,
    })
}

/// Subscribe to an author.
async fn subscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RecipesLimitQuery>,
) -> AppResult<ApiResponse<SubscriptionResponse>> {
    state.follow_service.follow(&user.id, &id).await?;

    let author = state.user_service.get(&id).await?;
    let response = build_subscription(&state, author, query.recipes_limit).await?;

    Ok(ApiResponse::ok(response))
}

/// Unsubscribe from an author.
async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.follow_service.unfollow(&user.id, &id).await?;

    Ok(ApiResponse::ok(()))
}

/// List the current user's subscriptions.
async fn subscriptions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SubscriptionsQuery>,
) -> AppResult<ApiResponse<Paginated<SubscriptionResponse>>> {
    let limit = state.page_size(query.limit);
    let offset = query.page.unwrap_or(1).saturating_sub(1) * limit;

    let (subscriptions, count) = state
        .follow_service
        .subscriptions(&user.id, limit, offset, query.recipes_limit)
        .await?;

    let results = subscriptions
        .into_iter()
        .map(|sub| SubscriptionResponse {
            id: sub.author.id,
            email: sub.author.email,
            username: sub.author.username,
            first_name: sub.author.first_name,
            last_name: sub.author.last_name,
            is_subscribed: true,
            recipes: sub.recipes.into_iter().map(Into::into).collect(),
            recipes_count: sub.recipes_count,
        })
        .collect();

    Ok(ApiResponse::ok(Paginated { count, results }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/me", get(me))
        .route("/subscriptions", get(subscriptions))
        .route("/{id}", get(show))
        .route("/{id}/subscribe", post(subscribe).delete(unsubscribe))
}
