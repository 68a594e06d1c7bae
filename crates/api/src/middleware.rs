//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use foodgram_common::config::PaginationConfig;
use foodgram_core::{
    CartService, FavoriteService, FollowService, IngredientService, RecipeService, TagService,
    UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub recipe_service: RecipeService,
    pub favorite_service: FavoriteService,
    pub cart_service: CartService,
    pub follow_service: FollowService,
    pub tag_service: TagService,
    pub ingredient_service: IngredientService,
    pub pagination: PaginationConfig,
}

impl AppState {
    /// Resolve a requested page size against the configured bounds.
    #[must_use]
    pub fn page_size(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.pagination.page_size)
            .clamp(1, self.pagination.max_page_size)
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` into the request extensions;
/// endpoints pick the user up through the `AuthUser` / `MaybeAuthUser`
/// extractors.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        // Authenticate user by token
        if let Ok(user) = state.user_service.authenticate_by_token(token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}
