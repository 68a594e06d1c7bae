//! Favorite service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::favorite,
    repositories::{FavoriteRepository, RecipeRepository},
};
use sea_orm::Set;

/// Favorite service for managing recipe bookmarks.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    recipe_repo: RecipeRepository,
    id_gen: IdGenerator,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub const fn new(favorite_repo: FavoriteRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            favorite_repo,
            recipe_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a recipe to favorites.
    pub async fn add(&self, user_id: &str, recipe_id: &str) -> AppResult<favorite::Model> {
        // Check if recipe exists
        self.recipe_repo.get_by_id(recipe_id).await?;

        // Check if already favorited
        if self.favorite_repo.is_favorited(user_id, recipe_id).await? {
            return Err(AppError::Conflict(
                "Recipe is already in favorites".to_string(),
            ));
        }

        let model = favorite::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            recipe_id: Set(recipe_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.favorite_repo.create(model).await
    }

    /// Remove a recipe from favorites.
    pub async fn remove(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        if !self.favorite_repo.is_favorited(user_id, recipe_id).await? {
            return Err(AppError::NotFound(
                "Recipe is not in favorites".to_string(),
            ));
        }

        self.favorite_repo
            .delete_by_user_and_recipe(user_id, recipe_id)
            .await
    }

    /// Check if a recipe is favorited by a user.
    pub async fn is_favorited(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        self.favorite_repo.is_favorited(user_id, recipe_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use foodgram_db::entities::recipe;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_recipe(id: &str) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            author_id: "user1".to_string(),
            name: "Pancakes".to_string(),
            image: None,
            description: "Mix and fry".to_string(),
            cooking_time: 10,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_favorite(id: &str, user_id: &str, recipe_id: &str) -> favorite::Model {
        favorite::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            recipe_id: recipe_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_add_already_favorited_is_conflict() {
        let recipe = create_test_recipe("r1");
        let fav = create_test_favorite("fav1", "user2", "r1");

        let fav_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fav]])
                .into_connection(),
        );
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe]])
                .into_connection(),
        );

        let service = FavoriteService::new(
            FavoriteRepository::new(fav_db),
            RecipeRepository::new(recipe_db),
        );

        let result = service.add("user2", "r1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_add_missing_recipe_is_not_found() {
        let fav_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );

        let service = FavoriteService::new(
            FavoriteRepository::new(fav_db),
            RecipeRepository::new(recipe_db),
        );

        let result = service.add("user2", "missing").await;

        assert!(matches!(result, Err(AppError::RecipeNotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_not_favorited_is_not_found() {
        let fav_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<favorite::Model>::new()])
                .into_connection(),
        );
        let recipe_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FavoriteService::new(
            FavoriteRepository::new(fav_db),
            RecipeRepository::new(recipe_db),
        );

        let result = service.remove("user2", "r1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_creates_favorite() {
        let recipe = create_test_recipe("r1");
        let created = create_test_favorite("fav1", "user2", "r1");

        let fav_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // Existence check finds nothing, then insert returns the row
                .append_query_results([Vec::<favorite::Model>::new()])
                .append_query_results([[created]])
                .into_connection(),
        );
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe]])
                .into_connection(),
        );

        let service = FavoriteService::new(
            FavoriteRepository::new(fav_db),
            RecipeRepository::new(recipe_db),
        );

        let result = service.add("user2", "r1").await.unwrap();

        assert_eq!(result.user_id, "user2");
        assert_eq!(result.recipe_id, "r1");
    }
}
