//! Follow service (subscriptions to recipe authors).

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::{follow, recipe, user},
    repositories::{FollowRepository, RecipeRepository, UserRepository},
};
use sea_orm::Set;

/// A followed author annotated with a recipe preview and a recipe count.
#[derive(Debug, Clone)]
pub struct Subscription {
    /// The followed author.
    pub author: user::Model,
    /// The author's recipes, newest first, capped by the caller's limit.
    pub recipes: Vec<recipe::Model>,
    /// The author's total recipe count.
    pub recipes_count: u64,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    recipe_repo: RecipeRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(
        follow_repo: FollowRepository,
        user_repo: UserRepository,
        recipe_repo: RecipeRepository,
    ) -> Self {
        Self {
            follow_repo,
            user_repo,
            recipe_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Subscribe to an author.
    pub async fn follow(&self, follower_id: &str, author_id: &str) -> AppResult<follow::Model> {
        // Can't subscribe to yourself
        if follower_id == author_id {
            return Err(AppError::Validation(
                "Cannot subscribe to yourself".to_string(),
            ));
        }

        // The author must exist
        self.user_repo.get_by_id(author_id).await?;

        // Check if already subscribed
        if self.follow_repo.is_following(follower_id, author_id).await? {
            return Err(AppError::Conflict(
                "Already subscribed to this user".to_string(),
            ));
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            author_id: Set(author_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.follow_repo.create(model).await
    }

    /// Unsubscribe from an author.
    pub async fn unfollow(&self, follower_id: &str, author_id: &str) -> AppResult<()> {
        if !self.follow_repo.is_following(follower_id, author_id).await? {
            return Err(AppError::NotFound(
                "Not subscribed to this user".to_string(),
            ));
        }

        self.follow_repo
            .delete_by_pair(follower_id, author_id)
            .await
    }

    /// Check if a user is subscribed to an author.
    pub async fn is_following(&self, follower_id: &str, author_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, author_id).await
    }

    /// List the authors a user is subscribed to (paginated, newest first),
    /// each annotated with a recipe preview and recipe count, plus the total
    /// number of subscriptions.
    pub async fn subscriptions(
        &self,
        follower_id: &str,
        limit: u64,
        offset: u64,
        recipes_limit: Option<u64>,
    ) -> AppResult<(Vec<Subscription>, u64)> {
        let follows = self
            .follow_repo
            .find_following(follower_id, limit, offset)
            .await?;
        let total = self.follow_repo.count_following(follower_id).await?;

        let mut subscriptions = Vec::with_capacity(follows.len());
        for follow in follows {
            let author = self.user_repo.get_by_id(&follow.author_id).await?;
            let recipes = self
                .recipe_repo
                .find_by_author(&follow.author_id, recipes_limit)
                .await?;
            let recipes_count = self.recipe_repo.count_by_author(&follow.author_id).await?;

            subscriptions.push(Subscription {
                author,
                recipes,
                recipes_count,
            });
        }

        Ok((subscriptions, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            email: format!("{username}@example.com"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            token: None,
            password_hash: None,
            is_admin: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_follow(id: &str, follower_id: &str, author_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            author_id: author_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(
        follow_db: MockDatabase,
        user_db: MockDatabase,
        recipe_db: MockDatabase,
    ) -> FollowService {
        FollowService::new(
            FollowRepository::new(Arc::new(follow_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
            RecipeRepository::new(Arc::new(recipe_db.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_follow_yourself_is_rejected() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.follow("user1", "user1").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_follow_yourself_rejected_even_when_relation_exists() {
        // The self-check fires before any relation lookup
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_follow("f1", "user1", "user1")]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.follow("user1", "user1").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_follow_unknown_author_is_not_found() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.follow("user1", "missing").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_follow_twice_is_conflict() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_follow("f1", "user1", "user2")]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user2", "author")]]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.follow("user1", "user2").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unfollow_without_subscription_is_not_found() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.unfollow("user1", "user2").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
