//! Ingredient service (read-only reference data).

use foodgram_common::AppResult;
use foodgram_db::{entities::ingredient, repositories::IngredientRepository};

/// Ingredient service.
#[derive(Clone)]
pub struct IngredientService {
    ingredient_repo: IngredientRepository,
}

impl IngredientService {
    /// Create a new ingredient service.
    #[must_use]
    pub const fn new(ingredient_repo: IngredientRepository) -> Self {
        Self { ingredient_repo }
    }

    /// List ingredients, optionally restricted to a name prefix.
    pub async fn list(&self, name_prefix: Option<&str>) -> AppResult<Vec<ingredient::Model>> {
        match name_prefix {
            Some(prefix) if !prefix.is_empty() => {
                self.ingredient_repo.search_by_prefix(prefix).await
            }
            _ => self.ingredient_repo.find_all().await,
        }
    }

    /// Get an ingredient by ID.
    pub async fn get(&self, id: &str) -> AppResult<ingredient::Model> {
        self.ingredient_repo.get_by_id(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_ingredient(id: &str, name: &str) -> ingredient::Model {
        ingredient::Model {
            id: id.to_string(),
            name: name.to_string(),
            measurement_unit: "g".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_without_prefix_returns_all() {
        let flour = create_test_ingredient("ing1", "flour");
        let sugar = create_test_ingredient("ing2", "sugar");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[flour, sugar]])
                .into_connection(),
        );

        let service = IngredientService::new(IngredientRepository::new(db));
        let result = service.list(None).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_list_with_empty_prefix_returns_all() {
        let flour = create_test_ingredient("ing1", "flour");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[flour]])
                .into_connection(),
        );

        let service = IngredientService::new(IngredientRepository::new(db));
        let result = service.list(Some("")).await.unwrap();

        assert_eq!(result.len(), 1);
    }
}
