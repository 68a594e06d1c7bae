//! Shopping cart repository.

use std::sync::Arc;

use crate::entities::{cart_entry, ingredient, recipe_ingredient, CartEntry, RecipeIngredient};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, SqlErr,
};

/// One ingredient line drawn from a recipe in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct CartIngredientRow {
    /// Ingredient name.
    pub name: String,
    /// Ingredient measurement unit.
    pub measurement_unit: String,
    /// Quantity in one recipe.
    pub amount: i32,
}

/// Cart entry repository for database operations.
#[derive(Clone)]
pub struct CartRepository {
    db: Arc<DatabaseConnection>,
}

impl CartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a cart entry by user and recipe.
    pub async fn find_by_user_and_recipe(
        &self,
        user_id: &str,
        recipe_id: &str,
    ) -> AppResult<Option<cart_entry::Model>> {
        CartEntry::find()
            .filter(cart_entry::Column::UserId.eq(user_id))
            .filter(cart_entry::Column::RecipeId.eq(recipe_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a recipe is in a user's cart.
    pub async fn is_in_cart(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_recipe(user_id, recipe_id)
            .await?
            .is_some())
    }

    /// Create a new cart entry.
    ///
    /// A racing duplicate insert is rejected by the unique index and
    /// surfaces as a Conflict, not a storage error.
    pub async fn create(&self, model: cart_entry::ActiveModel) -> AppResult<cart_entry::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Recipe is already in the shopping cart".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Delete a cart entry by user and recipe.
    pub async fn delete_by_user_and_recipe(
        &self,
        user_id: &str,
        recipe_id: &str,
    ) -> AppResult<()> {
        CartEntry::delete_many()
            .filter(cart_entry::Column::UserId.eq(user_id))
            .filter(cart_entry::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count cart entries for a user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        CartEntry::find()
            .filter(cart_entry::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Collect every ingredient line of every recipe in the user's cart.
    ///
    /// Aggregation (grouping and summing) happens in the service layer; this
    /// returns one row per ingredient line.
    pub async fn find_cart_ingredient_lines(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<CartIngredientRow>> {
        RecipeIngredient::find()
            .select_only()
            .column_as(ingredient::Column::Name, "name")
            .column_as(ingredient::Column::MeasurementUnit, "measurement_unit")
            .column_as(recipe_ingredient::Column::Amount, "amount")
            .join(
                JoinType::InnerJoin,
                recipe_ingredient::Relation::Ingredient.def(),
            )
            .join(JoinType::InnerJoin, recipe_ingredient::Relation::Recipe.def())
            .join(JoinType::InnerJoin, cart_entry::Relation::Recipe.def().rev())
            .filter(cart_entry::Column::UserId.eq(user_id))
            .into_model::<CartIngredientRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn create_test_entry(id: &str, user_id: &str, recipe_id: &str) -> cart_entry::Model {
        cart_entry::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            recipe_id: recipe_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_in_cart() {
        let entry = create_test_entry("c1", "user1", "r1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry.clone()]])
                .into_connection(),
        );

        let repo = CartRepository::new(db);
        let result = repo.is_in_cart("user1", "r1").await.unwrap();

        assert!(result);
    }

    #[tokio::test]
    async fn test_is_not_in_cart() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<cart_entry::Model>::new()])
                .into_connection(),
        );

        let repo = CartRepository::new(db);
        let result = repo.is_in_cart("user1", "r1").await.unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_find_cart_ingredient_lines() {
        let rows = vec![
            btreemap! {
                "name" => Value::from("sugar"),
                "measurement_unit" => Value::from("g"),
                "amount" => Value::from(3),
            },
            btreemap! {
                "name" => Value::from("sugar"),
                "measurement_unit" => Value::from("g"),
                "amount" => Value::from(5),
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([rows])
                .into_connection(),
        );

        let repo = CartRepository::new(db);
        let lines = repo.find_cart_ingredient_lines("user1").await.unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "sugar");
        assert_eq!(lines[0].amount + lines[1].amount, 8);
    }
}
