//! Shopping cart service: cart toggles and shopping-list aggregation.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::{cart_entry, user},
    repositories::{CartIngredientRow, CartRepository, RecipeRepository},
};
use sea_orm::Set;

/// One aggregated shopping-list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    /// Ingredient name.
    pub name: String,
    /// Ingredient measurement unit.
    pub measurement_unit: String,
    /// Total amount summed across every cart recipe.
    pub amount: i64,
}

/// Shopping cart service.
#[derive(Clone)]
pub struct CartService {
    cart_repo: CartRepository,
    recipe_repo: RecipeRepository,
    id_gen: IdGenerator,
}

impl CartService {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(cart_repo: CartRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            cart_repo,
            recipe_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a recipe to the user's shopping cart.
    pub async fn add(&self, user_id: &str, recipe_id: &str) -> AppResult<cart_entry::Model> {
        // Check if recipe exists
        self.recipe_repo.get_by_id(recipe_id).await?;

        // Check if already in cart
        if self.cart_repo.is_in_cart(user_id, recipe_id).await? {
            return Err(AppError::Conflict(
                "Recipe is already in the shopping cart".to_string(),
            ));
        }

        let model = cart_entry::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            recipe_id: Set(recipe_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.cart_repo.create(model).await
    }

    /// Remove a recipe from the user's shopping cart.
    pub async fn remove(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        if !self.cart_repo.is_in_cart(user_id, recipe_id).await? {
            return Err(AppError::NotFound(
                "Recipe is not in the shopping cart".to_string(),
            ));
        }

        self.cart_repo
            .delete_by_user_and_recipe(user_id, recipe_id)
            .await
    }

    /// Check if a recipe is in the user's cart.
    pub async fn is_in_cart(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        self.cart_repo.is_in_cart(user_id, recipe_id).await
    }

    /// Build the aggregated shopping list for a user's cart.
    ///
    /// Ingredient amounts are summed across every cart recipe, grouped by
    /// (name, measurement unit) and ordered by name. An empty cart is a
    /// client error, not an empty report.
    pub async fn shopping_list(&self, user: &user::Model) -> AppResult<String> {
        if self.cart_repo.count_by_user(&user.id).await? == 0 {
            return Err(AppError::BadRequest("Shopping cart is empty".to_string()));
        }

        let rows = self.cart_repo.find_cart_ingredient_lines(&user.id).await?;
        let items = aggregate(rows);
        let today = chrono::Utc::now().date_naive();

        Ok(render(&user.full_name(), &items, today))
    }

    /// Download filename for a user's shopping list.
    #[must_use]
    pub fn shopping_list_filename(user: &user::Model) -> String {
        format!("{}_shopping_list.txt", user.username)
    }
}

/// Group ingredient lines by (name, measurement unit) and sum amounts.
///
/// The result is ordered by name (then unit) for deterministic output.
#[must_use]
pub fn aggregate(rows: Vec<CartIngredientRow>) -> Vec<ShoppingListItem> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();

    for row in rows {
        *totals
            .entry((row.name, row.measurement_unit))
            .or_insert(0) += i64::from(row.amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| ShoppingListItem {
            name,
            measurement_unit,
            amount,
        })
        .collect()
}

/// Render the shopping list as downloadable plain text.
#[must_use]
pub fn render(full_name: &str, items: &[ShoppingListItem], today: NaiveDate) -> String {
    let mut text = format!(
        "Shopping list for: {full_name}\n\nDate: {}\n\n",
        today.format("%Y-%m-%d")
    );

    text += &items
        .iter()
        .map(|item| format!("- {} ({}) - {}", item.name, item.measurement_unit, item.amount))
        .collect::<Vec<_>>()
        .join("\n");

    text += &format!("\n\nFoodgram ({})", today.year());
    text
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use foodgram_db::entities::recipe;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;

    fn row(name: &str, unit: &str, amount: i32) -> CartIngredientRow {
        CartIngredientRow {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: "chef".to_string(),
            username_lower: "chef".to_string(),
            email: "chef@example.com".to_string(),
            first_name: "Anna".to_string(),
            last_name: "Smith".to_string(),
            token: None,
            password_hash: None,
            is_admin: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_aggregate_sums_across_recipes() {
        let items = aggregate(vec![row("sugar", "g", 3), row("sugar", "g", 5)]);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "sugar");
        assert_eq!(items[0].measurement_unit, "g");
        assert_eq!(items[0].amount, 8);
    }

    #[test]
    fn test_aggregate_keeps_units_distinct() {
        let items = aggregate(vec![row("sugar", "g", 3), row("sugar", "tbsp", 2)]);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].measurement_unit, "g");
        assert_eq!(items[1].measurement_unit, "tbsp");
    }

    #[test]
    fn test_aggregate_orders_by_name() {
        let items = aggregate(vec![
            row("salt", "g", 1),
            row("butter", "g", 50),
            row("milk", "ml", 200),
        ]);

        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["butter", "milk", "salt"]);
    }

    #[test]
    fn test_render_format() {
        let items = aggregate(vec![row("flour", "g", 200), row("milk", "ml", 300)]);
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let text = render("Anna Smith", &items, date);

        assert!(text.starts_with("Shopping list for: Anna Smith\n\nDate: 2024-03-01\n\n"));
        assert!(text.contains("- flour (g) - 200\n- milk (ml) - 300"));
        assert!(text.ends_with("Foodgram (2024)"));
    }

    #[tokio::test]
    async fn test_shopping_list_empty_cart_is_bad_request() {
        let cart_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![btreemap! {
                    "num_items" => Value::BigInt(Some(0)),
                }]])
                .into_connection(),
        );
        let recipe_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = CartService::new(
            CartRepository::new(cart_db),
            RecipeRepository::new(recipe_db),
        );

        let result = service.shopping_list(&create_test_user("user1")).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_shopping_list_aggregates_cart() {
        let cart_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![btreemap! {
                    "num_items" => Value::BigInt(Some(2)),
                }]])
                .append_query_results([vec![
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
                ]])
                .into_connection(),
        );
        let recipe_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = CartService::new(
            CartRepository::new(cart_db),
            RecipeRepository::new(recipe_db),
        );

        let text = service
            .shopping_list(&create_test_user("user1"))
            .await
            .unwrap();

        assert!(text.contains("- sugar (g) - 8"));
    }

    #[tokio::test]
    async fn test_add_already_in_cart_is_conflict() {
        let recipe = recipe::Model {
            id: "r1".to_string(),
            author_id: "user1".to_string(),
            name: "Pancakes".to_string(),
            image: None,
            description: "Mix and fry".to_string(),
            cooking_time: 10,
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let entry = cart_entry::Model {
            id: "c1".to_string(),
            user_id: "user2".to_string(),
            recipe_id: "r1".to_string(),
            created_at: Utc::now().into(),
        };

        let cart_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry]])
                .into_connection(),
        );
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recipe]])
                .into_connection(),
        );

        let service = CartService::new(
            CartRepository::new(cart_db),
            RecipeRepository::new(recipe_db),
        );

        let result = service.add("user2", "r1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_remove_not_in_cart_is_not_found() {
        let cart_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<cart_entry::Model>::new()])
                .into_connection(),
        );
        let recipe_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = CartService::new(
            CartRepository::new(cart_db),
            RecipeRepository::new(recipe_db),
        );

        let result = service.remove("user2", "r1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_shopping_list_filename() {
        let user = create_test_user("user1");
        assert_eq!(
            CartService::shopping_list_filename(&user),
            "chef_shopping_list.txt"
        );
    }
}
