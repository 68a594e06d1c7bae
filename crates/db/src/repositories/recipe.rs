//! Recipe repository.

use std::sync::Arc;

use crate::entities::{
    cart_entry, favorite, ingredient, recipe, recipe_ingredient, recipe_tag, tag, Recipe,
    RecipeIngredient, RecipeTag,
};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};

/// Filters applied to recipe listings.
#[derive(Debug, Default, Clone)]
pub struct RecipeFilter {
    /// Only recipes owned by this author.
    pub author_id: Option<String>,
    /// Only recipes carrying at least one of these tag slugs.
    pub tag_slugs: Vec<String>,
    /// Only recipes favorited by this user.
    pub favorited_by: Option<String>,
    /// Only recipes in this user's shopping cart.
    pub in_cart_of: Option<String>,
}

/// One ingredient line joined with its ingredient's reference data.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct IngredientLineRow {
    /// Referenced ingredient ID.
    pub ingredient_id: String,
    /// Ingredient name.
    pub name: String,
    /// Ingredient measurement unit.
    pub measurement_unit: String,
    /// Quantity of the ingredient.
    pub amount: i32,
}

/// Recipe repository for database operations.
#[derive(Clone)]
pub struct RecipeRepository {
    db: Arc<DatabaseConnection>,
}

impl RecipeRepository {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a recipe by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<recipe::Model>> {
        Recipe::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a recipe by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<recipe::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RecipeNotFound(id.to_string()))
    }

    /// Create a recipe header together with its ingredient lines and tag
    /// links in one transaction.
    pub async fn create_with_relations(
        &self,
        header: recipe::ActiveModel,
        lines: Vec<recipe_ingredient::ActiveModel>,
        tag_links: Vec<recipe_tag::ActiveModel>,
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = header
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !lines.is_empty() {
            RecipeIngredient::insert_many(lines)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        if !tag_links.is_empty() {
            RecipeTag::insert_many(tag_links)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Update a recipe header and replace its entire ingredient-line and tag
    /// set in one transaction (clear-then-recreate, not a diff).
    pub async fn update_with_relations(
        &self,
        header: recipe::ActiveModel,
        lines: Vec<recipe_ingredient::ActiveModel>,
        tag_links: Vec<recipe_tag::ActiveModel>,
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = header
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        RecipeIngredient::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(updated.id.clone()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        RecipeTag::delete_many()
            .filter(recipe_tag::Column::RecipeId.eq(updated.id.clone()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !lines.is_empty() {
            RecipeIngredient::insert_many(lines)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        if !tag_links.is_empty() {
            RecipeTag::insert_many(tag_links)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Delete a recipe by ID; ingredient lines and link rows cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Recipe::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    fn filtered(filter: &RecipeFilter) -> sea_orm::Select<Recipe> {
        let mut query = Recipe::find();

        if let Some(ref author_id) = filter.author_id {
            query = query.filter(recipe::Column::AuthorId.eq(author_id.clone()));
        }

        if !filter.tag_slugs.is_empty() {
            query = query
                .join(JoinType::InnerJoin, recipe::Relation::TagLinks.def())
                .join(JoinType::InnerJoin, recipe_tag::Relation::Tag.def())
                .filter(tag::Column::Slug.is_in(filter.tag_slugs.clone()))
                .distinct();
        }

        if let Some(ref user_id) = filter.favorited_by {
            query = query
                .join(JoinType::InnerJoin, favorite::Relation::Recipe.def().rev())
                .filter(favorite::Column::UserId.eq(user_id.clone()));
        }

        if let Some(ref user_id) = filter.in_cart_of {
            query = query
                .join(JoinType::InnerJoin, cart_entry::Relation::Recipe.def().rev())
                .filter(cart_entry::Column::UserId.eq(user_id.clone()));
        }

        query
    }

    /// List recipes matching the filter (paginated, newest first).
    pub async fn list(
        &self,
        filter: &RecipeFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<recipe::Model>> {
        Self::filtered(filter)
            .order_by_desc(recipe::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count recipes matching the filter.
    pub async fn count(&self, filter: &RecipeFilter) -> AppResult<u64> {
        Self::filtered(filter)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an author's recipes (newest first, optionally capped).
    pub async fn find_by_author(
        &self,
        author_id: &str,
        limit: Option<u64>,
    ) -> AppResult<Vec<recipe::Model>> {
        let mut query = Recipe::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .order_by_desc(recipe::Column::CreatedAt);

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count an author's recipes.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Recipe::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a recipe's ingredient lines joined with ingredient reference data.
    pub async fn find_ingredient_lines(&self, recipe_id: &str) -> AppResult<Vec<IngredientLineRow>> {
        RecipeIngredient::find()
            .select_only()
            .column_as(recipe_ingredient::Column::IngredientId, "ingredient_id")
            .column_as(ingredient::Column::Name, "name")
            .column_as(ingredient::Column::MeasurementUnit, "measurement_unit")
            .column_as(recipe_ingredient::Column::Amount, "amount")
            .join(
                JoinType::InnerJoin,
                recipe_ingredient::Relation::Ingredient.def(),
            )
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .into_model::<IngredientLineRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the tags attached to a recipe.
    pub async fn find_tags(&self, recipe_id: &str) -> AppResult<Vec<tag::Model>> {
        tag::Entity::find()
            .join(JoinType::InnerJoin, recipe_tag::Relation::Tag.def().rev())
            .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
