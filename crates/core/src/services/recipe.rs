//! Recipe service.

use std::collections::HashSet;

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::{recipe, recipe_ingredient, recipe_tag, tag, user},
    repositories::{
        IngredientLineRow, IngredientRepository, RecipeFilter, RecipeRepository, TagRepository,
    },
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// One submitted ingredient line: an ingredient reference plus a quantity.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmount {
    /// Referenced ingredient ID.
    pub id: String,
    /// Quantity in the ingredient's measurement unit.
    pub amount: i32,
}

/// Input for creating or replacing a recipe.
#[derive(Debug, Deserialize, Validate)]
pub struct RecipeInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1))]
    pub description: String,

    /// Cooking time in minutes.
    pub cooking_time: i32,

    /// Opaque image reference, stored verbatim.
    pub image: Option<String>,

    /// Submitted ingredient lines.
    pub ingredients: Vec<IngredientAmount>,

    /// Submitted tag IDs.
    pub tags: Vec<String>,
}

/// Recipe service for business logic.
#[derive(Clone)]
pub struct RecipeService {
    recipe_repo: RecipeRepository,
    ingredient_repo: IngredientRepository,
    tag_repo: TagRepository,
    id_gen: IdGenerator,
}

impl RecipeService {
    /// Create a new recipe service.
    #[must_use]
    pub const fn new(
        recipe_repo: RecipeRepository,
        ingredient_repo: IngredientRepository,
        tag_repo: TagRepository,
    ) -> Self {
        Self {
            recipe_repo,
            ingredient_repo,
            tag_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Validate a recipe payload against the domain rules.
    async fn validate_input(&self, input: &RecipeInput) -> AppResult<()> {
        input.validate()?;

        if input.cooking_time < 1 {
            return Err(AppError::Validation(
                "Cooking time must be at least 1 minute".to_string(),
            ));
        }

        if input.ingredients.is_empty() {
            return Err(AppError::Validation(
                "At least one ingredient is required".to_string(),
            ));
        }

        if input.tags.is_empty() {
            return Err(AppError::Validation(
                "At least one tag is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for line in &input.ingredients {
            if line.amount < 1 {
                return Err(AppError::Validation(
                    "Ingredient amount must be at least 1".to_string(),
                ));
            }
            if !seen.insert(line.id.as_str()) {
                return Err(AppError::Validation(format!(
                    "Duplicate ingredient: <{}>",
                    line.id
                )));
            }
        }

        // Every referenced ingredient must exist
        let ids: Vec<String> = input.ingredients.iter().map(|l| l.id.clone()).collect();
        let found = self.ingredient_repo.find_by_ids(&ids).await?;
        let found_ids: HashSet<&str> = found.iter().map(|i| i.id.as_str()).collect();
        for id in &ids {
            if !found_ids.contains(id.as_str()) {
                return Err(AppError::Validation(format!("Unknown ingredient: <{id}>")));
            }
        }

        // Every referenced tag must exist
        let tags = self.tag_repo.find_by_ids(&input.tags).await?;
        let tag_ids: HashSet<&str> = tags.iter().map(|t| t.id.as_str()).collect();
        for id in &input.tags {
            if !tag_ids.contains(id.as_str()) {
                return Err(AppError::Validation(format!("Unknown tag: <{id}>")));
            }
        }

        Ok(())
    }

    fn ingredient_lines(
        &self,
        recipe_id: &str,
        input: &RecipeInput,
    ) -> Vec<recipe_ingredient::ActiveModel> {
        input
            .ingredients
            .iter()
            .map(|line| recipe_ingredient::ActiveModel {
                id: Set(self.id_gen.generate()),
                recipe_id: Set(recipe_id.to_string()),
                ingredient_id: Set(line.id.clone()),
                amount: Set(line.amount),
            })
            .collect()
    }

    fn tag_links(&self, recipe_id: &str, input: &RecipeInput) -> Vec<recipe_tag::ActiveModel> {
        input
            .tags
            .iter()
            .map(|tag_id| recipe_tag::ActiveModel {
                id: Set(self.id_gen.generate()),
                recipe_id: Set(recipe_id.to_string()),
                tag_id: Set(tag_id.clone()),
            })
            .collect()
    }

    /// Create a new recipe with its ingredient lines and tags.
    pub async fn create(&self, author_id: &str, input: RecipeInput) -> AppResult<recipe::Model> {
        self.validate_input(&input).await?;

        let recipe_id = self.id_gen.generate();
        let header = recipe::ActiveModel {
            id: Set(recipe_id.clone()),
            author_id: Set(author_id.to_string()),
            name: Set(input.name.clone()),
            image: Set(input.image.clone()),
            description: Set(input.description.clone()),
            cooking_time: Set(input.cooking_time),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        self.recipe_repo
            .create_with_relations(
                header,
                self.ingredient_lines(&recipe_id, &input),
                self.tag_links(&recipe_id, &input),
            )
            .await
    }

    /// Replace a recipe: update the header and swap the full ingredient-line
    /// and tag set. Only the author or an administrator may do this.
    pub async fn update(
        &self,
        actor: &user::Model,
        recipe_id: &str,
        input: RecipeInput,
    ) -> AppResult<recipe::Model> {
        let existing = self.recipe_repo.get_by_id(recipe_id).await?;
        Self::check_owner(actor, &existing)?;

        self.validate_input(&input).await?;

        let mut header: recipe::ActiveModel = existing.into();
        header.name = Set(input.name.clone());
        header.image = Set(input.image.clone());
        header.description = Set(input.description.clone());
        header.cooking_time = Set(input.cooking_time);
        header.updated_at = Set(Some(chrono::Utc::now().into()));

        self.recipe_repo
            .update_with_relations(
                header,
                self.ingredient_lines(recipe_id, &input),
                self.tag_links(recipe_id, &input),
            )
            .await
    }

    /// Delete a recipe. Only the author or an administrator may do this.
    pub async fn delete(&self, actor: &user::Model, recipe_id: &str) -> AppResult<()> {
        let existing = self.recipe_repo.get_by_id(recipe_id).await?;
        Self::check_owner(actor, &existing)?;

        self.recipe_repo.delete(recipe_id).await
    }

    fn check_owner(actor: &user::Model, recipe: &recipe::Model) -> AppResult<()> {
        if recipe.author_id != actor.id && !actor.is_admin {
            return Err(AppError::Forbidden(
                "Only the author may modify this recipe".to_string(),
            ));
        }
        Ok(())
    }

    /// Get a recipe by ID.
    pub async fn get(&self, id: &str) -> AppResult<recipe::Model> {
        self.recipe_repo.get_by_id(id).await
    }

    /// List recipes matching the filter with the total count.
    pub async fn list(
        &self,
        filter: &RecipeFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<recipe::Model>, u64)> {
        let recipes = self.recipe_repo.list(filter, limit, offset).await?;
        let total = self.recipe_repo.count(filter).await?;
        Ok((recipes, total))
    }

    /// Get an author's recipes (newest first, optionally capped).
    pub async fn by_author(
        &self,
        author_id: &str,
        limit: Option<u64>,
    ) -> AppResult<Vec<recipe::Model>> {
        self.recipe_repo.find_by_author(author_id, limit).await
    }

    /// Count an author's recipes.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        self.recipe_repo.count_by_author(author_id).await
    }

    /// Get a recipe's ingredient lines with ingredient reference data.
    pub async fn ingredient_lines_of(&self, recipe_id: &str) -> AppResult<Vec<IngredientLineRow>> {
        self.recipe_repo.find_ingredient_lines(recipe_id).await
    }

    /// Get a recipe's tags.
    pub async fn tags_of(&self, recipe_id: &str) -> AppResult<Vec<tag::Model>> {
        self.recipe_repo.find_tags(recipe_id).await
    }
}
