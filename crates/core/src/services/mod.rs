//! Business logic services.

#![allow(missing_docs)]

pub mod cart;
pub mod favorite;
pub mod follow;
pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;

pub use cart::{CartService, ShoppingListItem};
pub use favorite::FavoriteService;
pub use follow::{FollowService, Subscription};
pub use ingredient::IngredientService;
pub use recipe::{IngredientAmount, RecipeInput, RecipeService};
pub use tag::TagService;
pub use user::{CreateUserInput, UserService};
