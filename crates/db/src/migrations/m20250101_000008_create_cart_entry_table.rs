//! Create cart entry table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CartEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CartEntry::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CartEntry::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(CartEntry::RecipeId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(CartEntry::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_entry_user")
                            .from(CartEntry::Table, CartEntry::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_entry_recipe")
                            .from(CartEntry::Table, CartEntry::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, recipe_id) - one cart entry per recipe
        manager
            .create_index(
                Index::create()
                    .name("idx_cart_entry_user_recipe")
                    .table(CartEntry::Table)
                    .col(CartEntry::UserId)
                    .col(CartEntry::RecipeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CartEntry::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CartEntry {
    Table,
    Id,
    UserId,
    RecipeId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Recipe {
    Table,
    Id,
}
