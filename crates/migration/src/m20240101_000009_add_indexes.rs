use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Product: listing is ordered by creation time
        manager
            .create_index(
                Index::create()
                    .name("idx_product_created_at")
                    .table(Product::Table)
                    .col(Product::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Review: looked up per product
        manager
            .create_index(
                Index::create()
                    .name("idx_review_product")
                    .table(Review::Table)
                    .col(Review::ProductId)
                    .to_owned(),
            )
            .await?;

        // Review: one per (product, user)
        manager
            .create_index(
                Index::create()
                    .name("uniq_review_product_user")
                    .table(Review::Table)
                    .col(Review::ProductId)
                    .col(Review::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_product_created_at").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_review_product").table(Review::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_review_product_user").table(Review::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Product { Table, CreatedAt }

#[derive(DeriveIden)]
enum Review { Table, ProductId, UserId }
