//! Create `product` table with FK to the owning `user`. Listings outlive
//! their owner; the FK is nulled when the user is removed.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(uuid(Product::Id).primary_key())
                    .col(uuid_null(Product::UserId))
                    .col(string_len(Product::Name, 255).not_null())
                    .col(string_len(Product::Image, 512).not_null())
                    .col(string_len(Product::Brand, 128).not_null())
                    .col(string_len(Product::Category, 128).not_null())
                    .col(text(Product::Description).not_null())
                    .col(decimal_len(Product::Price, 12, 2).not_null())
                    .col(double(Product::Rating).not_null().default(0.0))
                    .col(integer(Product::NumReviews).not_null().default(0))
                    .col(integer(Product::CountInStock).not_null().default(0))
                    .col(timestamp_with_time_zone(Product::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Product::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_user")
                            .from(Product::Table, Product::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product {
    Table,
    Id,
    UserId,
    Name,
    Image,
    Brand,
    Category,
    Description,
    Price,
    Rating,
    NumReviews,
    CountInStock,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
