use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::product;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    /// `None` once the author has been deleted; `name` is kept.
    pub user_id: Option<Uuid>,
    pub name: String,
    pub rating: i32,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Product,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Product => Entity::belongs_to(product::Entity)
                .from(Column::ProductId)
                .to(product::Column::Id)
                .into(),
        }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_rating(rating: i32) -> Result<(), ModelError> {
    if !(1..=5).contains(&rating) {
        return Err(ModelError::Validation("rating must be between 1 and 5".into()));
    }
    Ok(())
}

/// Insert a review and refresh the product's `rating`/`num_reviews` in the same transaction.
pub async fn create(
    db: &DatabaseConnection,
    product_id: Uuid,
    user_id: Uuid,
    name: &str,
    rating: i32,
    comment: &str,
) -> Result<Model, ModelError> {
    validate_rating(rating)?;
    let txn = db.begin().await.map_err(ModelError::from_db)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        user_id: Set(Some(user_id)),
        name: Set(name.to_string()),
        rating: Set(rating),
        comment: Set(comment.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(&txn).await.map_err(ModelError::from_db)?;

    let all = Entity::find()
        .filter(Column::ProductId.eq(product_id))
        .all(&txn)
        .await
        .map_err(ModelError::from_db)?;
    let mut prod: product::ActiveModel = product::Entity::find_by_id(product_id)
        .one(&txn)
        .await
        .map_err(ModelError::from_db)?
        .ok_or_else(|| ModelError::Validation("product not found".into()))?
        .into();
    prod.num_reviews = Set(all.len() as i32);
    prod.rating = Set(average_rating(&all));
    prod.updated_at = Set(now);
    prod.update(&txn).await.map_err(ModelError::from_db)?;

    txn.commit().await.map_err(ModelError::from_db)?;
    Ok(created)
}

pub fn average_rating(reviews: &[Model]) -> f64 {
    if reviews.is_empty() { return 0.0; }
    let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    sum as f64 / reviews.len() as f64
}
