use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, DatabaseConnection, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{review, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// `None` once the listing user has been deleted.
    pub user_id: Option<Uuid>,
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub rating: f64,
    pub num_reviews: i32,
    pub count_in_stock: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Review,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Review => Entity::has_many(review::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<review::Entity> for Entity {
    fn to() -> RelationDef { Relation::Review.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields supplied when a product is first listed; counters start at zero.
#[derive(Clone, Debug)]
pub struct NewProduct {
    pub user_id: Uuid,
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: Decimal,
    pub count_in_stock: i32,
}

pub async fn create(db: &DatabaseConnection, input: NewProduct) -> Result<Model, ModelError> {
    if input.name.trim().is_empty() { return Err(ModelError::Validation("name required".into())); }
    if input.price.is_sign_negative() { return Err(ModelError::Validation("price must not be negative".into())); }
    if input.count_in_stock < 0 { return Err(ModelError::Validation("stock must not be negative".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(input.user_id)),
        name: Set(input.name),
        image: Set(input.image),
        brand: Set(input.brand),
        category: Set(input.category),
        description: Set(input.description),
        price: Set(input.price),
        rating: Set(0.0),
        num_reviews: Set(0),
        count_in_stock: Set(input.count_in_stock),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(ModelError::from_db)
}

/// One page ordered by creation time, plus the total row count.
pub async fn list_page(db: &DatabaseConnection, page_idx: u64, per_page: u64) -> Result<(Vec<Model>, u64), ModelError> {
    let paginator = Entity::find()
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ModelError::from_db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ModelError::from_db)?;
    Ok((items, total))
}

pub async fn find_with_reviews(db: &DatabaseConnection, id: Uuid) -> Result<Option<(Model, Vec<review::Model>)>, ModelError> {
    let Some(found) = Entity::find_by_id(id).one(db).await.map_err(ModelError::from_db)? else {
        return Ok(None);
    };
    let reviews = found
        .find_related(review::Entity)
        .order_by_asc(review::Column::CreatedAt)
        .all(db)
        .await
        .map_err(ModelError::from_db)?;
    Ok(Some((found, reviews)))
}
