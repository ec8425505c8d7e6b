use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::ModelError;
use crate::product;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Product,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Product => Entity::has_many(product::Entity).into() }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub const MAX_NAME_LEN: usize = 128;
pub const MAX_EMAIL_LEN: usize = 255;

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let trimmed = name.trim();
    if trimmed.is_empty() { return Err(ModelError::Validation("name required".into())); }
    if trimmed.chars().count() > MAX_NAME_LEN { return Err(ModelError::Validation("name too long".into())); }
    Ok(())
}

/// Structural email check: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let invalid = || ModelError::Validation("invalid email".into());
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let mut parts = email.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return Err(invalid());
    };
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// Insert a user row. The unique index on `email` turns a concurrent duplicate into `Conflict`.
pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password_hash: String,
    is_admin: bool,
) -> Result<Model, ModelError> {
    validate_name(name)?;
    validate_email(email)?;
    if password_hash.trim().is_empty() {
        return Err(ModelError::Validation("password hash required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        is_admin: Set(is_admin),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(db).await.map_err(ModelError::from_db)?;
    debug!(user_id = %created.id, "user row inserted");
    Ok(created)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email.to_string()))
        .one(db)
        .await
        .map_err(ModelError::from_db)
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(ModelError::from_db)
}

/// Overwrite the mutable columns of an existing row and bump `updated_at`.
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    is_admin: bool,
) -> Result<Option<Model>, ModelError> {
    let Some(found) = Entity::find_by_id(id).one(db).await.map_err(ModelError::from_db)? else {
        return Ok(None);
    };
    let mut am: ActiveModel = found.into();
    am.name = Set(name);
    am.email = Set(email);
    am.password_hash = Set(password_hash);
    am.is_admin = Set(is_admin);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(ModelError::from_db)?;
    Ok(Some(updated))
}

/// Delete a non-administrator in one statement; returns rows affected.
pub async fn delete_unless_admin(db: &DatabaseConnection, id: Uuid) -> Result<u64, ModelError> {
    let res = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::IsAdmin.eq(false))
        .exec(db)
        .await
        .map_err(ModelError::from_db)?;
    Ok(res.rows_affected)
}
