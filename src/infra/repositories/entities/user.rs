//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub external_id: Option<Uuid>,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub used_name: Option<String>,
    pub company: Option<String>,
    pub birth: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            external_id: model.external_id,
            email: model.email,
            name: model.name,
            used_name: model.used_name,
            company: model.company,
            birth: model.birth,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
