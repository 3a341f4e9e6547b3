//! Interest entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "interests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub interest_id: i32,
    #[sea_orm(unique)]
    pub interest_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_interest::Entity")]
    PostInterest,
}

impl Related<super::post_interest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostInterest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for feed_core::domain::Interest {
    fn from(model: Model) -> Self {
        Self {
            interest_id: model.interest_id,
            interest_name: model.interest_name,
        }
    }
}
