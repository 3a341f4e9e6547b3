//! Post entity for SeaORM.

use sea_orm::{NotSet, Set};
use sea_orm::entity::prelude::*;

use feed_core::domain::{InterestId, NewPost, Post, UserId};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub post_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub image_url: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_interest::Entity")]
    PostInterest,
    #[sea_orm(has_many = "super::post_like::Entity")]
    PostLike,
}

impl Related<super::post_interest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostInterest.def()
    }
}

impl Related<super::post_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostLike.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Join the row with its interest ids into a domain post.
    pub fn into_post(self, mut interest_ids: Vec<InterestId>) -> Post {
        interest_ids.sort_unstable();
        interest_ids.dedup();
        Post {
            post_id: self.post_id,
            title: self.title,
            body: self.body,
            image_url: self.image_url,
            created_by: UserId::from(self.created_by),
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
            interest_ids,
        }
    }
}

/// Conversion from a new domain post to an insertable ActiveModel.
impl From<&NewPost> for ActiveModel {
    fn from(post: &NewPost) -> Self {
        Self {
            post_id: NotSet,
            title: Set(post.title.clone()),
            body: Set(post.body.clone()),
            image_url: Set(post.image_url.clone()),
            created_by: Set(post.created_by.as_str().to_string()),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.created_at.into()),
        }
    }
}
