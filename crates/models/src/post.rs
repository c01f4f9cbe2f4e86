use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub created_at: DateTimeWithTimeZone,
    pub user_login: String,
    pub community_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Community,
    Comment,
    Like,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Community => Entity::belongs_to(super::community::Entity)
                .from(Column::CommunityId)
                .to(super::community::Column::Id)
                .into(),
            Relation::Comment => Entity::has_many(super::comment::Entity).into(),
            Relation::Like => Entity::has_many(super::post_like::Entity).into(),
        }
    }
}

impl Related<super::community::Entity> for Entity {
    fn to() -> RelationDef { Relation::Community.def() }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef { Relation::Comment.def() }
}

impl Related<super::post_like::Entity> for Entity {
    fn to() -> RelationDef { Relation::Like.def() }
}

impl ActiveModelBehavior for ActiveModel {}
