use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "community_membership")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub community_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_login: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Community,
    Member,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Community => Entity::belongs_to(super::community::Entity)
                .from(Column::CommunityId)
                .to(super::community::Column::Id)
                .into(),
            Relation::Member => Entity::belongs_to(super::community_member::Entity)
                .from(Column::UserLogin)
                .to(super::community_member::Column::Login)
                .into(),
        }
    }
}

impl Related<super::community::Entity> for Entity {
    fn to() -> RelationDef { Relation::Community.def() }
}

impl Related<super::community_member::Entity> for Entity {
    fn to() -> RelationDef { Relation::Member.def() }
}

impl ActiveModelBehavior for ActiveModel {}
