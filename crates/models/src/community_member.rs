use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Local projection of a user-service account, present while the user belongs to a community.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "community_member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub login: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Membership,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Membership => Entity::has_many(super::community_membership::Entity).into() }
    }
}

impl Related<super::community_membership::Entity> for Entity {
    fn to() -> RelationDef { Relation::Membership.def() }
}

impl ActiveModelBehavior for ActiveModel {}
