//! Role claim database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use domain::RoleClaim;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "role_claims")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub role_id: String,
    pub claim_type: String,
    pub claim_value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id",
        on_delete = "Cascade"
    )]
    Role,
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for RoleClaim {
    fn from(model: Model) -> Self {
        RoleClaim {
            id: model.id,
            role_id: model.role_id,
            claim_type: model.claim_type,
            claim_value: model.claim_value,
        }
    }
}

/// Unsaved claims (id 0) leave the key to the database.
impl From<&RoleClaim> for ActiveModel {
    fn from(claim: &RoleClaim) -> Self {
        ActiveModel {
            id: if claim.id == 0 { NotSet } else { Set(claim.id) },
            role_id: Set(claim.role_id.clone()),
            claim_type: Set(claim.claim_type.clone()),
            claim_value: Set(claim.claim_value.clone()),
        }
    }
}
