//! Employee claim database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use domain::EmployeeClaim;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employee_claims")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub claim_type: String,
    pub claim_value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::UserId",
        to = "super::employee::Column::Id",
        on_delete = "Cascade"
    )]
    Employee,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for EmployeeClaim {
    fn from(model: Model) -> Self {
        EmployeeClaim {
            id: model.id,
            user_id: model.user_id,
            claim_type: model.claim_type,
            claim_value: model.claim_value,
        }
    }
}

/// Unsaved claims (id 0) leave the key to the database.
impl From<&EmployeeClaim> for ActiveModel {
    fn from(claim: &EmployeeClaim) -> Self {
        ActiveModel {
            id: if claim.id == 0 { NotSet } else { Set(claim.id) },
            user_id: Set(claim.user_id.clone()),
            claim_type: Set(claim.claim_type.clone()),
            claim_value: Set(claim.claim_value.clone()),
        }
    }
}
