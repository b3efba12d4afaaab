//! Role database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::{AuditEnvelope, Role};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub normalized_name: String,
    pub concurrency_stamp: String,
    pub created: DateTimeUtc,
    pub modified: DateTimeUtc,
    pub is_deleted: bool,
    pub employee_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::role_claim::Entity")]
    RoleClaims,
    #[sea_orm(has_many = "super::employee_role::Entity")]
    EmployeeRoles,
}

impl Related<super::role_claim::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoleClaims.def()
    }
}

impl Related<super::employee_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Role {
    fn from(model: Model) -> Self {
        Role {
            audit: AuditEnvelope::restore(
                model.id,
                model.created,
                model.modified,
                model.is_deleted,
                model.employee_id,
            ),
            name: model.name,
            normalized_name: model.normalized_name,
            concurrency_stamp: model.concurrency_stamp,
            claims: Vec::new(),
        }
    }
}

impl From<&Role> for ActiveModel {
    fn from(role: &Role) -> Self {
        ActiveModel {
            id: Set(role.audit.id().to_string()),
            name: Set(role.name.clone()),
            normalized_name: Set(role.normalized_name.clone()),
            concurrency_stamp: Set(role.concurrency_stamp.clone()),
            created: Set(role.audit.created()),
            modified: Set(role.audit.modified()),
            is_deleted: Set(role.audit.is_deleted()),
            employee_id: Set(role.audit.employee_id().to_string()),
        }
    }
}
