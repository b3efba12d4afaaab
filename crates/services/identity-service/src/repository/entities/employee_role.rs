//! Employee-role join entity for SeaORM. Composite key (user_id, role_id).

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::EmployeeRole;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employee_roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: String,
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
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id",
        on_delete = "Cascade"
    )]
    Role,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for EmployeeRole {
    fn from(model: Model) -> Self {
        EmployeeRole::new(model.user_id, model.role_id)
    }
}

impl From<&EmployeeRole> for ActiveModel {
    fn from(join: &EmployeeRole) -> Self {
        ActiveModel {
            user_id: Set(join.user_id.clone()),
            role_id: Set(join.role_id.clone()),
        }
    }
}
