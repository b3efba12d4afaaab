//! External login entity for SeaORM. Composite key (login_provider, provider_key).

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::EmployeeLogin;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employee_logins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub login_provider: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub provider_key: String,
    pub provider_display_name: Option<String>,
    pub user_id: String,
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

impl From<Model> for EmployeeLogin {
    fn from(model: Model) -> Self {
        EmployeeLogin {
            login_provider: model.login_provider,
            provider_key: model.provider_key,
            provider_display_name: model.provider_display_name,
            user_id: model.user_id,
        }
    }
}

impl From<&EmployeeLogin> for ActiveModel {
    fn from(login: &EmployeeLogin) -> Self {
        ActiveModel {
            login_provider: Set(login.login_provider.clone()),
            provider_key: Set(login.provider_key.clone()),
            provider_display_name: Set(login.provider_display_name.clone()),
            user_id: Set(login.user_id.clone()),
        }
    }
}
