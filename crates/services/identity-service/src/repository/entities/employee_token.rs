//! Employee token entity for SeaORM. Composite key (user_id, login_provider, name).

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::EmployeeToken;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employee_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub login_provider: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub value: Option<String>,
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

impl From<Model> for EmployeeToken {
    fn from(model: Model) -> Self {
        EmployeeToken {
            user_id: model.user_id,
            login_provider: model.login_provider,
            name: model.name,
            value: model.value,
        }
    }
}

impl From<&EmployeeToken> for ActiveModel {
    fn from(token: &EmployeeToken) -> Self {
        ActiveModel {
            user_id: Set(token.user_id.clone()),
            login_provider: Set(token.login_provider.clone()),
            name: Set(token.name.clone()),
            value: Set(token.value.clone()),
        }
    }
}
