//! Device-flow code entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::DeviceFlowCode;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "device_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_code: String,
    #[sea_orm(unique)]
    pub device_code: String,
    pub subject_id: Option<String>,
    pub session_id: Option<String>,
    pub client_id: String,
    pub description: Option<String>,
    pub creation_time: DateTimeUtc,
    pub expiration: DateTimeUtc,
    #[sea_orm(column_type = "Text")]
    pub data: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DeviceFlowCode {
    fn from(model: Model) -> Self {
        DeviceFlowCode {
            user_code: model.user_code,
            device_code: model.device_code,
            subject_id: model.subject_id,
            session_id: model.session_id,
            client_id: model.client_id,
            description: model.description,
            creation_time: model.creation_time,
            expiration: model.expiration,
            data: model.data,
        }
    }
}

impl From<&DeviceFlowCode> for ActiveModel {
    fn from(code: &DeviceFlowCode) -> Self {
        ActiveModel {
            user_code: Set(code.user_code.clone()),
            device_code: Set(code.device_code.clone()),
            subject_id: Set(code.subject_id.clone()),
            session_id: Set(code.session_id.clone()),
            client_id: Set(code.client_id.clone()),
            description: Set(code.description.clone()),
            creation_time: Set(code.creation_time),
            expiration: Set(code.expiration),
            data: Set(code.data.clone()),
        }
    }
}
