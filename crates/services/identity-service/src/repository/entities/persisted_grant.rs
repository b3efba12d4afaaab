//! Persisted grant entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::PersistedGrant;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "persisted_grants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    #[sea_orm(column_name = "type")]
    pub grant_type: String,
    pub subject_id: Option<String>,
    pub session_id: Option<String>,
    pub client_id: String,
    pub description: Option<String>,
    pub creation_time: DateTimeUtc,
    pub expiration: Option<DateTimeUtc>,
    pub consumed_time: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Text")]
    pub data: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PersistedGrant {
    fn from(model: Model) -> Self {
        PersistedGrant {
            key: model.key,
            grant_type: model.grant_type,
            subject_id: model.subject_id,
            session_id: model.session_id,
            client_id: model.client_id,
            description: model.description,
            creation_time: model.creation_time,
            expiration: model.expiration,
            consumed_time: model.consumed_time,
            data: model.data,
        }
    }
}

impl From<&PersistedGrant> for ActiveModel {
    fn from(grant: &PersistedGrant) -> Self {
        ActiveModel {
            key: Set(grant.key.clone()),
            grant_type: Set(grant.grant_type.clone()),
            subject_id: Set(grant.subject_id.clone()),
            session_id: Set(grant.session_id.clone()),
            client_id: Set(grant.client_id.clone()),
            description: Set(grant.description.clone()),
            creation_time: Set(grant.creation_time),
            expiration: Set(grant.expiration),
            consumed_time: Set(grant.consumed_time),
            data: Set(grant.data.clone()),
        }
    }
}
