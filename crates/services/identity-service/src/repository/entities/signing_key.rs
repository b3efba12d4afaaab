//! Signing key entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::SigningKey;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "keys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub version: i32,
    pub created: DateTimeUtc,
    #[sea_orm(column_name = "use")]
    pub key_use: Option<String>,
    pub algorithm: String,
    pub is_x509_certificate: bool,
    pub data_protected: bool,
    #[sea_orm(column_type = "Text")]
    pub data: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SigningKey {
    fn from(model: Model) -> Self {
        SigningKey {
            id: model.id,
            version: model.version,
            created: model.created,
            key_use: model.key_use,
            algorithm: model.algorithm,
            is_x509_certificate: model.is_x509_certificate,
            data_protected: model.data_protected,
            data: model.data,
        }
    }
}

impl From<&SigningKey> for ActiveModel {
    fn from(key: &SigningKey) -> Self {
        ActiveModel {
            id: Set(key.id.clone()),
            version: Set(key.version),
            created: Set(key.created),
            key_use: Set(key.key_use.clone()),
            algorithm: Set(key.algorithm.clone()),
            is_x509_certificate: Set(key.is_x509_certificate),
            data_protected: Set(key.data_protected),
            data: Set(key.data.clone()),
        }
    }
}
