//! Migration: token-issuer tables (persisted grants, signing keys, device codes).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PersistedGrants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PersistedGrants::Key).string().not_null().primary_key())
                    .col(ColumnDef::new(PersistedGrants::Type).string().not_null())
                    .col(ColumnDef::new(PersistedGrants::SubjectId).string().null())
                    .col(ColumnDef::new(PersistedGrants::SessionId).string().null())
                    .col(ColumnDef::new(PersistedGrants::ClientId).string().not_null())
                    .col(ColumnDef::new(PersistedGrants::Description).string().null())
                    .col(
                        ColumnDef::new(PersistedGrants::CreationTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersistedGrants::Expiration)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PersistedGrants::ConsumedTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(PersistedGrants::Data).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_persisted_grants_subject_client_type")
                    .table(PersistedGrants::Table)
                    .col(PersistedGrants::SubjectId)
                    .col(PersistedGrants::ClientId)
                    .col(PersistedGrants::Type)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_persisted_grants_expiration")
                    .table(PersistedGrants::Table)
                    .col(PersistedGrants::Expiration)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Keys::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Keys::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Keys::Version).integer().not_null())
                    .col(ColumnDef::new(Keys::Created).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Keys::Use).string().null())
                    .col(ColumnDef::new(Keys::Algorithm).string().not_null())
                    .col(ColumnDef::new(Keys::IsX509Certificate).boolean().not_null())
                    .col(ColumnDef::new(Keys::DataProtected).boolean().not_null())
                    .col(ColumnDef::new(Keys::Data).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_keys_use")
                    .table(Keys::Table)
                    .col(Keys::Use)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DeviceCodes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DeviceCodes::UserCode).string().not_null().primary_key())
                    .col(ColumnDef::new(DeviceCodes::DeviceCode).string().not_null().unique_key())
                    .col(ColumnDef::new(DeviceCodes::SubjectId).string().null())
                    .col(ColumnDef::new(DeviceCodes::SessionId).string().null())
                    .col(ColumnDef::new(DeviceCodes::ClientId).string().not_null())
                    .col(ColumnDef::new(DeviceCodes::Description).string().null())
                    .col(
                        ColumnDef::new(DeviceCodes::CreationTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeviceCodes::Expiration)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DeviceCodes::Data).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_device_codes_expiration")
                    .table(DeviceCodes::Table)
                    .col(DeviceCodes::Expiration)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeviceCodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Keys::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PersistedGrants::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PersistedGrants {
    Table,
    Key,
    Type,
    SubjectId,
    SessionId,
    ClientId,
    Description,
    CreationTime,
    Expiration,
    ConsumedTime,
    Data,
}

#[derive(Iden)]
enum Keys {
    Table,
    Id,
    Version,
    Created,
    Use,
    Algorithm,
    #[iden = "is_x509_certificate"]
    IsX509Certificate,
    DataProtected,
    Data,
}

#[derive(Iden)]
enum DeviceCodes {
    Table,
    UserCode,
    DeviceCode,
    SubjectId,
    SessionId,
    ClientId,
    Description,
    CreationTime,
    Expiration,
    Data,
}
