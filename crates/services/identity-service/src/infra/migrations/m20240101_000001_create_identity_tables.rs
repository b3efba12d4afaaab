//! Migration: employee, role and satellite tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employees::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Employees::UserName).string().not_null())
                    .col(
                        ColumnDef::new(Employees::NormalizedUserName)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Employees::Email).string().not_null())
                    .col(ColumnDef::new(Employees::NormalizedEmail).string().not_null())
                    .col(ColumnDef::new(Employees::EmailConfirmed).boolean().not_null().default(false))
                    .col(ColumnDef::new(Employees::PasswordHash).string().null())
                    .col(ColumnDef::new(Employees::SecurityStamp).string().not_null())
                    .col(ColumnDef::new(Employees::ConcurrencyStamp).string().not_null())
                    .col(ColumnDef::new(Employees::PhoneNumber).string().null())
                    .col(
                        ColumnDef::new(Employees::PhoneNumberConfirmed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Employees::TwoFactorEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Employees::LockoutEnd).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Employees::LockoutEnabled).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Employees::AccessFailedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Employees::FirstName).string().not_null())
                    .col(ColumnDef::new(Employees::LastName).string().not_null())
                    .col(ColumnDef::new(Employees::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Employees::Created).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Employees::Modified).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Employees::IsDeleted).boolean().not_null().default(false))
                    .col(ColumnDef::new(Employees::EmployeeId).string().not_null().default(""))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employees_normalized_email")
                    .table(Employees::Table)
                    .col(Employees::NormalizedEmail)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employees_is_deleted")
                    .table(Employees::Table)
                    .col(Employees::IsDeleted)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Roles::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Roles::Name).string().not_null())
                    .col(ColumnDef::new(Roles::NormalizedName).string().not_null().unique_key())
                    .col(ColumnDef::new(Roles::ConcurrencyStamp).string().not_null())
                    .col(ColumnDef::new(Roles::Created).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Roles::Modified).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Roles::IsDeleted).boolean().not_null().default(false))
                    .col(ColumnDef::new(Roles::EmployeeId).string().not_null().default(""))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RoleClaims::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoleClaims::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoleClaims::RoleId).string().not_null())
                    .col(ColumnDef::new(RoleClaims::ClaimType).string().not_null())
                    .col(ColumnDef::new(RoleClaims::ClaimValue).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_claims_role_id")
                            .from(RoleClaims::Table, RoleClaims::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmployeeRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EmployeeRoles::UserId).string().not_null())
                    .col(ColumnDef::new(EmployeeRoles::RoleId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(EmployeeRoles::UserId)
                            .col(EmployeeRoles::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_roles_user_id")
                            .from(EmployeeRoles::Table, EmployeeRoles::UserId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_roles_role_id")
                            .from(EmployeeRoles::Table, EmployeeRoles::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmployeeClaims::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmployeeClaims::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmployeeClaims::UserId).string().not_null())
                    .col(ColumnDef::new(EmployeeClaims::ClaimType).string().not_null())
                    .col(ColumnDef::new(EmployeeClaims::ClaimValue).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_claims_user_id")
                            .from(EmployeeClaims::Table, EmployeeClaims::UserId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmployeeLogins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EmployeeLogins::LoginProvider).string().not_null())
                    .col(ColumnDef::new(EmployeeLogins::ProviderKey).string().not_null())
                    .col(ColumnDef::new(EmployeeLogins::ProviderDisplayName).string().null())
                    .col(ColumnDef::new(EmployeeLogins::UserId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(EmployeeLogins::LoginProvider)
                            .col(EmployeeLogins::ProviderKey),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_logins_user_id")
                            .from(EmployeeLogins::Table, EmployeeLogins::UserId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmployeeTokens::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EmployeeTokens::UserId).string().not_null())
                    .col(ColumnDef::new(EmployeeTokens::LoginProvider).string().not_null())
                    .col(ColumnDef::new(EmployeeTokens::Name).string().not_null())
                    .col(ColumnDef::new(EmployeeTokens::Value).string().null())
                    .primary_key(
                        Index::create()
                            .col(EmployeeTokens::UserId)
                            .col(EmployeeTokens::LoginProvider)
                            .col(EmployeeTokens::Name),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_tokens_user_id")
                            .from(EmployeeTokens::Table, EmployeeTokens::UserId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first
        manager
            .drop_table(Table::drop().table(EmployeeTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EmployeeLogins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EmployeeClaims::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EmployeeRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoleClaims::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Employees {
    Table,
    Id,
    UserName,
    NormalizedUserName,
    Email,
    NormalizedEmail,
    EmailConfirmed,
    PasswordHash,
    SecurityStamp,
    ConcurrencyStamp,
    PhoneNumber,
    PhoneNumberConfirmed,
    TwoFactorEnabled,
    LockoutEnd,
    LockoutEnabled,
    AccessFailedCount,
    FirstName,
    LastName,
    IsActive,
    Created,
    Modified,
    IsDeleted,
    EmployeeId,
}

#[derive(Iden)]
enum Roles {
    Table,
    Id,
    Name,
    NormalizedName,
    ConcurrencyStamp,
    Created,
    Modified,
    IsDeleted,
    EmployeeId,
}

#[derive(Iden)]
enum RoleClaims {
    Table,
    Id,
    RoleId,
    ClaimType,
    ClaimValue,
}

#[derive(Iden)]
enum EmployeeRoles {
    Table,
    UserId,
    RoleId,
}

#[derive(Iden)]
enum EmployeeClaims {
    Table,
    Id,
    UserId,
    ClaimType,
    ClaimValue,
}

#[derive(Iden)]
enum EmployeeLogins {
    Table,
    LoginProvider,
    ProviderKey,
    ProviderDisplayName,
    UserId,
}

#[derive(Iden)]
enum EmployeeTokens {
    Table,
    UserId,
    LoginProvider,
    Name,
    Value,
}
