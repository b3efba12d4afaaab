//! Employee database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::{AuditEnvelope, Employee};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_name: String,
    #[sea_orm(unique)]
    pub normalized_user_name: String,
    pub email: String,
    pub normalized_email: String,
    pub email_confirmed: bool,
    pub password_hash: Option<String>,
    pub security_stamp: String,
    pub concurrency_stamp: String,
    pub phone_number: Option<String>,
    pub phone_number_confirmed: bool,
    pub two_factor_enabled: bool,
    pub lockout_end: Option<DateTimeUtc>,
    pub lockout_enabled: bool,
    pub access_failed_count: i32,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created: DateTimeUtc,
    pub modified: DateTimeUtc,
    /// Soft delete flag; rows are never physically removed
    pub is_deleted: bool,
    /// Employee who performed the last operation on this row
    pub employee_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::employee_role::Entity")]
    EmployeeRoles,
    #[sea_orm(has_many = "super::employee_claim::Entity")]
    EmployeeClaims,
    #[sea_orm(has_many = "super::employee_login::Entity")]
    EmployeeLogins,
    #[sea_orm(has_many = "super::employee_token::Entity")]
    EmployeeTokens,
}

impl Related<super::employee_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeRoles.def()
    }
}

impl Related<super::employee_claim::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeClaims.def()
    }
}

impl Related<super::employee_login::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeLogins.def()
    }
}

impl Related<super::employee_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity. Satellite collections are
/// loaded separately.
impl From<Model> for Employee {
    fn from(model: Model) -> Self {
        Employee {
            audit: AuditEnvelope::restore(
                model.id,
                model.created,
                model.modified,
                model.is_deleted,
                model.employee_id,
            ),
            user_name: model.user_name,
            normalized_user_name: model.normalized_user_name,
            email: model.email,
            normalized_email: model.normalized_email,
            email_confirmed: model.email_confirmed,
            password_hash: model.password_hash,
            security_stamp: model.security_stamp,
            concurrency_stamp: model.concurrency_stamp,
            phone_number: model.phone_number,
            phone_number_confirmed: model.phone_number_confirmed,
            two_factor_enabled: model.two_factor_enabled,
            lockout_end: model.lockout_end,
            lockout_enabled: model.lockout_enabled,
            access_failed_count: model.access_failed_count,
            first_name: model.first_name,
            last_name: model.last_name,
            is_active: model.is_active,
            roles: Vec::new(),
            claims: Vec::new(),
            logins: Vec::new(),
            tokens: Vec::new(),
        }
    }
}

/// Full-row active model used for inserts and updates.
impl From<&Employee> for ActiveModel {
    fn from(employee: &Employee) -> Self {
        ActiveModel {
            id: Set(employee.audit.id().to_string()),
            user_name: Set(employee.user_name.clone()),
            normalized_user_name: Set(employee.normalized_user_name.clone()),
            email: Set(employee.email.clone()),
            normalized_email: Set(employee.normalized_email.clone()),
            email_confirmed: Set(employee.email_confirmed),
            password_hash: Set(employee.password_hash.clone()),
            security_stamp: Set(employee.security_stamp.clone()),
            concurrency_stamp: Set(employee.concurrency_stamp.clone()),
            phone_number: Set(employee.phone_number.clone()),
            phone_number_confirmed: Set(employee.phone_number_confirmed),
            two_factor_enabled: Set(employee.two_factor_enabled),
            lockout_end: Set(employee.lockout_end),
            lockout_enabled: Set(employee.lockout_enabled),
            access_failed_count: Set(employee.access_failed_count),
            first_name: Set(employee.first_name.clone()),
            last_name: Set(employee.last_name.clone()),
            is_active: Set(employee.is_active),
            created: Set(employee.audit.created()),
            modified: Set(employee.audit.modified()),
            is_deleted: Set(employee.audit.is_deleted()),
            employee_id: Set(employee.audit.employee_id().to_string()),
        }
    }
}
