//! Identity Service Library
//!
//! Employee and role management over a soft-deleting persistence context,
//! plus the grant, key and device-code stores used by the token service.
//! Embedded in the host binary.

pub mod config;
pub mod infra;
pub mod repository;
pub mod seed;
pub mod service;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;

use common::IdentityOptions;

use crate::config::IdentityServiceConfig;
use crate::infra::Database;
use crate::repository::{
    DeviceFlowCodeStore, DeviceFlowStore, EmployeeStore, GrantStore, KeyStore,
    PersistedGrantStore, PersistenceContext, RoleStore, SigningKeyStore,
};
use crate::service::{EmployeeManager, EmployeeService, RoleManager, RoleService};

/// Services sharing one persistence context.
///
/// Built once per request (or per background operation) so every write made
/// while handling it goes through the same change tracker and is attributed
/// to the same acting employee.
#[derive(Clone)]
pub struct IdentityScope {
    pub context: Arc<PersistenceContext>,
    pub employees: Arc<dyn EmployeeService>,
    pub roles: Arc<dyn RoleService>,
    pub grants: Arc<dyn GrantStore>,
    pub keys: Arc<dyn KeyStore>,
    pub device_codes: Arc<dyn DeviceFlowStore>,
}

impl IdentityScope {
    pub fn new(db: DatabaseConnection, options: IdentityOptions, actor: Option<String>) -> Self {
        let context = match actor {
            Some(actor) => PersistenceContext::new(db).with_actor(actor),
            None => PersistenceContext::new(db),
        }
        .into_shared();

        let role_store = Arc::new(RoleStore::new(context.clone()));
        let employee_store = Arc::new(EmployeeStore::new(context.clone()));

        Self {
            employees: Arc::new(EmployeeManager::new(
                employee_store,
                role_store.clone(),
                options,
            )),
            roles: Arc::new(RoleManager::new(role_store)),
            grants: Arc::new(PersistedGrantStore::new(context.clone())),
            keys: Arc::new(SigningKeyStore::new(context.clone())),
            device_codes: Arc::new(DeviceFlowCodeStore::new(context.clone())),
            context,
        }
    }
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = IdentityServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database_url).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
