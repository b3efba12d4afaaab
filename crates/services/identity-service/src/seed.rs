//! Startup seeding: default roles and accounts.
//!
//! Runs once before the listener opens. The bootstrap is sequential and
//! non-transactional: a failing account aborts the accounts after it, but
//! the error is only logged so the host keeps starting.

use std::sync::Arc;

use common::{AppError, AppResult, IdentityOptions};
use domain::{
    Claim, DataModel, DisplayableResults, Employee, OperationResult, SuccessFailure, YesNo,
    DEFAULT_ROLES, ROLE_ADMIN, ROLE_READONLY, ROLE_USER,
};

use crate::infra::Database;
use crate::repository::{EmployeeStore, PersistenceContext, RoleStore};
use crate::service::{EmployeeManager, EmployeeService, RoleManager, RoleService};

/// Password shared by every seeded account.
pub const DEFAULT_PASSWORD: &str = "V0lunteer$";

const DEFAULT_LAST_NAME: &str = "user";
const DEFAULT_PHONE_NUMBER: &str = "999-999-9999";

/// A fixed account provisioned at startup.
#[derive(Debug, Clone, Copy)]
pub struct SeedAccount {
    /// Account type used in log lines and errors
    pub label: &'static str,
    pub email: &'static str,
    pub first_name: &'static str,
    pub role: &'static str,
}

/// Seeded accounts, in creation order.
pub const SEED_ACCOUNTS: [SeedAccount; 3] = [
    SeedAccount {
        label: "Standard User",
        email: "defaultUser@aiminspections.com",
        first_name: "standard",
        role: ROLE_USER,
    },
    SeedAccount {
        label: "Admin User",
        email: "defaultAdmin@aiminspections.com",
        first_name: "admin",
        role: ROLE_ADMIN,
    },
    SeedAccount {
        label: "Readonly User",
        email: "defaultReadonly@aiminspections.com",
        first_name: "readonly",
        role: ROLE_READONLY,
    },
];

impl SeedAccount {
    fn employee(&self) -> Employee {
        let mut employee =
            Employee::new(self.email, self.email, self.first_name, DEFAULT_LAST_NAME);
        employee.email_confirmed = true;
        employee.phone_number = Some(DEFAULT_PHONE_NUMBER.to_string());
        employee.phone_number_confirmed = true;
        employee.lockout_enabled = false;
        employee
    }
}

/// Brings a deployment to its known-good starting state.
pub struct Seeder {
    db: Database,
    options: IdentityOptions,
}

impl Seeder {
    pub fn new(db: Database, options: IdentityOptions) -> Self {
        Self { db, options }
    }

    /// Run the full seeding protocol. Never fails: every outcome, including
    /// an aborted account, is logged and collected in the returned results.
    pub async fn seed_database(&self, clear_database: bool) -> DisplayableResults {
        let mut results = DisplayableResults::new();

        if let Err(e) = self.run(clear_database, &mut results).await {
            tracing::error!("Error seeding database: {}", e);
            results.add_result(OperationResult::failure("Seeding", e.to_string()));
        }

        results
    }

    async fn run(&self, clear_database: bool, results: &mut DisplayableResults) -> AppResult<()> {
        if clear_database {
            let deleted = self.db.ensure_deleted().await?;
            tracing::info!("Database Deleted: {}", deleted.to_yes_no());
        }

        if let Err(e) = self.db.run_migrations().await {
            tracing::error!("Error applying migrations: {}", e);
            results.add_result(OperationResult::failure("Migrations", e.to_string()));
        }

        let context = PersistenceContext::new(self.db.get_connection()).into_shared();
        let role_store = Arc::new(RoleStore::new(context.clone()));
        let roles = RoleManager::new(role_store.clone());
        let employees = EmployeeManager::new(
            Arc::new(EmployeeStore::new(context.clone())),
            role_store,
            self.options.clone(),
        );

        for &name in DEFAULT_ROLES {
            let prefix = format!("Role '{}' creation", name);
            match roles.create(name).await {
                Ok(result) => {
                    tracing::info!("{} {}", prefix, result.succeeded.to_success_failure());
                    results.add_result(OperationResult::from_identity(&result, &prefix));
                }
                Err(e) => {
                    tracing::error!("{} failed: {}", prefix, e);
                    context.clear_change_tracker();
                    results.add_result(OperationResult::failure(&prefix, e.to_string()));
                }
            }
        }

        for account in &SEED_ACCOUNTS {
            self.seed_account(&employees, account, results)
                .await
                .map_err(|e| {
                    tracing::error!("Error seeding {} account: {}", account.label, e);
                    match e {
                        AppError::Seed { .. } => e,
                        other => AppError::seed(account.label, other),
                    }
                })?;
        }

        Ok(())
    }

    async fn seed_account(
        &self,
        employees: &EmployeeManager,
        account: &SeedAccount,
        results: &mut DisplayableResults,
    ) -> AppResult<()> {
        let employee = account.employee();
        let id = employee.id().to_string();
        let display_name = employee.to_string();

        let prefix = format!("Default {} creation", account.label);
        let created = employees.create(employee, DEFAULT_PASSWORD).await?;
        tracing::info!("{} {}", prefix, created.succeeded.to_success_failure());
        results.add_result(OperationResult::from_identity(&created, &prefix));
        if !created.succeeded {
            return Err(AppError::seed(account.label, created));
        }

        let assigned = employees.add_to_role(&id, account.role).await?;
        results.add_result(OperationResult::from_identity(
            &assigned,
            &format!("Default {} role assignment", account.label),
        ));
        if !assigned.succeeded {
            return Err(AppError::seed(account.label, assigned));
        }

        employees.add_claim(&id, Claim::role(account.role)).await?;
        employees
            .add_claim(&id, Claim::users_name(display_name))
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_accounts_match_default_roles() {
        let roles: Vec<&str> = SEED_ACCOUNTS.iter().map(|a| a.role).collect();
        for &role in DEFAULT_ROLES {
            assert!(roles.contains(&role));
        }
    }

    #[test]
    fn test_seed_employee_shape() {
        let employee = SEED_ACCOUNTS[1].employee();
        assert_eq!(employee.user_name, "defaultAdmin@aiminspections.com");
        assert_eq!(employee.to_string(), "user, admin");
        assert!(employee.email_confirmed);
        assert!(employee.phone_number_confirmed);
        assert!(!employee.lockout_enabled);
    }

    #[test]
    fn test_default_password_meets_policy() {
        assert!(domain::PasswordPolicy::default()
            .validate(DEFAULT_PASSWORD)
            .is_empty());
    }
}
