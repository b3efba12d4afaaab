//! Employee repository over the persistence context.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use common::{AppError, AppResult, OptionExt};
use domain::{
    Claim, DataModel, Employee, EmployeeClaim, EmployeeLogin, EmployeeRole, EmployeeToken,
};

use super::context::PersistenceContext;
use super::entities::{employee, employee_claim, employee_login, employee_token};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Employee repository trait for dependency injection.
///
/// By default, all query methods exclude soft-deleted employees.
/// Use `*_with_deleted` variants to include them. Every employee returned
/// carries its roles (with role claims) eagerly loaded.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Find active employee by ID
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Employee>>;

    /// Find employee by ID including soft-deleted
    async fn find_by_id_with_deleted(&self, id: &str) -> AppResult<Option<Employee>>;

    /// Find active employee by normalized user name
    async fn find_by_user_name(&self, normalized_user_name: &str) -> AppResult<Option<Employee>>;

    /// Find employee by normalized user name including soft-deleted
    async fn find_by_user_name_with_deleted(
        &self,
        normalized_user_name: &str,
    ) -> AppResult<Option<Employee>>;

    /// Find active employee by normalized email
    async fn find_by_email(&self, normalized_email: &str) -> AppResult<Option<Employee>>;

    /// Find employee by normalized email including soft-deleted
    async fn find_by_email_with_deleted(
        &self,
        normalized_email: &str,
    ) -> AppResult<Option<Employee>>;

    /// List active employees, optionally filtered by a case-insensitive search
    async fn list(&self, search: Option<String>) -> AppResult<Vec<Employee>>;

    /// List all employees including soft-deleted
    async fn list_with_deleted(&self) -> AppResult<Vec<Employee>>;

    /// Insert a new employee
    async fn create(&self, employee: Employee) -> AppResult<Employee>;

    /// Write every column of an existing employee
    async fn update(&self, employee: Employee) -> AppResult<Employee>;

    /// Soft delete: only `is_deleted`, `modified` and `employee_id` are written
    async fn delete(&self, employee: Employee) -> AppResult<Employee>;

    /// Link an employee to a role
    async fn add_to_role(&self, user_id: &str, role_id: &str) -> AppResult<()>;

    /// Unlink an employee from a role (physical delete of the join row)
    async fn remove_from_role(&self, user_id: &str, role_id: &str) -> AppResult<()>;

    async fn get_claims(&self, user_id: &str) -> AppResult<Vec<EmployeeClaim>>;

    async fn add_claims(&self, user_id: &str, claims: Vec<Claim>) -> AppResult<()>;

    /// Remove every stored claim matching type and value
    async fn remove_claim(&self, user_id: &str, claim: Claim) -> AppResult<usize>;

    async fn get_logins(&self, user_id: &str) -> AppResult<Vec<EmployeeLogin>>;

    async fn find_login(
        &self,
        login_provider: &str,
        provider_key: &str,
    ) -> AppResult<Option<EmployeeLogin>>;

    async fn add_login(&self, login: EmployeeLogin) -> AppResult<()>;

    async fn remove_login(&self, login: EmployeeLogin) -> AppResult<()>;

    async fn find_token(
        &self,
        user_id: &str,
        login_provider: &str,
        name: &str,
    ) -> AppResult<Option<EmployeeToken>>;

    /// Insert or replace a stored token
    async fn set_token(&self, token: EmployeeToken) -> AppResult<()>;

    async fn remove_token(&self, token: EmployeeToken) -> AppResult<()>;
}

/// Concrete implementation of EmployeeRepository backed by a
/// [`PersistenceContext`].
pub struct EmployeeStore {
    context: Arc<PersistenceContext>,
}

impl EmployeeStore {
    /// Create new repository instance
    pub fn new(context: Arc<PersistenceContext>) -> Self {
        Self { context }
    }

    async fn reload(&self, id: &str) -> AppResult<Employee> {
        self.find_by_id_with_deleted(id).await?.ok_or_not_found()
    }
}

#[async_trait]
impl EmployeeRepository for EmployeeStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Employee>> {
        self.context
            .load_employee(
                employee::Entity::find_by_id(id.to_string())
                    .filter(employee::Column::IsDeleted.eq(false)),
            )
            .await
    }

    async fn find_by_id_with_deleted(&self, id: &str) -> AppResult<Option<Employee>> {
        self.context
            .load_employee(employee::Entity::find_by_id(id.to_string()))
            .await
    }

    async fn find_by_user_name(&self, normalized_user_name: &str) -> AppResult<Option<Employee>> {
        self.context
            .load_employee(
                employee::Entity::find()
                    .filter(employee::Column::NormalizedUserName.eq(normalized_user_name))
                    .filter(employee::Column::IsDeleted.eq(false)),
            )
            .await
    }

    async fn find_by_user_name_with_deleted(
        &self,
        normalized_user_name: &str,
    ) -> AppResult<Option<Employee>> {
        self.context
            .load_employee(
                employee::Entity::find()
                    .filter(employee::Column::NormalizedUserName.eq(normalized_user_name)),
            )
            .await
    }

    async fn find_by_email(&self, normalized_email: &str) -> AppResult<Option<Employee>> {
        self.context
            .load_employee(
                employee::Entity::find()
                    .filter(employee::Column::NormalizedEmail.eq(normalized_email))
                    .filter(employee::Column::IsDeleted.eq(false)),
            )
            .await
    }

    async fn find_by_email_with_deleted(
        &self,
        normalized_email: &str,
    ) -> AppResult<Option<Employee>> {
        self.context
            .load_employee(
                employee::Entity::find()
                    .filter(employee::Column::NormalizedEmail.eq(normalized_email)),
            )
            .await
    }

    async fn list(&self, search: Option<String>) -> AppResult<Vec<Employee>> {
        let employees = self
            .context
            .load_employees(
                employee::Entity::find()
                    .filter(employee::Column::IsDeleted.eq(false))
                    .order_by_asc(employee::Column::LastName)
                    .order_by_asc(employee::Column::FirstName),
            )
            .await?;

        Ok(match search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => employees
                .into_iter()
                .filter(|e| e.search(needle))
                .collect(),
            _ => employees,
        })
    }

    async fn list_with_deleted(&self) -> AppResult<Vec<Employee>> {
        self.context
            .load_employees(
                employee::Entity::find()
                    .order_by_asc(employee::Column::LastName)
                    .order_by_asc(employee::Column::FirstName),
            )
            .await
    }

    async fn create(&self, employee: Employee) -> AppResult<Employee> {
        let id = employee.id().to_string();
        self.context.add(employee);
        self.context.save_changes().await?;
        self.reload(&id).await
    }

    async fn update(&self, employee: Employee) -> AppResult<Employee> {
        let id = employee.id().to_string();
        self.context.update(employee);
        self.context.save_changes().await?;
        self.reload(&id).await
    }

    async fn delete(&self, employee: Employee) -> AppResult<Employee> {
        let id = employee.id().to_string();
        self.context.remove(employee);
        self.context.save_changes().await?;
        self.reload(&id).await
    }

    async fn add_to_role(&self, user_id: &str, role_id: &str) -> AppResult<()> {
        self.context.add(EmployeeRole::new(user_id, role_id));
        self.context.save_changes().await?;
        Ok(())
    }

    async fn remove_from_role(&self, user_id: &str, role_id: &str) -> AppResult<()> {
        self.context.remove(EmployeeRole::new(user_id, role_id));
        self.context.save_changes().await?;
        Ok(())
    }

    async fn get_claims(&self, user_id: &str) -> AppResult<Vec<EmployeeClaim>> {
        let models = employee_claim::Entity::find()
            .filter(employee_claim::Column::UserId.eq(user_id))
            .order_by_asc(employee_claim::Column::Id)
            .all(self.context.db())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(EmployeeClaim::from).collect())
    }

    async fn add_claims(&self, user_id: &str, claims: Vec<Claim>) -> AppResult<()> {
        for claim in &claims {
            self.context.add(EmployeeClaim::new(user_id, claim));
        }
        self.context.save_changes().await?;
        Ok(())
    }

    async fn remove_claim(&self, user_id: &str, claim: Claim) -> AppResult<usize> {
        let matching: Vec<EmployeeClaim> = self
            .get_claims(user_id)
            .await?
            .into_iter()
            .filter(|c| c.claim_type == claim.claim_type && c.claim_value == claim.value)
            .collect();

        let count = matching.len();
        for stored in matching {
            self.context.remove(stored);
        }
        self.context.save_changes().await?;
        Ok(count)
    }

    async fn get_logins(&self, user_id: &str) -> AppResult<Vec<EmployeeLogin>> {
        let models = employee_login::Entity::find()
            .filter(employee_login::Column::UserId.eq(user_id))
            .all(self.context.db())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(EmployeeLogin::from).collect())
    }

    async fn find_login(
        &self,
        login_provider: &str,
        provider_key: &str,
    ) -> AppResult<Option<EmployeeLogin>> {
        let model = employee_login::Entity::find_by_id((
            login_provider.to_string(),
            provider_key.to_string(),
        ))
        .one(self.context.db())
        .await
        .map_err(AppError::from)?;

        Ok(model.map(EmployeeLogin::from))
    }

    async fn add_login(&self, login: EmployeeLogin) -> AppResult<()> {
        self.context.add(login);
        self.context.save_changes().await?;
        Ok(())
    }

    async fn remove_login(&self, login: EmployeeLogin) -> AppResult<()> {
        self.context.remove(login);
        self.context.save_changes().await?;
        Ok(())
    }

    async fn find_token(
        &self,
        user_id: &str,
        login_provider: &str,
        name: &str,
    ) -> AppResult<Option<EmployeeToken>> {
        let model = employee_token::Entity::find_by_id((
            user_id.to_string(),
            login_provider.to_string(),
            name.to_string(),
        ))
        .one(self.context.db())
        .await
        .map_err(AppError::from)?;

        Ok(model.map(EmployeeToken::from))
    }

    async fn set_token(&self, token: EmployeeToken) -> AppResult<()> {
        let exists = self
            .find_token(&token.user_id, &token.login_provider, &token.name)
            .await?
            .is_some();

        if exists {
            self.context.update(token);
        } else {
            self.context.add(token);
        }
        self.context.save_changes().await?;
        Ok(())
    }

    async fn remove_token(&self, token: EmployeeToken) -> AppResult<()> {
        self.context.remove(token);
        self.context.save_changes().await?;
        Ok(())
    }
}
