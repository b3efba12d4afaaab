//! Employee service - identity operations on employees.
//!
//! Business failures (duplicate names, weak passwords, unknown roles) come
//! back as a failed [`IdentityResult`]; infrastructure failures as `Err`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use common::{AppResult, IdentityOptions, OptionExt};
use domain::{
    normalize, Claim, DataModel, Employee, EmployeeLogin, EmployeeToken, IdentityError,
    IdentityResult, Password,
};

use crate::repository::{EmployeeRepository, RoleRepository};

/// Employee service trait for dependency injection.
///
/// Lookups exclude soft-deleted employees unless suffixed `_with_deleted`.
#[async_trait]
pub trait EmployeeService: Send + Sync {
    /// Validate, hash the password and insert a new employee
    async fn create(&self, employee: Employee, password: &str) -> AppResult<IdentityResult>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Employee>>;

    async fn find_by_id_with_deleted(&self, id: &str) -> AppResult<Option<Employee>>;

    async fn find_by_name(&self, user_name: &str) -> AppResult<Option<Employee>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Employee>>;

    /// Active employees, optionally filtered by name or email
    async fn list(&self, search: Option<String>) -> AppResult<Vec<Employee>>;

    async fn add_to_role(&self, employee_id: &str, role_name: &str) -> AppResult<IdentityResult>;

    async fn remove_from_role(
        &self,
        employee_id: &str,
        role_name: &str,
    ) -> AppResult<IdentityResult>;

    async fn get_roles(&self, employee_id: &str) -> AppResult<Vec<String>>;

    async fn is_in_role(&self, employee_id: &str, role_name: &str) -> AppResult<bool>;

    async fn add_claim(&self, employee_id: &str, claim: Claim) -> AppResult<IdentityResult>;

    async fn remove_claim(&self, employee_id: &str, claim: Claim) -> AppResult<IdentityResult>;

    async fn get_claims(&self, employee_id: &str) -> AppResult<Vec<Claim>>;

    async fn add_login(&self, employee_id: &str, login: EmployeeLogin)
        -> AppResult<IdentityResult>;

    async fn remove_login(
        &self,
        employee_id: &str,
        login_provider: &str,
        provider_key: &str,
    ) -> AppResult<IdentityResult>;

    async fn get_logins(&self, employee_id: &str) -> AppResult<Vec<EmployeeLogin>>;

    async fn set_token(
        &self,
        employee_id: &str,
        login_provider: &str,
        name: &str,
        value: &str,
    ) -> AppResult<IdentityResult>;

    async fn get_token(
        &self,
        employee_id: &str,
        login_provider: &str,
        name: &str,
    ) -> AppResult<Option<String>>;

    async fn remove_token(
        &self,
        employee_id: &str,
        login_provider: &str,
        name: &str,
    ) -> AppResult<IdentityResult>;

    /// Soft-lock: inactive and locked out indefinitely
    async fn deactivate(&self, employee_id: &str) -> AppResult<IdentityResult>;

    async fn activate(&self, employee_id: &str) -> AppResult<IdentityResult>;

    async fn confirm_email(&self, employee_id: &str) -> AppResult<IdentityResult>;

    /// Soft delete through the persistence context
    async fn delete(&self, employee_id: &str) -> AppResult<IdentityResult>;

    fn check_password(&self, employee: &Employee, password: &str) -> bool;

    /// Record a failed sign-in. Returns true when the employee is now locked out.
    async fn access_failed(&self, employee_id: &str) -> AppResult<bool>;

    async fn reset_access_failed(&self, employee_id: &str) -> AppResult<()>;
}

/// Concrete implementation of EmployeeService using repositories.
pub struct EmployeeManager {
    employees: Arc<dyn EmployeeRepository>,
    roles: Arc<dyn RoleRepository>,
    options: IdentityOptions,
}

impl EmployeeManager {
    pub fn new(
        employees: Arc<dyn EmployeeRepository>,
        roles: Arc<dyn RoleRepository>,
        options: IdentityOptions,
    ) -> Self {
        Self {
            employees,
            roles,
            options,
        }
    }

    async fn require(&self, employee_id: &str) -> AppResult<Employee> {
        self.employees.find_by_id(employee_id).await?.ok_or_not_found()
    }

    async fn validate_new(&self, employee: &Employee, password: &str) -> AppResult<Vec<IdentityError>> {
        let mut errors = Vec::new();

        if employee.user_name.trim().is_empty() {
            errors.push(IdentityError::new(
                "InvalidUserName",
                "Username is required.",
            ));
        } else if self
            .employees
            .find_by_user_name_with_deleted(&normalize(&employee.user_name))
            .await?
            .is_some()
        {
            errors.push(IdentityError::new(
                "DuplicateUserName",
                format!("Username '{}' is already taken.", employee.user_name),
            ));
        }

        if !employee.email.contains('@') {
            errors.push(IdentityError::new(
                "InvalidEmail",
                format!("Email '{}' is invalid.", employee.email),
            ));
        } else if self
            .employees
            .find_by_email_with_deleted(&normalize(&employee.email))
            .await?
            .is_some()
        {
            errors.push(IdentityError::new(
                "DuplicateEmail",
                format!("Email '{}' is already taken.", employee.email),
            ));
        }

        errors.extend(self.options.password.validate(password));
        Ok(errors)
    }

    async fn save(&self, mut employee: Employee) -> AppResult<IdentityResult> {
        employee.concurrency_stamp = Uuid::new_v4().to_string();
        self.employees.update(employee).await?;
        Ok(IdentityResult::success())
    }
}

#[async_trait]
impl EmployeeService for EmployeeManager {
    async fn create(&self, mut employee: Employee, password: &str) -> AppResult<IdentityResult> {
        let errors = self.validate_new(&employee, password).await?;
        if !errors.is_empty() {
            tracing::debug!(user_name = %employee.user_name, "Employee validation failed");
            return Ok(IdentityResult::failed(errors));
        }

        employee.password_hash = Some(Password::new(password)?.into_string());
        employee.normalized_user_name = normalize(&employee.user_name);
        employee.normalized_email = normalize(&employee.email);
        employee.security_stamp = Uuid::new_v4().to_string();
        employee.concurrency_stamp = Uuid::new_v4().to_string();

        let created = self.employees.create(employee).await?;
        tracing::info!(employee_id = %created.id(), "Employee created");
        Ok(IdentityResult::success())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Employee>> {
        self.employees.find_by_id(id).await
    }

    async fn find_by_id_with_deleted(&self, id: &str) -> AppResult<Option<Employee>> {
        self.employees.find_by_id_with_deleted(id).await
    }

    async fn find_by_name(&self, user_name: &str) -> AppResult<Option<Employee>> {
        self.employees.find_by_user_name(&normalize(user_name)).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        self.employees.find_by_email(&normalize(email)).await
    }

    async fn list(&self, search: Option<String>) -> AppResult<Vec<Employee>> {
        self.employees.list(search).await
    }

    async fn add_to_role(&self, employee_id: &str, role_name: &str) -> AppResult<IdentityResult> {
        let employee = self.require(employee_id).await?;
        let Some(role) = self.roles.find_by_name(&normalize(role_name)).await? else {
            return Ok(IdentityResult::failed_with(
                "RoleNotFound",
                format!("Role {} does not exist.", role_name),
            ));
        };

        if employee.has_role(role_name) {
            return Ok(IdentityResult::failed_with(
                "UserAlreadyInRole",
                format!("User already in role '{}'.", role_name),
            ));
        }

        self.employees.add_to_role(employee.id(), role.id()).await?;
        Ok(IdentityResult::success())
    }

    async fn remove_from_role(
        &self,
        employee_id: &str,
        role_name: &str,
    ) -> AppResult<IdentityResult> {
        let employee = self.require(employee_id).await?;
        let wanted = normalize(role_name);
        let Some(role) = employee
            .roles
            .iter()
            .filter_map(|r| r.role.as_ref())
            .find(|r| r.normalized_name == wanted)
        else {
            return Ok(IdentityResult::failed_with(
                "UserNotInRole",
                format!("User is not in role '{}'.", role_name),
            ));
        };

        self.employees.remove_from_role(employee.id(), role.id()).await?;
        Ok(IdentityResult::success())
    }

    async fn get_roles(&self, employee_id: &str) -> AppResult<Vec<String>> {
        Ok(self.require(employee_id).await?.role_names())
    }

    async fn is_in_role(&self, employee_id: &str, role_name: &str) -> AppResult<bool> {
        Ok(self.require(employee_id).await?.has_role(role_name))
    }

    async fn add_claim(&self, employee_id: &str, claim: Claim) -> AppResult<IdentityResult> {
        let employee = self.require(employee_id).await?;
        self.employees.add_claims(employee.id(), vec![claim]).await?;
        Ok(IdentityResult::success())
    }

    async fn remove_claim(&self, employee_id: &str, claim: Claim) -> AppResult<IdentityResult> {
        let employee = self.require(employee_id).await?;
        self.employees.remove_claim(employee.id(), claim).await?;
        Ok(IdentityResult::success())
    }

    async fn get_claims(&self, employee_id: &str) -> AppResult<Vec<Claim>> {
        let employee = self.require(employee_id).await?;
        Ok(self
            .employees
            .get_claims(employee.id())
            .await?
            .iter()
            .map(|c| c.to_claim())
            .collect())
    }

    async fn add_login(
        &self,
        employee_id: &str,
        mut login: EmployeeLogin,
    ) -> AppResult<IdentityResult> {
        let employee = self.require(employee_id).await?;
        if self
            .employees
            .find_login(&login.login_provider, &login.provider_key)
            .await?
            .is_some()
        {
            return Ok(IdentityResult::failed_with(
                "LoginAlreadyAssociated",
                "A user with this login already exists.",
            ));
        }

        login.user_id = employee.id().to_string();
        self.employees.add_login(login).await?;
        Ok(IdentityResult::success())
    }

    async fn remove_login(
        &self,
        employee_id: &str,
        login_provider: &str,
        provider_key: &str,
    ) -> AppResult<IdentityResult> {
        let employee = self.require(employee_id).await?;
        match self.employees.find_login(login_provider, provider_key).await? {
            Some(login) if login.user_id == employee.id() => {
                self.employees.remove_login(login).await?;
                Ok(IdentityResult::success())
            }
            _ => Ok(IdentityResult::failed_with(
                "LoginNotFound",
                "The login is not associated with this user.",
            )),
        }
    }

    async fn get_logins(&self, employee_id: &str) -> AppResult<Vec<EmployeeLogin>> {
        let employee = self.require(employee_id).await?;
        self.employees.get_logins(employee.id()).await
    }

    async fn set_token(
        &self,
        employee_id: &str,
        login_provider: &str,
        name: &str,
        value: &str,
    ) -> AppResult<IdentityResult> {
        let employee = self.require(employee_id).await?;
        self.employees
            .set_token(EmployeeToken {
                user_id: employee.id().to_string(),
                login_provider: login_provider.to_string(),
                name: name.to_string(),
                value: Some(value.to_string()),
            })
            .await?;
        Ok(IdentityResult::success())
    }

    async fn get_token(
        &self,
        employee_id: &str,
        login_provider: &str,
        name: &str,
    ) -> AppResult<Option<String>> {
        Ok(self
            .employees
            .find_token(employee_id, login_provider, name)
            .await?
            .and_then(|t| t.value))
    }

    async fn remove_token(
        &self,
        employee_id: &str,
        login_provider: &str,
        name: &str,
    ) -> AppResult<IdentityResult> {
        if let Some(token) = self
            .employees
            .find_token(employee_id, login_provider, name)
            .await?
        {
            self.employees.remove_token(token).await?;
        }
        Ok(IdentityResult::success())
    }

    async fn deactivate(&self, employee_id: &str) -> AppResult<IdentityResult> {
        let mut employee = self.require(employee_id).await?;
        employee.deactivate();
        tracing::info!(employee_id, "Employee deactivated");
        self.save(employee).await
    }

    async fn activate(&self, employee_id: &str) -> AppResult<IdentityResult> {
        let mut employee = self.require(employee_id).await?;
        employee.activate();
        employee.access_failed_count = 0;
        tracing::info!(employee_id, "Employee activated");
        self.save(employee).await
    }

    async fn confirm_email(&self, employee_id: &str) -> AppResult<IdentityResult> {
        let mut employee = self.require(employee_id).await?;
        employee.email_confirmed = true;
        self.save(employee).await
    }

    async fn delete(&self, employee_id: &str) -> AppResult<IdentityResult> {
        let employee = self.require(employee_id).await?;
        self.employees.delete(employee).await?;
        tracing::info!(employee_id, "Employee soft deleted");
        Ok(IdentityResult::success())
    }

    fn check_password(&self, employee: &Employee, password: &str) -> bool {
        employee
            .password_hash
            .as_deref()
            .is_some_and(|hash| Password::from_hash(hash).verify(password))
    }

    async fn access_failed(&self, employee_id: &str) -> AppResult<bool> {
        let mut employee = self.require(employee_id).await?;
        employee.access_failed_count += 1;

        let lockout = &self.options.lockout;
        let locked = employee.lockout_enabled
            && employee.access_failed_count >= lockout.max_failed_access_attempts;
        if locked {
            employee.lockout_end = Some(Utc::now() + Duration::minutes(lockout.lockout_minutes));
            employee.access_failed_count = 0;
            tracing::warn!(employee_id, "Employee locked out after failed sign-ins");
        }

        self.employees.update(employee).await?;
        Ok(locked)
    }

    async fn reset_access_failed(&self, employee_id: &str) -> AppResult<()> {
        let mut employee = self.require(employee_id).await?;
        if employee.access_failed_count != 0 {
            employee.access_failed_count = 0;
            self.employees.update(employee).await?;
        }
        Ok(())
    }
}
