//! Employee lookups for sign-in, backed by the in-process employee manager.

use std::sync::Arc;

use async_trait::async_trait;

use common::AppResult;
use domain::{Claim, Employee, IdentityResult};
use identity_service_lib::service::EmployeeService;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Trait for employee operations needed by the token service.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Find active employee by user name
    async fn find_by_name(&self, user_name: &str) -> AppResult<Option<Employee>>;

    /// Find active employee by email
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Employee>>;

    /// Find active employee by id
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Employee>>;

    /// Create a new employee with the given password
    async fn create(&self, employee: Employee, password: &str) -> AppResult<IdentityResult>;

    async fn add_to_role(&self, employee_id: &str, role_name: &str) -> AppResult<IdentityResult>;

    async fn add_claim(&self, employee_id: &str, claim: Claim) -> AppResult<IdentityResult>;

    fn check_password(&self, employee: &Employee, password: &str) -> bool;

    /// Record a failed attempt. Returns true when the employee is now locked out.
    async fn access_failed(&self, employee_id: &str) -> AppResult<bool>;

    async fn reset_access_failed(&self, employee_id: &str) -> AppResult<()>;
}

/// Directory over an [`EmployeeService`] in the same process.
pub struct LocalEmployeeDirectory {
    employees: Arc<dyn EmployeeService>,
}

impl LocalEmployeeDirectory {
    pub fn new(employees: Arc<dyn EmployeeService>) -> Self {
        Self { employees }
    }
}

#[async_trait]
impl EmployeeDirectory for LocalEmployeeDirectory {
    async fn find_by_name(&self, user_name: &str) -> AppResult<Option<Employee>> {
        self.employees.find_by_name(user_name).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        self.employees.find_by_email(email).await
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Employee>> {
        self.employees.find_by_id(id).await
    }

    async fn create(&self, employee: Employee, password: &str) -> AppResult<IdentityResult> {
        self.employees.create(employee, password).await
    }

    async fn add_to_role(&self, employee_id: &str, role_name: &str) -> AppResult<IdentityResult> {
        self.employees.add_to_role(employee_id, role_name).await
    }

    async fn add_claim(&self, employee_id: &str, claim: Claim) -> AppResult<IdentityResult> {
        self.employees.add_claim(employee_id, claim).await
    }

    fn check_password(&self, employee: &Employee, password: &str) -> bool {
        self.employees.check_password(employee, password)
    }

    async fn access_failed(&self, employee_id: &str) -> AppResult<bool> {
        self.employees.access_failed(employee_id).await
    }

    async fn reset_access_failed(&self, employee_id: &str) -> AppResult<()> {
        self.employees.reset_access_failed(employee_id).await
    }
}
