//! Domain layer - employee identity entities and value objects.
//!
//! Pure domain logic with no infrastructure dependencies. Persistence and
//! HTTP concerns live in the service and host crates.

pub mod audit;
pub mod claim;
pub mod constants;
pub mod employee;
pub mod error;
pub mod grant;
pub mod password;
pub mod policy;
pub mod results;
pub mod role;

pub use audit::{AuditEnvelope, DataModel};
pub use claim::Claim;
pub use constants::*;
pub use employee::{
    lockout_forever, Employee, EmployeeClaim, EmployeeLogin, EmployeeResponse, EmployeeRole,
    EmployeeToken,
};
pub use error::{DomainError, DomainResult};
pub use grant::{DeviceFlowCode, GrantFilter, PersistedGrant, SigningKey};
pub use password::{Password, PasswordPolicy};
pub use policy::Policy;
pub use results::{
    DisplayableResults, IdentityError, IdentityResult, OperationResult, SuccessFailure, YesNo,
};
pub use role::{normalize, Role, RoleClaim};
