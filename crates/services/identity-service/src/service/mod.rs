//! Service layer for identity business logic.

mod employee_service;
mod role_service;

pub use employee_service::{EmployeeManager, EmployeeService};
pub use role_service::{RoleManager, RoleService};
