//! Access to employee records needed by the token service.

mod employee_directory;

pub use employee_directory::{EmployeeDirectory, LocalEmployeeDirectory};

#[cfg(any(test, feature = "test-utils"))]
pub use employee_directory::MockEmployeeDirectory;
