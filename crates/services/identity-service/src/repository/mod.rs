//! Repository layer for data access.

mod context;
mod device_flow_store;
mod employee_repository;
pub mod entities;
mod grant_store;
mod key_store;
mod role_repository;

pub use context::{EntityKey, EntityState, PersistenceContext, TrackedEntity, TrackedEntry};
pub use device_flow_store::{DeviceFlowCodeStore, DeviceFlowStore};
pub use employee_repository::{EmployeeRepository, EmployeeStore};
pub use grant_store::{GrantStore, PersistedGrantStore};
pub use key_store::{KeyStore, SigningKeyStore};
pub use role_repository::{RoleRepository, RoleStore};

#[cfg(any(test, feature = "test-utils"))]
pub use device_flow_store::MockDeviceFlowStore;
#[cfg(any(test, feature = "test-utils"))]
pub use employee_repository::MockEmployeeRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use grant_store::MockGrantStore;
#[cfg(any(test, feature = "test-utils"))]
pub use key_store::MockKeyStore;
#[cfg(any(test, feature = "test-utils"))]
pub use role_repository::MockRoleRepository;
