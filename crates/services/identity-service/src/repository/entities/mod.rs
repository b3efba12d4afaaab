//! SeaORM entities for the identity and token-issuer tables.

pub mod device_code;
pub mod employee;
pub mod employee_claim;
pub mod employee_login;
pub mod employee_role;
pub mod employee_token;
pub mod persisted_grant;
pub mod role;
pub mod role_claim;
pub mod signing_key;
