//! Token issuing business logic.

mod token_service;

pub use token_service::{Authenticator, Claims, RegisterEmployee, TokenResponse, TokenService};
