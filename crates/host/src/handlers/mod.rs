//! HTTP request handlers.

pub mod account_handler;
pub mod employee_handler;
pub mod health_handler;

pub use account_handler::{account_routes, session_routes};
pub use employee_handler::employee_routes;
pub use health_handler::health_check;
