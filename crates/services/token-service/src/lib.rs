//! Token Service Library
//!
//! Sign-in, bearer tokens and refresh tokens for employees. Reads employees
//! through the identity service and persists refresh tokens as grants.

pub mod client;
pub mod config;
pub mod service;

use std::sync::Arc;

use common::IdentityOptions;
use identity_service_lib::IdentityScope;

use crate::client::LocalEmployeeDirectory;
use crate::config::TokenServiceConfig;
use crate::service::Authenticator;

/// Build an authenticator over the services of one identity scope.
pub fn authenticator_for(
    scope: &IdentityScope,
    config: TokenServiceConfig,
    options: IdentityOptions,
) -> Authenticator {
    Authenticator::new(
        Arc::new(LocalEmployeeDirectory::new(scope.employees.clone())),
        scope.grants.clone(),
        config,
        options,
    )
}
