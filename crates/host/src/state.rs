//! Application state for dependency injection.

use std::sync::Arc;

use common::IdentityOptions;
use identity_service_lib::infra::Database;
use identity_service_lib::IdentityScope;
use token_service_lib::authenticator_for;
use token_service_lib::config::TokenServiceConfig;
use token_service_lib::service::TokenService;

use crate::middleware::CurrentUser;

/// Application state shared across handlers.
///
/// Only the connection pool and options are shared. Each request builds its
/// own [`IdentityScope`] so writes are attributed to the caller.
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub options: IdentityOptions,
    pub token_config: TokenServiceConfig,
}

impl AppState {
    /// Create new app state.
    pub fn new(database: Database, options: IdentityOptions, token_config: TokenServiceConfig) -> Self {
        Self {
            database,
            options,
            token_config,
        }
    }

    /// Services for one request, acting as `user` when given.
    pub fn scope(&self, user: Option<&CurrentUser>) -> IdentityScope {
        IdentityScope::new(
            self.database.get_connection(),
            self.options.clone(),
            user.map(|u| u.id.clone()),
        )
    }

    /// Token service over the given scope.
    pub fn tokens(&self, scope: &IdentityScope) -> Arc<dyn TokenService> {
        Arc::new(authenticator_for(
            scope,
            self.token_config.clone(),
            self.options.clone(),
        ))
    }
}
