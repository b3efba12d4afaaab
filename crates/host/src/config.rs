//! Host configuration.

use std::env;

use common::{env_or, AppResult};
use identity_service_lib::config::IdentityServiceConfig;
use token_service_lib::config::TokenServiceConfig;

/// Host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database, seeding and identity options
    pub identity: IdentityServiceConfig,
    /// Token signing and lifetimes
    pub token: TokenServiceConfig,
}

impl HostConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("SERVER_PORT", 3000),
            identity: IdentityServiceConfig::from_env(),
            token: TokenServiceConfig::from_env()?,
        })
    }

    /// Socket address string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
