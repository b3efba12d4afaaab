//! Token service configuration.

use std::env;

use common::{env_or, AppError, AppResult, JwtConfig};
use domain::{
    DEFAULT_CLIENT_ID, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_REFRESH_TOKEN_DAYS,
    MIN_JWT_SECRET_LENGTH,
};

/// Token service configuration.
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Signing secret and token lifetimes
    pub jwt: JwtConfig,
    /// Client id recorded on persisted grants
    pub client_id: String,
}

impl TokenServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Fails when `JWT_SECRET` is missing or shorter than the minimum length.
    pub fn from_env() -> AppResult<Self> {
        let secret = env::var("JWT_SECRET").map_err(|_| {
            AppError::internal(format!(
                "JWT_SECRET must be set (minimum {} characters)",
                MIN_JWT_SECRET_LENGTH
            ))
        })?;

        Self::new(JwtConfig {
            secret,
            expiration_hours: env_or("JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS),
            refresh_token_days: env_or("REFRESH_TOKEN_DAYS", DEFAULT_REFRESH_TOKEN_DAYS),
        })
    }

    /// Build from an explicit JWT configuration, validating the secret.
    pub fn new(jwt: JwtConfig) -> AppResult<Self> {
        if jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            jwt,
            client_id: DEFAULT_CLIENT_ID.to_string(),
        })
    }

    /// Get JWT secret as bytes.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt.secret.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_rejected() {
        let jwt = JwtConfig {
            secret: "too-short".to_string(),
            ..Default::default()
        };
        assert!(TokenServiceConfig::new(jwt).is_err());
    }

    #[test]
    fn test_valid_secret_accepted() {
        let jwt = JwtConfig {
            secret: "a".repeat(MIN_JWT_SECRET_LENGTH),
            ..Default::default()
        };
        let config = TokenServiceConfig::new(jwt).unwrap();
        assert_eq!(config.client_id, DEFAULT_CLIENT_ID);
        assert!(!format!("{:?}", config).contains("aaaa"));
    }
}
