//! Token service - sign-in, bearer tokens and refresh-token grants.
//!
//! Access tokens are HS256 JWTs. Refresh tokens are opaque keys stored as
//! `refresh_token` persisted grants and consumed on use.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::{AppError, AppResult, IdentityOptions, OptionExt};
use domain::{
    Claim, DataModel, Employee, GrantFilter, Password, PersistedGrant, GRANT_TYPE_REFRESH_TOKEN,
    ROLE_USER, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER,
};
use identity_service_lib::repository::GrantStore;

use crate::client::EmployeeDirectory;
use crate::config::TokenServiceConfig;

/// Verified against when the user name is unknown so that both paths cost
/// one Argon2 verification.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Employee id
    pub sub: String,
    pub email: String,
    /// Display name (`"{last}, {first}"`)
    pub name: String,
    pub role: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// Token pair returned after successful authentication
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// JWT access token
    pub access_token: String,
    /// Opaque refresh token
    pub refresh_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access token expiration time in seconds
    pub expires_in: i64,
}

/// Self-service registration input.
#[derive(Debug, Clone)]
pub struct RegisterEmployee {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Token service trait for dependency injection.
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Register a new employee in the `user` role. The email starts unconfirmed.
    async fn register(&self, request: RegisterEmployee) -> AppResult<Employee>;

    /// Check credentials and issue a token pair
    async fn sign_in(&self, user_name: &str, password: &str) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Consume a refresh token and issue a fresh pair from current data
    async fn refresh(&self, refresh_token: &str) -> AppResult<TokenResponse>;

    /// Revoke every grant of the subject. Returns the number removed.
    async fn sign_out(&self, subject_id: &str) -> AppResult<u64>;
}

/// Concrete implementation of TokenService.
pub struct Authenticator {
    directory: Arc<dyn EmployeeDirectory>,
    grants: Arc<dyn GrantStore>,
    config: TokenServiceConfig,
    options: IdentityOptions,
}

impl Authenticator {
    /// Create new token service instance
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        grants: Arc<dyn GrantStore>,
        config: TokenServiceConfig,
        options: IdentityOptions,
    ) -> Self {
        Self {
            directory,
            grants,
            config,
            options,
        }
    }

    async fn find_employee(&self, user_name: &str) -> AppResult<Option<Employee>> {
        match self.directory.find_by_name(user_name).await? {
            Some(employee) => Ok(Some(employee)),
            None => self.directory.find_by_email(user_name).await,
        }
    }

    /// Checks run before the password: confirmed email, then lockout.
    fn pre_sign_in_check(&self, employee: &Employee) -> AppResult<()> {
        if self.options.require_confirmed_account && !employee.email_confirmed {
            return Err(AppError::NotAllowed(
                "Email address is not confirmed".to_string(),
            ));
        }
        if !employee.is_active || employee.is_locked_out(Utc::now()) {
            return Err(AppError::LockedOut);
        }
        Ok(())
    }

    fn generate_access_token(&self, employee: &Employee) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.jwt.expiration_hours);

        let claims = Claims {
            sub: employee.id().to_string(),
            email: employee.email.clone(),
            name: employee.to_string(),
            role: employee.role_names(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )?)
    }

    async fn issue_tokens(&self, employee: &Employee) -> AppResult<TokenResponse> {
        let access_token = self.generate_access_token(employee)?;

        let now = Utc::now();
        let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        self.grants
            .store(PersistedGrant {
                key: refresh_token.clone(),
                grant_type: GRANT_TYPE_REFRESH_TOKEN.to_string(),
                subject_id: Some(employee.id().to_string()),
                session_id: None,
                client_id: self.config.client_id.clone(),
                description: None,
                creation_time: now,
                expiration: Some(now + Duration::days(self.config.jwt.refresh_token_days)),
                consumed_time: None,
                data: serde_json::json!({ "userName": employee.user_name }).to_string(),
            })
            .await?;

        Ok(TokenResponse {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.jwt.expiration_hours * SECONDS_PER_HOUR,
        })
    }
}

#[async_trait]
impl TokenService for Authenticator {
    async fn register(&self, request: RegisterEmployee) -> AppResult<Employee> {
        let employee = Employee::new(
            &request.email,
            &request.email,
            &request.first_name,
            &request.last_name,
        );
        let id = employee.id().to_string();
        let display_name = employee.to_string();

        let created = self.directory.create(employee, &request.password).await?;
        if !created.succeeded {
            if created.errors.iter().any(|e| e.code.starts_with("Duplicate")) {
                return Err(AppError::conflict("Employee"));
            }
            return Err(AppError::validation(created.descriptions().join(", ")));
        }

        let assigned = self.directory.add_to_role(&id, ROLE_USER).await?;
        if !assigned.succeeded {
            return Err(AppError::internal(assigned.to_string()));
        }
        self.directory.add_claim(&id, Claim::role(ROLE_USER)).await?;
        self.directory
            .add_claim(&id, Claim::users_name(display_name))
            .await?;

        tracing::info!(employee_id = %id, "Employee registered");
        self.directory.find_by_id(&id).await?.ok_or_not_found()
    }

    async fn sign_in(&self, user_name: &str, password: &str) -> AppResult<TokenResponse> {
        let Some(employee) = self.find_employee(user_name).await? else {
            let _ = Password::from_hash(DUMMY_HASH).verify(password);
            return Err(AppError::InvalidCredentials);
        };

        self.pre_sign_in_check(&employee)?;

        if !self.directory.check_password(&employee, password) {
            let locked = self.directory.access_failed(employee.id()).await?;
            tracing::debug!(employee_id = %employee.id(), "Failed sign-in attempt");
            return Err(if locked {
                AppError::LockedOut
            } else {
                AppError::InvalidCredentials
            });
        }

        self.directory.reset_access_failed(employee.id()).await?;
        tracing::info!(employee_id = %employee.id(), "Employee signed in");
        self.issue_tokens(&employee).await
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let grant = self
            .grants
            .get(refresh_token)
            .await?
            .filter(|g| g.grant_type == GRANT_TYPE_REFRESH_TOKEN && g.is_usable(now))
            .ok_or(AppError::Unauthorized)?;

        if !self.grants.consume(&grant.key, now).await? {
            return Err(AppError::Unauthorized);
        }

        // Re-read the employee so the new token carries current roles
        let subject = grant.subject_id.ok_or(AppError::Unauthorized)?;
        let employee = self
            .directory
            .find_by_id(&subject)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !employee.is_active || employee.is_locked_out(now) {
            return Err(AppError::LockedOut);
        }

        self.issue_tokens(&employee).await
    }

    async fn sign_out(&self, subject_id: &str) -> AppResult<u64> {
        let removed = self
            .grants
            .remove_all(GrantFilter::for_subject(subject_id))
            .await?;
        tracing::info!(subject_id, removed, "Employee signed out");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockEmployeeDirectory;
    use common::JwtConfig;
    use domain::{EmployeeRole, IdentityResult, Role};
    use identity_service_lib::repository::MockGrantStore;

    const SECRET: &str = "test-secret-key-for-testing-only-32chars";

    fn config() -> TokenServiceConfig {
        TokenServiceConfig::new(JwtConfig {
            secret: SECRET.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn employee() -> Employee {
        let mut employee = Employee::new("jdoe@example.com", "jdoe@example.com", "Jane", "Doe");
        employee.email_confirmed = true;
        employee.password_hash = Some(Password::new("V0lunteer$").unwrap().into_string());

        let role = Role::new("admin");
        let mut join = EmployeeRole::new(employee.id(), role.id());
        join.role = Some(role);
        employee.roles.push(join);
        employee
    }

    fn authenticator(
        directory: MockEmployeeDirectory,
        grants: MockGrantStore,
    ) -> Authenticator {
        Authenticator::new(
            Arc::new(directory),
            Arc::new(grants),
            config(),
            IdentityOptions::default(),
        )
    }

    fn directory_with(employee: Employee) -> MockEmployeeDirectory {
        let mut directory = MockEmployeeDirectory::new();
        directory
            .expect_find_by_name()
            .returning(move |_| Ok(Some(employee.clone())));
        directory
            .expect_check_password()
            .returning(|e, p| {
                e.password_hash
                    .as_deref()
                    .is_some_and(|h| Password::from_hash(h).verify(p))
            });
        directory
    }

    #[tokio::test]
    async fn test_sign_in_issues_verifiable_tokens() {
        let target = employee();
        let id = target.id().to_string();

        let mut directory = directory_with(target);
        directory
            .expect_reset_access_failed()
            .times(1)
            .returning(|_| Ok(()));

        let mut grants = MockGrantStore::new();
        grants
            .expect_store()
            .withf(|g| g.grant_type == GRANT_TYPE_REFRESH_TOKEN && g.expiration.is_some())
            .times(1)
            .returning(|_| Ok(()));

        let auth = authenticator(directory, grants);
        let tokens = auth.sign_in("jdoe@example.com", "V0lunteer$").await.unwrap();

        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 24 * 3600);
        let claims = auth.verify_token(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.name, "Doe, Jane");
        assert!(claims.has_role("ADMIN"));
    }

    #[tokio::test]
    async fn test_unknown_user_is_invalid_credentials() {
        let mut directory = MockEmployeeDirectory::new();
        directory.expect_find_by_name().returning(|_| Ok(None));
        directory.expect_find_by_email().returning(|_| Ok(None));
        directory.expect_access_failed().never();

        let result = authenticator(directory, MockGrantStore::new())
            .sign_in("nobody", "V0lunteer$")
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_wrong_password_records_failure() {
        let mut directory = directory_with(employee());
        directory
            .expect_access_failed()
            .times(1)
            .returning(|_| Ok(false));

        let result = authenticator(directory, MockGrantStore::new())
            .sign_in("jdoe@example.com", "wrong")
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_final_failed_attempt_reports_lockout() {
        let mut directory = directory_with(employee());
        directory.expect_access_failed().returning(|_| Ok(true));

        let result = authenticator(directory, MockGrantStore::new())
            .sign_in("jdoe@example.com", "wrong")
            .await;

        assert!(matches!(result, Err(AppError::LockedOut)));
    }

    #[tokio::test]
    async fn test_deactivated_employee_is_locked_out() {
        let mut target = employee();
        target.deactivate();

        let mut directory = directory_with(target);
        directory.expect_access_failed().never();

        let result = authenticator(directory, MockGrantStore::new())
            .sign_in("jdoe@example.com", "V0lunteer$")
            .await;

        assert!(matches!(result, Err(AppError::LockedOut)));
    }

    #[tokio::test]
    async fn test_unconfirmed_email_not_allowed() {
        let mut target = employee();
        target.email_confirmed = false;

        let result = authenticator(directory_with(target), MockGrantStore::new())
            .sign_in("jdoe@example.com", "V0lunteer$")
            .await;

        assert!(matches!(result, Err(AppError::NotAllowed(_))));
    }

    #[tokio::test]
    async fn test_refresh_rejects_consumed_grant() {
        let mut grants = MockGrantStore::new();
        grants.expect_get().returning(|key| {
            Ok(Some(PersistedGrant {
                key: key.to_string(),
                grant_type: GRANT_TYPE_REFRESH_TOKEN.to_string(),
                subject_id: Some("employee-1".to_string()),
                session_id: None,
                client_id: "employee-identity".to_string(),
                description: None,
                creation_time: Utc::now(),
                expiration: Some(Utc::now() + Duration::days(1)),
                consumed_time: Some(Utc::now()),
                data: "{}".to_string(),
            }))
        });
        grants.expect_consume().never();

        let result = authenticator(MockEmployeeDirectory::new(), grants)
            .refresh("token")
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict() {
        let mut directory = MockEmployeeDirectory::new();
        directory.expect_create().returning(|_, _| {
            Ok(IdentityResult::failed_with(
                "DuplicateUserName",
                "Username 'jdoe@example.com' is already taken.",
            ))
        });
        directory.expect_add_to_role().never();

        let result = authenticator(directory, MockGrantStore::new())
            .register(RegisterEmployee {
                email: "jdoe@example.com".to_string(),
                password: "V0lunteer$".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_sign_out_removes_subject_grants() {
        let mut grants = MockGrantStore::new();
        grants
            .expect_remove_all()
            .withf(|f| f.subject_id.as_deref() == Some("employee-1"))
            .returning(|_| Ok(2));

        let removed = authenticator(MockEmployeeDirectory::new(), grants)
            .sign_out("employee-1")
            .await
            .unwrap();

        assert_eq!(removed, 2);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let auth = authenticator(MockEmployeeDirectory::new(), MockGrantStore::new());
        assert!(auth.verify_token("not-a-jwt").is_err());
    }
}
