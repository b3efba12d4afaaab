//! Authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use common::{AppError, AppResult};
use domain::{Policy, BEARER_TOKEN_PREFIX};
use token_service_lib::service::Claims;

use crate::state::AppState;

/// Current authenticated employee extracted from JWT.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            roles: claims.role,
        }
    }
}

impl CurrentUser {
    pub fn satisfies(&self, policy: Policy) -> bool {
        policy.is_satisfied_by(&self.roles)
    }

    /// Fail with `Forbidden` unless the employee satisfies the policy.
    pub fn require(&self, policy: Policy) -> AppResult<()> {
        if self.satisfies(policy) {
            Ok(())
        } else {
            tracing::debug!(employee_id = %self.id, %policy, "Policy check failed");
            Err(AppError::Forbidden)
        }
    }
}

/// Authentication middleware that validates JWT tokens.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Extract token from Authorization header
    let token = extract_token(&request)?;

    let scope = state.scope(None);
    let claims = state.tokens(&scope).verify_token(token)?;

    // A valid signature is not enough: the employee must still be allowed in
    let employee = scope
        .employees
        .find_by_id(&claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !employee.is_active || employee.is_locked_out(Utc::now()) {
        tracing::debug!(employee_id = %claims.sub, "Rejected token of locked out employee");
        return Err(AppError::LockedOut);
    }

    // Roles come from the store so revoked roles take effect immediately
    let mut current_user = CurrentUser::from(claims);
    current_user.roles = employee.role_names();

    // Insert current user into request extensions
    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Extract bearer token from Authorization header.
fn extract_token(request: &Request<Body>) -> AppResult<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .ok_or(AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> CurrentUser {
        CurrentUser {
            id: "employee-1".to_string(),
            email: "jdoe@example.com".to_string(),
            name: "Doe, Jane".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_require_policy() {
        assert!(user(&["admin"]).require(Policy::AdminOnly).is_ok());
        assert!(user(&["user"]).require(Policy::AdminUserOnly).is_ok());
        assert!(matches!(
            user(&["readonly"]).require(Policy::AdminUserOnly),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_extract_token() {
        let request = Request::builder()
            .header(AUTHORIZATION, "Bearer abc.def")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_token(&request).unwrap(), "abc.def");

        let request = Request::builder()
            .header(AUTHORIZATION, "Basic abc")
            .body(Body::empty())
            .unwrap();
        assert!(extract_token(&request).is_err());
    }
}
