//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Roles
// =============================================================================

/// Full administrative access
pub const ROLE_ADMIN: &str = "admin";

/// Standard employee access
pub const ROLE_USER: &str = "user";

/// Read-only access
pub const ROLE_READONLY: &str = "readonly";

/// All roles provisioned at seed time
pub const DEFAULT_ROLES: &[&str] = &[ROLE_USER, ROLE_ADMIN, ROLE_READONLY];

/// Check if a role name is one of the provisioned roles
pub fn is_valid_role(role: &str) -> bool {
    DEFAULT_ROLES.contains(&role)
}

// =============================================================================
// Authorization Policies
// =============================================================================

pub const POLICY_ADMIN_ONLY: &str = "adminonly";
pub const POLICY_USER_ONLY: &str = "useronly";
pub const POLICY_READONLY: &str = "readonly";
pub const POLICY_ADMIN_USER_ONLY: &str = "adminuseronly";

// =============================================================================
// Claims
// =============================================================================

/// Claim type carrying a role name
pub const CLAIM_TYPE_ROLE: &str = "Role";

/// Claim type carrying the employee display name
pub const CLAIM_TYPE_USERS_NAME: &str = "UsersName";

/// Issuer recorded on claims created by the system itself
pub const CLAIM_ISSUER_SYSTEM: &str = "System";

/// Value type recorded on string claims
pub const CLAIM_VALUE_TYPE_STRING: &str = "String";

// =============================================================================
// Password Policy Defaults
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum number of distinct characters in a password
pub const MIN_PASSWORD_UNIQUE_CHARS: usize = 1;

// =============================================================================
// Lockout
// =============================================================================

/// Failed sign-in attempts before lockout
pub const DEFAULT_MAX_FAILED_ACCESS_ATTEMPTS: i32 = 5;

/// Lockout duration after too many failures
pub const DEFAULT_LOCKOUT_MINUTES: i64 = 5;

// =============================================================================
// Authentication
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

/// Default refresh token lifetime in days
pub const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 30;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Grant type under which refresh tokens are persisted
pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";

/// Client id recorded on grants issued by the built-in host
pub const DEFAULT_CLIENT_ID: &str = "employee-identity";
