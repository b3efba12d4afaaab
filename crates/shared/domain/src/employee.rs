//! Employee domain entity and its satellite records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditEnvelope, DataModel};
use crate::claim::Claim;
use crate::role::{normalize, Role};

/// Lockout end used for deactivated accounts (the largest instant the
/// identity tables store).
pub fn lockout_forever() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// A system user / login identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(flatten)]
    pub audit: AuditEnvelope,
    pub user_name: String,
    pub normalized_user_name: String,
    pub email: String,
    pub normalized_email: String,
    pub email_confirmed: bool,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing, default)]
    pub security_stamp: String,
    pub concurrency_stamp: String,
    pub phone_number: Option<String>,
    pub phone_number_confirmed: bool,
    pub two_factor_enabled: bool,
    pub lockout_end: Option<DateTime<Utc>>,
    pub lockout_enabled: bool,
    pub access_failed_count: i32,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    /// Eagerly loaded whenever an employee is read
    pub roles: Vec<EmployeeRole>,
    pub claims: Vec<EmployeeClaim>,
    pub logins: Vec<EmployeeLogin>,
    pub tokens: Vec<EmployeeToken>,
}

impl Employee {
    /// New, active, unconfirmed employee.
    pub fn new(
        user_name: impl Into<String>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let user_name = user_name.into();
        let email = email.into();
        Self {
            audit: AuditEnvelope::new(),
            normalized_user_name: normalize(&user_name),
            normalized_email: normalize(&email),
            user_name,
            email,
            email_confirmed: false,
            password_hash: None,
            security_stamp: Uuid::new_v4().to_string(),
            concurrency_stamp: Uuid::new_v4().to_string(),
            phone_number: None,
            phone_number_confirmed: false,
            two_factor_enabled: false,
            lockout_end: None,
            lockout_enabled: true,
            access_failed_count: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            is_active: true,
            roles: Vec::new(),
            claims: Vec::new(),
            logins: Vec::new(),
            tokens: Vec::new(),
        }
    }

    pub fn set_user_name(&mut self, user_name: impl Into<String>) {
        self.user_name = user_name.into();
        self.normalized_user_name = normalize(&self.user_name);
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.normalized_email = normalize(&self.email);
    }

    /// Soft-lock the account: inactive and locked out indefinitely.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.lockout_end = Some(lockout_forever());
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.lockout_end = None;
    }

    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        self.lockout_end.is_some_and(|end| end > now)
    }

    /// Names of eagerly loaded roles.
    pub fn role_names(&self) -> Vec<String> {
        self.roles
            .iter()
            .filter_map(|r| r.role.as_ref().map(|role| role.name.clone()))
            .collect()
    }

    pub fn has_role(&self, role_name: &str) -> bool {
        let wanted = normalize(role_name);
        self.roles
            .iter()
            .filter_map(|r| r.role.as_ref())
            .any(|role| role.normalized_name == wanted)
    }

    /// Employee claims plus the claims of every eagerly loaded role.
    pub fn all_claims(&self) -> Vec<Claim> {
        let mut claims: Vec<Claim> = self.claims.iter().map(EmployeeClaim::to_claim).collect();
        for role in self.roles.iter().filter_map(|r| r.role.as_ref()) {
            for claim in role.claim_values() {
                if !claims.contains(&claim) {
                    claims.push(claim);
                }
            }
        }
        claims
    }
}

impl DataModel for Employee {
    fn audit(&self) -> &AuditEnvelope {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditEnvelope {
        &mut self.audit
    }

    fn search(&self, value: &str) -> bool {
        let needle = normalize(value);
        [
            &self.normalized_user_name,
            &self.normalized_email,
            &normalize(&self.first_name),
            &normalize(&self.last_name),
        ]
        .iter()
        .any(|field| field.contains(&needle))
    }
}

impl PartialEq for Employee {
    fn eq(&self, other: &Self) -> bool {
        self.audit == other.audit
    }
}

impl Eq for Employee {}

impl std::fmt::Display for Employee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// Employee ↔ role join. Keyed by (user_id, role_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRole {
    pub user_id: String,
    pub role_id: String,
    /// Eagerly loaded role, including its claims
    pub role: Option<Role>,
}

impl EmployeeRole {
    pub fn new(user_id: impl Into<String>, role_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role_id: role_id.into(),
            role: None,
        }
    }
}

impl PartialEq for EmployeeRole {
    fn eq(&self, other: &Self) -> bool {
        self.user_id == other.user_id && self.role_id == other.role_id
    }
}

impl Eq for EmployeeRole {}

/// Claim attached to an employee. The id is assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeClaim {
    pub id: i32,
    pub user_id: String,
    pub claim_type: String,
    pub claim_value: String,
}

impl EmployeeClaim {
    pub fn new(user_id: impl Into<String>, claim: &Claim) -> Self {
        Self {
            id: 0,
            user_id: user_id.into(),
            claim_type: claim.claim_type.clone(),
            claim_value: claim.value.clone(),
        }
    }

    pub fn to_claim(&self) -> Claim {
        Claim::new(self.claim_type.clone(), self.claim_value.clone())
    }
}

/// External login. Keyed by (login_provider, provider_key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeLogin {
    pub login_provider: String,
    pub provider_key: String,
    pub provider_display_name: Option<String>,
    pub user_id: String,
}

/// Authentication token stored for an employee. Keyed by
/// (user_id, login_provider, name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeToken {
    pub user_id: String,
    pub login_provider: String,
    pub name: String,
    pub value: Option<String>,
}

/// Employee as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub is_active: bool,
    pub email_confirmed: bool,
    pub is_deleted: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// Employee who performed the last operation on this record
    pub employee_id: String,
    pub roles: Vec<String>,
}

impl From<&Employee> for EmployeeResponse {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id().to_string(),
            user_name: employee.user_name.clone(),
            email: employee.email.clone(),
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            display_name: employee.to_string(),
            is_active: employee.is_active,
            email_confirmed: employee.email_confirmed,
            is_deleted: employee.is_deleted(),
            created: employee.audit.created(),
            modified: employee.audit.modified(),
            employee_id: employee.audit.employee_id().to_string(),
            roles: employee.role_names(),
        }
    }
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self::from(&employee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn employee() -> Employee {
        Employee::new("jdoe@example.com", "jdoe@example.com", "Jane", "Doe")
    }

    #[test]
    fn test_display_is_last_comma_first() {
        assert_eq!(employee().to_string(), "Doe, Jane");
    }

    #[test]
    fn test_new_employee_defaults() {
        let e = employee();
        assert!(e.is_active);
        assert!(!e.email_confirmed);
        assert!(e.lockout_enabled);
        assert_eq!(e.normalized_email, "JDOE@EXAMPLE.COM");
        assert!(e.password_hash.is_none());
    }

    #[test]
    fn test_deactivate_and_activate() {
        let mut e = employee();
        e.deactivate();
        assert!(!e.is_active);
        assert_eq!(e.lockout_end, Some(lockout_forever()));
        assert!(e.is_locked_out(Utc::now()));

        e.activate();
        assert!(e.is_active);
        assert!(e.lockout_end.is_none());
        assert!(!e.is_locked_out(Utc::now()));
    }

    #[test]
    fn test_expired_lockout_is_not_locked() {
        let mut e = employee();
        e.lockout_end = Some(Utc::now() - Duration::minutes(1));
        assert!(!e.is_locked_out(Utc::now()));
    }

    #[test]
    fn test_role_names_and_claims_from_eager_roles() {
        let mut e = employee();
        let mut role = Role::new("admin");
        role.claims
            .push(crate::role::RoleClaim::new(role.id(), &Claim::new("Scope", "all")));
        let mut join = EmployeeRole::new(e.id(), role.id());
        join.role = Some(role);
        e.roles.push(join);
        e.claims.push(EmployeeClaim::new(e.id(), &Claim::role("admin")));

        assert_eq!(e.role_names(), vec!["admin".to_string()]);
        assert!(e.has_role("ADMIN"));
        assert!(!e.has_role("user"));

        let claims = e.all_claims();
        assert_eq!(claims.len(), 2);
        assert!(claims.contains(&Claim::new("Scope", "all")));
    }

    #[test]
    fn test_search_matches_names_and_email() {
        let e = employee();
        assert!(e.search("doe"));
        assert!(e.search("JANE"));
        assert!(e.search("example.com"));
        assert!(!e.search("smith"));
    }

    #[test]
    fn test_response_hides_secrets() {
        let mut e = employee();
        e.password_hash = Some("hash".to_string());
        let json = serde_json::to_string(&EmployeeResponse::from(&e)).unwrap();
        assert!(!json.contains("hash\""));
        assert!(json.contains("\"displayName\":\"Doe, Jane\""));
        assert!(json.contains("\"isDeleted\":false"));
    }
}
