//! Role domain entity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditEnvelope, DataModel};
use crate::claim::Claim;

/// A named permission group (admin, user, readonly).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(flatten)]
    pub audit: AuditEnvelope,
    pub name: String,
    pub normalized_name: String,
    pub concurrency_stamp: String,
    /// Eagerly loaded with the role
    pub claims: Vec<RoleClaim>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            audit: AuditEnvelope::new(),
            normalized_name: normalize(&name),
            name,
            concurrency_stamp: Uuid::new_v4().to_string(),
            claims: Vec::new(),
        }
    }

    /// Role claims as claim values.
    pub fn claim_values(&self) -> Vec<Claim> {
        self.claims.iter().map(RoleClaim::to_claim).collect()
    }
}

impl DataModel for Role {
    fn audit(&self) -> &AuditEnvelope {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditEnvelope {
        &mut self.audit
    }

    fn search(&self, value: &str) -> bool {
        self.normalized_name.contains(&normalize(value))
    }
}

impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        self.audit == other.audit
    }
}

impl Eq for Role {}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Claim attached to a role. The id is assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleClaim {
    pub id: i32,
    pub role_id: String,
    pub claim_type: String,
    pub claim_value: String,
}

impl RoleClaim {
    pub fn new(role_id: impl Into<String>, claim: &Claim) -> Self {
        Self {
            id: 0,
            role_id: role_id.into(),
            claim_type: claim.claim_type.clone(),
            claim_value: claim.value.clone(),
        }
    }

    pub fn to_claim(&self) -> Claim {
        Claim::new(self.claim_type.clone(), self.claim_value.clone())
    }
}

/// Upper-invariant normalization used for name lookups.
pub fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_role_is_normalized() {
        let role = Role::new("readonly");
        assert_eq!(role.name, "readonly");
        assert_eq!(role.normalized_name, "READONLY");
        assert!(!role.concurrency_stamp.is_empty());
        assert!(!role.is_deleted());
    }

    #[test]
    fn test_roles_equal_by_id() {
        let a = Role::new("admin");
        let mut b = a.clone();
        b.name = "renamed".to_string();
        assert_eq!(a, b);
        assert_ne!(a, Role::new("admin"));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let role = Role::new("admin");
        assert!(role.search("ADM"));
        assert!(!role.search("user"));
    }
}
