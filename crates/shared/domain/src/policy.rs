//! Named authorization policies.

use serde::{Deserialize, Serialize};

use crate::constants::{
    POLICY_ADMIN_ONLY, POLICY_ADMIN_USER_ONLY, POLICY_READONLY, POLICY_USER_ONLY, ROLE_ADMIN,
    ROLE_READONLY, ROLE_USER,
};

/// Authorization policy, satisfied when the caller holds any of its roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    AdminOnly,
    UserOnly,
    ReadOnly,
    AdminUserOnly,
}

impl Policy {
    pub const ALL: [Policy; 4] = [
        Policy::AdminOnly,
        Policy::UserOnly,
        Policy::ReadOnly,
        Policy::AdminUserOnly,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Policy::AdminOnly => POLICY_ADMIN_ONLY,
            Policy::UserOnly => POLICY_USER_ONLY,
            Policy::ReadOnly => POLICY_READONLY,
            Policy::AdminUserOnly => POLICY_ADMIN_USER_ONLY,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn required_roles(&self) -> &'static [&'static str] {
        match self {
            Policy::AdminOnly => &[ROLE_ADMIN],
            Policy::UserOnly => &[ROLE_USER],
            Policy::ReadOnly => &[ROLE_READONLY],
            Policy::AdminUserOnly => &[ROLE_ADMIN, ROLE_USER],
        }
    }

    /// Role names compare case-insensitively.
    pub fn is_satisfied_by<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|role| {
            self.required_roles()
                .iter()
                .any(|required| required.eq_ignore_ascii_case(role.as_ref()))
        })
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_only() {
        assert!(Policy::AdminOnly.is_satisfied_by(&["admin"]));
        assert!(!Policy::AdminOnly.is_satisfied_by(&["user", "readonly"]));
    }

    #[test]
    fn test_admin_user_only_accepts_either() {
        assert!(Policy::AdminUserOnly.is_satisfied_by(&["user"]));
        assert!(Policy::AdminUserOnly.is_satisfied_by(&["ADMIN"]));
        assert!(!Policy::AdminUserOnly.is_satisfied_by(&["readonly"]));
    }

    #[test]
    fn test_empty_roles_never_satisfy() {
        let none: [&str; 0] = [];
        for policy in Policy::ALL {
            assert!(!policy.is_satisfied_by(&none));
        }
    }

    #[test]
    fn test_names_round_trip() {
        assert_eq!(Policy::from_name("useronly"), Some(Policy::UserOnly));
        assert_eq!(Policy::ReadOnly.to_string(), "readonly");
        assert_eq!(Policy::from_name("superuser"), None);
    }
}
