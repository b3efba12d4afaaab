//! Claim value type.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CLAIM_ISSUER_SYSTEM, CLAIM_TYPE_ROLE, CLAIM_TYPE_USERS_NAME, CLAIM_VALUE_TYPE_STRING,
};

/// A typed key/value attribute attached to an employee or role and
/// consumed by authorization checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
    pub issuer: String,
    pub value_type: String,
}

impl Claim {
    /// String claim issued by the system.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            issuer: CLAIM_ISSUER_SYSTEM.to_string(),
            value_type: CLAIM_VALUE_TYPE_STRING.to_string(),
        }
    }

    /// `Role` claim for the given role name.
    pub fn role(role_name: impl Into<String>) -> Self {
        Self::new(CLAIM_TYPE_ROLE, role_name)
    }

    /// `UsersName` claim carrying a display name.
    pub fn users_name(display_name: impl Into<String>) -> Self {
        Self::new(CLAIM_TYPE_USERS_NAME, display_name)
    }

    pub fn is_type(&self, claim_type: &str) -> bool {
        self.claim_type == claim_type
    }
}
