//! Token-issuer records: persisted grants, signing keys and device codes.
//!
//! These carry no audit envelope and are physically removed when deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A grant issued to a client (refresh token, reference token, consent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedGrant {
    pub key: String,
    pub grant_type: String,
    pub subject_id: Option<String>,
    pub session_id: Option<String>,
    pub client_id: String,
    pub description: Option<String>,
    pub creation_time: DateTime<Utc>,
    pub expiration: Option<DateTime<Utc>>,
    pub consumed_time: Option<DateTime<Utc>>,
    pub data: String,
}

impl PersistedGrant {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|exp| exp <= now)
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_time.is_some()
    }

    /// Unexpired and never consumed.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.is_consumed()
    }
}

/// Filter for grant queries. At least one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantFilter {
    pub subject_id: Option<String>,
    pub session_id: Option<String>,
    pub client_id: Option<String>,
    pub grant_type: Option<String>,
}

impl GrantFilter {
    pub fn for_subject(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: Some(subject_id.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subject_id.is_none()
            && self.session_id.is_none()
            && self.client_id.is_none()
            && self.grant_type.is_none()
    }
}

/// Serialized signing key material.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningKey {
    pub id: String,
    pub version: i32,
    pub created: DateTime<Utc>,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    pub algorithm: String,
    pub is_x509_certificate: bool,
    pub data_protected: bool,
    pub data: String,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("algorithm", &self.algorithm)
            .field("data", &"[REDACTED]")
            .finish()
    }
}

/// Pending device-flow authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFlowCode {
    pub user_code: String,
    pub device_code: String,
    pub subject_id: Option<String>,
    pub session_id: Option<String>,
    pub client_id: String,
    pub description: Option<String>,
    pub creation_time: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn grant(expiration: Option<DateTime<Utc>>) -> PersistedGrant {
        PersistedGrant {
            key: "k".into(),
            grant_type: "refresh_token".into(),
            subject_id: Some("s".into()),
            session_id: None,
            client_id: "c".into(),
            description: None,
            creation_time: Utc::now(),
            expiration,
            consumed_time: None,
            data: "{}".into(),
        }
    }

    #[test]
    fn test_grant_usability() {
        let now = Utc::now();
        assert!(grant(None).is_usable(now));
        assert!(grant(Some(now + Duration::hours(1))).is_usable(now));
        assert!(!grant(Some(now - Duration::seconds(1))).is_usable(now));

        let mut consumed = grant(None);
        consumed.consumed_time = Some(now);
        assert!(!consumed.is_usable(now));
    }

    #[test]
    fn test_filter_emptiness() {
        assert!(GrantFilter::default().is_empty());
        assert!(!GrantFilter::for_subject("abc").is_empty());
    }

    #[test]
    fn test_signing_key_debug_redacts_data() {
        let key = SigningKey {
            id: "kid".into(),
            version: 1,
            created: Utc::now(),
            key_use: Some("signing".into()),
            algorithm: "RS256".into(),
            is_x509_certificate: false,
            data_protected: true,
            data: "private-material".into(),
        };
        assert!(!format!("{:?}", key).contains("private-material"));
    }
}
