//! Audit envelope shared by every business entity saved to the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Common audit columns: identity, timestamps, soft delete flag and the
/// employee who performed the last operation.
///
/// The id is fixed at construction; there is no setter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEnvelope {
    id: String,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    is_deleted: bool,
    employee_id: String,
}

impl AuditEnvelope {
    /// Fresh envelope with a new GUID id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Fresh envelope with a caller supplied id.
    pub fn with_id(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            created: now,
            modified: now,
            is_deleted: false,
            employee_id: String::new(),
        }
    }

    /// Rebuild an envelope from stored columns.
    pub fn restore(
        id: String,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
        is_deleted: bool,
        employee_id: String,
    ) -> Self {
        Self {
            id,
            created,
            modified,
            is_deleted,
            employee_id,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    /// Called when the entity is first written.
    pub fn on_created(&mut self, actor: Option<&str>) {
        let now = Utc::now();
        self.created = now;
        self.modified = now;
        self.is_deleted = false;
        self.attribute(actor);
    }

    /// Called when the entity is updated.
    pub fn on_updated(&mut self, actor: Option<&str>) {
        self.modified = Utc::now();
        self.attribute(actor);
    }

    /// Called instead of a physical delete. Never touches id or created.
    pub fn on_delete(&mut self, actor: Option<&str>) {
        self.is_deleted = true;
        self.modified = Utc::now();
        self.attribute(actor);
    }

    /// Clears the soft delete flag.
    pub fn on_restore(&mut self, actor: Option<&str>) {
        self.is_deleted = false;
        self.modified = Utc::now();
        self.attribute(actor);
    }

    pub fn set_employee_id(&mut self, employee_id: impl Into<String>) {
        self.employee_id = employee_id.into();
    }

    pub fn set_modified(&mut self, modified: DateTime<Utc>) {
        self.modified = modified;
    }

    fn attribute(&mut self, actor: Option<&str>) {
        if let Some(actor) = actor {
            self.employee_id = actor.to_string();
        }
    }
}

impl Default for AuditEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for AuditEnvelope {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AuditEnvelope {}

impl std::hash::Hash for AuditEnvelope {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Entity carrying an [`AuditEnvelope`].
///
/// Implementors get the lifecycle hooks for free; the persistence context
/// calls them when it saves staged changes.
pub trait DataModel {
    fn audit(&self) -> &AuditEnvelope;

    fn audit_mut(&mut self) -> &mut AuditEnvelope;

    /// Case-insensitive match used by list filters.
    fn search(&self, value: &str) -> bool;

    fn id(&self) -> &str {
        self.audit().id()
    }

    fn is_deleted(&self) -> bool {
        self.audit().is_deleted()
    }

    fn on_created(&mut self, actor: Option<&str>) {
        self.audit_mut().on_created(actor);
    }

    fn on_updated(&mut self, actor: Option<&str>) {
        self.audit_mut().on_updated(actor);
    }

    fn on_delete(&mut self, actor: Option<&str>) {
        self.audit_mut().on_delete(actor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_envelope_is_live() {
        let envelope = AuditEnvelope::new();
        assert!(!envelope.is_deleted());
        assert!(Uuid::parse_str(envelope.id()).is_ok());
        assert_eq!(envelope.created(), envelope.modified());
        assert!(envelope.employee_id().is_empty());
    }

    #[test]
    fn test_on_delete_keeps_identity() {
        let mut envelope = AuditEnvelope::new();
        let id = envelope.id().to_string();
        let created = envelope.created();

        envelope.on_delete(Some("actor-1"));

        assert!(envelope.is_deleted());
        assert_eq!(envelope.id(), id);
        assert_eq!(envelope.created(), created);
        assert!(envelope.modified() >= created);
        assert_eq!(envelope.employee_id(), "actor-1");
    }

    #[test]
    fn test_on_delete_twice_stays_deleted() {
        let mut envelope = AuditEnvelope::new();
        envelope.on_delete(None);
        envelope.on_delete(None);
        assert!(envelope.is_deleted());
    }

    #[test]
    fn test_on_updated_without_actor_keeps_attribution() {
        let mut envelope = AuditEnvelope::new();
        envelope.set_employee_id("first");
        envelope.on_updated(None);
        assert_eq!(envelope.employee_id(), "first");
    }

    #[test]
    fn test_equality_by_id_only() {
        let a = AuditEnvelope::with_id("same");
        let mut b = AuditEnvelope::with_id("same");
        b.on_delete(Some("someone"));
        assert_eq!(a, b);
        assert_ne!(a, AuditEnvelope::with_id("other"));
    }
}
