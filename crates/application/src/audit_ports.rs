use async_trait::async_trait;
use serde_json::Value;

use tenura_core::{AppResult, InstitutionId, UserId};
use tenura_domain::AuditAction;

/// Audit event emitted by administrative use-cases.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    /// Acting user.
    pub actor_user_id: UserId,
    /// Institution the actor was bound to.
    pub institution_id: Option<InstitutionId>,
    /// Stable action identifier.
    pub action: AuditAction,
    /// Resource kind targeted by the action.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Structured detail payload.
    pub detail: Option<Value>,
}

/// Persisted audit entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogEntry {
    /// Event identifier.
    pub event_id: String,
    /// Acting user.
    pub actor_user_id: UserId,
    /// Institution the actor was bound to.
    pub institution_id: Option<InstitutionId>,
    /// Stable action identifier.
    pub action: String,
    /// Resource kind.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Structured detail payload.
    pub detail: Option<Value>,
    /// Event timestamp in RFC3339.
    pub created_at: String,
}

/// Filter for audit listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Restrict to one institution.
    pub institution_id: Option<InstitutionId>,
    /// Maximum rows returned, newest first.
    pub limit: usize,
}

/// Audit trail storage.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends a single audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;

    /// Lists recent events.
    async fn list_events(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>>;
}
