use tenura_application::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditRepository};

use super::*;

#[async_trait]
impl AuditRepository for InMemoryAdminRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let mut state = self.state.write().await;
        let event_id = state.audit_events.len() + 1;
        state.audit_events.push(AuditLogEntry {
            event_id: event_id.to_string(),
            actor_user_id: event.actor_user_id,
            institution_id: event.institution_id,
            action: event.action.as_str().to_owned(),
            resource_type: event.resource_type,
            resource_id: event.resource_id,
            detail: event.detail,
            created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        });
        Ok(())
    }

    async fn list_events(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .state
            .read()
            .await
            .audit_events
            .iter()
            .rev()
            .filter(|entry| {
                query
                    .institution_id
                    .is_none_or(|institution_id| entry.institution_id == Some(institution_id))
            })
            .take(query.limit)
            .cloned()
            .collect())
    }
}
