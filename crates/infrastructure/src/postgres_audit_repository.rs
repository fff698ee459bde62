use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use tenura_application::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditRepository};
use tenura_core::{AppError, AppResult, InstitutionId, UserId};

use crate::postgres_rows::read_error;

/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditEventRow {
    event_id: Uuid,
    actor_user_id: Uuid,
    institution_id: Option<Uuid>,
    action: String,
    resource_type: String,
    resource_id: String,
    detail: Option<String>,
    created_at: String,
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let detail = event
            .detail
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|error| {
                AppError::Internal(format!("failed to encode audit detail: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO audit_events (
                id,
                actor_user_id,
                institution_id,
                action,
                resource_type,
                resource_id,
                detail
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.actor_user_id.as_uuid())
        .bind(event.institution_id.map(|id| id.as_uuid()))
        .bind(event.action.as_str())
        .bind(event.resource_type)
        .bind(event.resource_id)
        .bind(detail)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit event: {error}")))?;

        Ok(())
    }

    async fn list_events(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let rows = sqlx::query_as::<_, AuditEventRow>(
            r#"
            SELECT
                id AS event_id,
                actor_user_id,
                institution_id,
                action,
                resource_type,
                resource_id,
                detail,
                to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
            FROM audit_events
            WHERE $1::UUID IS NULL OR institution_id = $1
            ORDER BY audit_events.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(query.institution_id.map(|id| id.as_uuid()))
        .bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("list audit events"))?;

        Ok(rows
            .into_iter()
            .map(|row| AuditLogEntry {
                event_id: row.event_id.to_string(),
                actor_user_id: UserId::from_uuid(row.actor_user_id),
                institution_id: row.institution_id.map(InstitutionId::from_uuid),
                action: row.action,
                resource_type: row.resource_type,
                resource_id: row.resource_id,
                detail: row
                    .detail
                    .and_then(|detail| serde_json::from_str(&detail).ok()),
                created_at: row.created_at,
            })
            .collect())
    }
}
