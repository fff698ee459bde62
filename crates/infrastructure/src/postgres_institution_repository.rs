use async_trait::async_trait;
use sqlx::PgPool;

use tenura_application::InstitutionRepository;
use tenura_core::{AppError, AppResult, InstitutionId};
use tenura_domain::Institution;

use crate::postgres_rows::{InstitutionRow, map_write_error, read_error};

/// PostgreSQL-backed repository for institutions.
#[derive(Clone)]
pub struct PostgresInstitutionRepository {
    pool: PgPool,
}

impl PostgresInstitutionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstitutionRepository for PostgresInstitutionRepository {
    async fn list_institutions(
        &self,
        institution_id: Option<InstitutionId>,
    ) -> AppResult<Vec<Institution>> {
        let rows = sqlx::query_as::<_, InstitutionRow>(
            r#"
            SELECT id, name, code, address, phone_number, email, is_active
            FROM institutions
            WHERE $1::UUID IS NULL OR id = $1
            ORDER BY name
            "#,
        )
        .bind(institution_id.map(|id| id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("list institutions"))?;

        rows.into_iter().map(InstitutionRow::into_institution).collect()
    }

    async fn find_institution(
        &self,
        institution_id: InstitutionId,
    ) -> AppResult<Option<Institution>> {
        sqlx::query_as::<_, InstitutionRow>(
            r#"
            SELECT id, name, code, address, phone_number, email, is_active
            FROM institutions
            WHERE id = $1
            "#,
        )
        .bind(institution_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error("find institution"))?
        .map(InstitutionRow::into_institution)
        .transpose()
    }

    async fn create_institution(&self, institution: &Institution) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO institutions (id, name, code, address, phone_number, email, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(institution.id().as_uuid())
        .bind(institution.name())
        .bind(institution.code())
        .bind(institution.address())
        .bind(institution.phone_number())
        .bind(institution.email())
        .bind(institution.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "create institution",
                format!("institution code '{}' is taken", institution.code()),
            )
        })?;

        Ok(())
    }

    async fn update_institution(&self, institution: &Institution) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE institutions
            SET name = $2,
                code = $3,
                address = $4,
                phone_number = $5,
                email = $6,
                is_active = $7,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(institution.id().as_uuid())
        .bind(institution.name())
        .bind(institution.code())
        .bind(institution.address())
        .bind(institution.phone_number())
        .bind(institution.email())
        .bind(institution.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "update institution",
                format!("institution code '{}' is taken", institution.code()),
            )
        })?;

        Ok(())
    }

    async fn delete_institution(&self, institution_id: InstitutionId) -> AppResult<()> {
        sqlx::query("DELETE FROM institutions WHERE id = $1")
            .bind(institution_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                if let sqlx::Error::Database(database_error) = &error
                    && database_error.code().as_deref() == Some("23503")
                {
                    return AppError::Conflict(format!(
                        "institution '{institution_id}' still has users or roles"
                    ));
                }
                AppError::Internal(format!("failed to delete institution: {error}"))
            })?;

        Ok(())
    }
}
