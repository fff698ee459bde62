use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use tenura_application::FeatureRepository;
use tenura_core::{AppResult, FeatureId, InstitutionId};
use tenura_domain::{FeatureDefinition, InstitutionFeature};

use crate::postgres_rows::{FeatureRow, map_write_error, read_error};

/// PostgreSQL-backed repository for feature flags and institution
/// overrides.
#[derive(Clone)]
pub struct PostgresFeatureRepository {
    pool: PgPool,
}

impl PostgresFeatureRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct InstitutionFeatureRow {
    institution_id: Uuid,
    feature_key: String,
    is_enabled: bool,
}

#[async_trait]
impl FeatureRepository for PostgresFeatureRepository {
    async fn list_features(&self) -> AppResult<Vec<FeatureDefinition>> {
        let rows = sqlx::query_as::<_, FeatureRow>(
            r#"
            SELECT id, feature_key, name, description, feature_type, default_enabled
            FROM features
            ORDER BY feature_key
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("list features"))?;

        rows.into_iter().map(FeatureRow::into_feature).collect()
    }

    async fn find_feature(&self, feature_id: FeatureId) -> AppResult<Option<FeatureDefinition>> {
        sqlx::query_as::<_, FeatureRow>(
            r#"
            SELECT id, feature_key, name, description, feature_type, default_enabled
            FROM features
            WHERE id = $1
            "#,
        )
        .bind(feature_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error("find feature"))?
        .map(FeatureRow::into_feature)
        .transpose()
    }

    async fn find_feature_by_key(&self, feature_key: &str) -> AppResult<Option<FeatureDefinition>> {
        sqlx::query_as::<_, FeatureRow>(
            r#"
            SELECT id, feature_key, name, description, feature_type, default_enabled
            FROM features
            WHERE feature_key = $1
            "#,
        )
        .bind(feature_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error("find feature"))?
        .map(FeatureRow::into_feature)
        .transpose()
    }

    async fn create_feature(&self, feature: &FeatureDefinition) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO features (id, feature_key, name, description, feature_type, default_enabled)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(feature.id().as_uuid())
        .bind(feature.feature_key())
        .bind(feature.name())
        .bind(feature.description())
        .bind(feature.feature_type())
        .bind(feature.default_enabled())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "create feature",
                format!("feature '{}' already exists", feature.feature_key()),
            )
        })?;

        Ok(())
    }

    async fn update_feature(&self, feature: &FeatureDefinition) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE features
            SET name = $2,
                description = $3,
                feature_type = $4,
                default_enabled = $5,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(feature.id().as_uuid())
        .bind(feature.name())
        .bind(feature.description())
        .bind(feature.feature_type())
        .bind(feature.default_enabled())
        .execute(&self.pool)
        .await
        .map_err(read_error("update feature"))?;

        Ok(())
    }

    async fn list_institution_features(
        &self,
        institution_id: InstitutionId,
    ) -> AppResult<Vec<InstitutionFeature>> {
        let rows = sqlx::query_as::<_, InstitutionFeatureRow>(
            r#"
            SELECT institution_id, feature_key, is_enabled
            FROM institution_features
            WHERE institution_id = $1
            "#,
        )
        .bind(institution_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("list institution features"))?;

        Ok(rows
            .into_iter()
            .map(|row| InstitutionFeature {
                institution_id: InstitutionId::from_uuid(row.institution_id),
                feature_key: row.feature_key,
                is_enabled: row.is_enabled,
            })
            .collect())
    }

    async fn upsert_institution_feature(&self, feature: &InstitutionFeature) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO institution_features (institution_id, feature_key, is_enabled)
            VALUES ($1, $2, $3)
            ON CONFLICT (institution_id, feature_key)
            DO UPDATE SET is_enabled = EXCLUDED.is_enabled, updated_at = now()
            "#,
        )
        .bind(feature.institution_id.as_uuid())
        .bind(feature.feature_key.as_str())
        .bind(feature.is_enabled)
        .execute(&self.pool)
        .await
        .map_err(read_error("upsert institution feature"))?;

        Ok(())
    }
}
