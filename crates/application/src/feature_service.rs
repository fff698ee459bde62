use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use tenura_core::{AppError, AppResult, FeatureId, InstitutionId, UserIdentity};
use tenura_domain::{FeatureDefinition, InstitutionFeature};

use crate::ScopeResolver;

#[cfg(test)]
mod tests;

/// Input payload for creating or updating a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFeatureInput {
    /// Unique key, fixed after creation.
    pub feature_key: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Free-form type.
    pub feature_type: String,
    /// State when no override exists.
    pub default_enabled: bool,
}

/// Feature state as seen by one institution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveFeature {
    /// Feature definition.
    pub feature: FeatureDefinition,
    /// Effective state.
    pub is_enabled: bool,
    /// Whether the state comes from an institution override.
    pub overridden: bool,
}

/// Repository port for features.
#[async_trait]
pub trait FeatureRepository: Send + Sync {
    /// Lists features.
    async fn list_features(&self) -> AppResult<Vec<FeatureDefinition>>;

    /// Finds a feature by id.
    async fn find_feature(&self, feature_id: FeatureId) -> AppResult<Option<FeatureDefinition>>;

    /// Finds a feature by key.
    async fn find_feature_by_key(&self, feature_key: &str) -> AppResult<Option<FeatureDefinition>>;

    /// Inserts a feature. Duplicate keys are a conflict.
    async fn create_feature(&self, feature: &FeatureDefinition) -> AppResult<()>;

    /// Updates a feature.
    async fn update_feature(&self, feature: &FeatureDefinition) -> AppResult<()>;

    /// Lists overrides of an institution.
    async fn list_institution_features(
        &self,
        institution_id: InstitutionId,
    ) -> AppResult<Vec<InstitutionFeature>>;

    /// Inserts or replaces an override on (institution, feature key).
    async fn upsert_institution_feature(&self, feature: &InstitutionFeature) -> AppResult<()>;
}

/// Feature flag administration.
#[derive(Clone)]
pub struct FeatureService {
    repository: Arc<dyn FeatureRepository>,
    scope_resolver: ScopeResolver,
}

impl FeatureService {
    /// Creates a feature service.
    #[must_use]
    pub fn new(repository: Arc<dyn FeatureRepository>, scope_resolver: ScopeResolver) -> Self {
        Self {
            repository,
            scope_resolver,
        }
    }

    /// Lists feature definitions.
    pub async fn list_features(&self) -> AppResult<Vec<FeatureDefinition>> {
        self.repository.list_features().await
    }

    /// Creates a feature. Requires system scope.
    pub async fn create_feature(
        &self,
        actor: &UserIdentity,
        input: SaveFeatureInput,
    ) -> AppResult<FeatureDefinition> {
        self.scope_resolver
            .resolve(actor)
            .await
            .require_system("creating features")?;

        let feature = FeatureDefinition::new(
            FeatureId::new(),
            input.feature_key,
            input.name,
            input.description,
            input.feature_type,
            input.default_enabled,
        )?;
        self.repository.create_feature(&feature).await?;
        Ok(feature)
    }

    /// Updates a feature. The key cannot change.
    pub async fn update_feature(
        &self,
        actor: &UserIdentity,
        feature_id: FeatureId,
        input: SaveFeatureInput,
    ) -> AppResult<FeatureDefinition> {
        self.scope_resolver
            .resolve(actor)
            .await
            .require_system("updating features")?;

        let existing = self
            .repository
            .find_feature(feature_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("feature '{feature_id}' does not exist")))?;
        if existing.feature_key() != input.feature_key.trim() {
            return Err(AppError::Validation(
                "feature_key cannot be changed".to_owned(),
            ));
        }

        let feature = FeatureDefinition::new(
            feature_id,
            input.feature_key,
            input.name,
            input.description,
            input.feature_type,
            input.default_enabled,
        )?;
        self.repository.update_feature(&feature).await?;
        Ok(feature)
    }

    /// Lists every feature with its effective state for an institution.
    pub async fn list_institution_features(
        &self,
        actor: &UserIdentity,
        institution_id: InstitutionId,
    ) -> AppResult<Vec<EffectiveFeature>> {
        self.scope_resolver
            .resolve(actor)
            .await
            .ensure_institution(institution_id)?;

        let overrides: HashMap<String, bool> = self
            .repository
            .list_institution_features(institution_id)
            .await?
            .into_iter()
            .map(|entry| (entry.feature_key, entry.is_enabled))
            .collect();

        Ok(self
            .repository
            .list_features()
            .await?
            .into_iter()
            .map(|feature| {
                let override_state = overrides.get(feature.feature_key()).copied();
                EffectiveFeature {
                    is_enabled: override_state.unwrap_or(feature.default_enabled()),
                    overridden: override_state.is_some(),
                    feature,
                }
            })
            .collect())
    }

    /// Sets an institution's override of a feature.
    pub async fn set_institution_feature(
        &self,
        actor: &UserIdentity,
        institution_id: InstitutionId,
        feature_key: &str,
        is_enabled: bool,
    ) -> AppResult<InstitutionFeature> {
        self.scope_resolver
            .resolve(actor)
            .await
            .ensure_institution(institution_id)?;

        let feature = self
            .repository
            .find_feature_by_key(feature_key.trim())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("feature '{feature_key}' does not exist")))?;

        let entry = InstitutionFeature {
            institution_id,
            feature_key: feature.feature_key().to_owned(),
            is_enabled,
        };
        self.repository.upsert_institution_feature(&entry).await?;
        Ok(entry)
    }
}
