use std::sync::Arc;

use async_trait::async_trait;

use tenura_core::{AppError, AppResult, InstitutionId, UserIdentity};
use tenura_domain::Institution;

use crate::ScopeResolver;

#[cfg(test)]
mod tests;

/// Input payload for creating or updating an institution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveInstitutionInput {
    /// Display name.
    pub name: String,
    /// Unique code.
    pub code: String,
    /// Postal address.
    pub address: String,
    /// Phone number.
    pub phone_number: String,
    /// Contact email.
    pub email: Option<String>,
    /// Active flag.
    pub is_active: bool,
}

/// Repository port for institutions.
#[async_trait]
pub trait InstitutionRepository: Send + Sync {
    /// Lists institutions, optionally only one.
    async fn list_institutions(
        &self,
        institution_id: Option<InstitutionId>,
    ) -> AppResult<Vec<Institution>>;

    /// Finds an institution.
    async fn find_institution(&self, institution_id: InstitutionId)
    -> AppResult<Option<Institution>>;

    /// Inserts an institution. Duplicate codes are a conflict.
    async fn create_institution(&self, institution: &Institution) -> AppResult<()>;

    /// Updates an institution.
    async fn update_institution(&self, institution: &Institution) -> AppResult<()>;

    /// Deletes an institution. Institutions still referenced are a conflict.
    async fn delete_institution(&self, institution_id: InstitutionId) -> AppResult<()>;
}

/// Institution administration.
#[derive(Clone)]
pub struct InstitutionService {
    repository: Arc<dyn InstitutionRepository>,
    scope_resolver: ScopeResolver,
}

impl InstitutionService {
    /// Creates an institution service.
    #[must_use]
    pub fn new(repository: Arc<dyn InstitutionRepository>, scope_resolver: ScopeResolver) -> Self {
        Self {
            repository,
            scope_resolver,
        }
    }

    /// Lists institutions visible to the caller.
    pub async fn list_institutions(&self, actor: &UserIdentity) -> AppResult<Vec<Institution>> {
        let scope = self.scope_resolver.resolve(actor).await;
        self.repository.list_institutions(scope.list_filter()?).await
    }

    /// Returns one institution visible to the caller.
    pub async fn get_institution(
        &self,
        actor: &UserIdentity,
        institution_id: InstitutionId,
    ) -> AppResult<Institution> {
        self.scope_resolver
            .resolve(actor)
            .await
            .ensure_institution(institution_id)?;
        self.find_existing(institution_id).await
    }

    /// Creates an institution. Requires system scope.
    pub async fn create_institution(
        &self,
        actor: &UserIdentity,
        input: SaveInstitutionInput,
    ) -> AppResult<Institution> {
        self.scope_resolver
            .resolve(actor)
            .await
            .require_system("creating institutions")?;

        let institution = Institution::new(
            InstitutionId::new(),
            input.name,
            input.code,
            input.address,
            input.phone_number,
            input.email,
            input.is_active,
        )?;
        self.repository.create_institution(&institution).await?;
        Ok(institution)
    }

    /// Updates an institution visible to the caller. Only system callers may
    /// change the active flag.
    pub async fn update_institution(
        &self,
        actor: &UserIdentity,
        institution_id: InstitutionId,
        input: SaveInstitutionInput,
    ) -> AppResult<Institution> {
        let scope = self.scope_resolver.resolve(actor).await;
        scope.ensure_institution(institution_id)?;
        let existing = self.find_existing(institution_id).await?;
        if existing.is_active() != input.is_active {
            scope.require_system("changing institution status")?;
        }

        let institution = Institution::new(
            institution_id,
            input.name,
            input.code,
            input.address,
            input.phone_number,
            input.email,
            input.is_active,
        )?;
        self.repository.update_institution(&institution).await?;
        Ok(institution)
    }

    /// Deletes an institution. Requires system scope.
    pub async fn delete_institution(
        &self,
        actor: &UserIdentity,
        institution_id: InstitutionId,
    ) -> AppResult<()> {
        self.scope_resolver
            .resolve(actor)
            .await
            .require_system("deleting institutions")?;
        self.find_existing(institution_id).await?;
        self.repository.delete_institution(institution_id).await
    }

    async fn find_existing(&self, institution_id: InstitutionId) -> AppResult<Institution> {
        self.repository
            .find_institution(institution_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("institution '{institution_id}' does not exist"))
            })
    }
}
