use std::sync::Arc;

use tenura_core::{AppError, AppResult, InstitutionId, UserIdentity};
use tracing::warn;

use crate::AuthorizationRepository;


/// Row visibility of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerScope {
    /// Rows of every institution.
    System,
    /// Rows of the bound institution only; nothing when unbound.
    Institution(Option<InstitutionId>),
}

impl CallerScope {
    /// Returns whether the caller sees every institution.
    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }

    /// Institution filter for list queries, `None` meaning unfiltered.
    pub fn list_filter(&self) -> AppResult<Option<InstitutionId>> {
        match self {
            Self::System => Ok(None),
            Self::Institution(Some(institution_id)) => Ok(Some(*institution_id)),
            Self::Institution(None) => Err(AppError::Forbidden(
                "caller has no institution binding".to_owned(),
            )),
        }
    }

    /// Rejects rows that belong to none of the caller's visible institutions.
    pub fn ensure_row_visible(&self, row_institution_ids: &[InstitutionId]) -> AppResult<()> {
        match self {
            Self::System => Ok(()),
            Self::Institution(Some(institution_id))
                if row_institution_ids.contains(institution_id) =>
            {
                Ok(())
            }
            Self::Institution(_) => Err(AppError::Forbidden(
                "row belongs to another institution".to_owned(),
            )),
        }
    }

    /// Rejects a single institution outside the caller's scope.
    pub fn ensure_institution(&self, institution_id: InstitutionId) -> AppResult<()> {
        self.ensure_row_visible(&[institution_id])
    }

    /// Rejects callers without system visibility.
    pub fn require_system(&self, operation: &str) -> AppResult<()> {
        if self.is_system() {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "{operation} requires system scope"
        )))
    }
}

/// Determines caller visibility from the role set.
#[derive(Clone)]
pub struct ScopeResolver {
    repository: Arc<dyn AuthorizationRepository>,
}

impl ScopeResolver {
    /// Creates a scope resolver.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self { repository }
    }

    /// Resolves the caller's visibility.
    ///
    /// The first active system role short-circuits. Roles that are missing,
    /// inactive or fail to load are skipped, so failures only ever narrow.
    pub async fn resolve(&self, actor: &UserIdentity) -> CallerScope {
        for role_id in actor.role_ids() {
            match self.repository.find_role(*role_id).await {
                Ok(Some(role)) if role.grants_system_scope() => return CallerScope::System,
                Ok(Some(_)) => {}
                Ok(None) => {
                    warn!(%role_id, user_id = %actor.user_id(), "skipping unknown role during scope resolution");
                }
                Err(error) => {
                    warn!(%role_id, %error, "skipping role that failed to load during scope resolution");
                }
            }
        }

        CallerScope::Institution(actor.institution_id())
    }
}
