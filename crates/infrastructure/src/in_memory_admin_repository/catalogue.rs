use tenura_application::{FeatureRepository, MenuRepository};
use tenura_domain::InstitutionFeature;

use super::*;

#[async_trait]
impl MenuRepository for InMemoryAdminRepository {
    async fn list_menus(&self) -> AppResult<Vec<MenuDefinition>> {
        let state = self.state.read().await;
        let mut menus: Vec<MenuDefinition> = state.menus.values().cloned().collect();
        menus.sort_by(|left, right| {
            left.sort_order()
                .cmp(&right.sort_order())
                .then_with(|| left.name().cmp(right.name()))
        });
        Ok(menus)
    }

    async fn find_menu(&self, menu_id: MenuId) -> AppResult<Option<MenuDefinition>> {
        Ok(self.state.read().await.menus.get(&menu_id).cloned())
    }

    async fn create_menu(&self, menu: &MenuDefinition) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .menus
            .values()
            .any(|existing| existing.menu_key() == menu.menu_key())
        {
            return Err(AppError::Conflict(format!(
                "menu '{}' already exists",
                menu.menu_key()
            )));
        }
        state.menus.insert(menu.id(), menu.clone());
        Ok(())
    }

    async fn update_menu(&self, menu: &MenuDefinition) -> AppResult<()> {
        let mut state = self.state.write().await;
        let Some(existing) = state.menus.get_mut(&menu.id()) else {
            return Err(not_found("menu", menu.id()));
        };
        *existing = menu.clone();
        Ok(())
    }

    async fn delete_menu(&self, menu_id: MenuId) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.menus.remove(&menu_id);
        for grants in state.role_menus.values_mut() {
            grants.retain(|grant| grant.menu_id != menu_id);
        }
        Ok(())
    }

    async fn list_roles_for_menu(&self, menu_id: MenuId) -> AppResult<Vec<RoleId>> {
        Ok(self
            .state
            .read()
            .await
            .role_menus
            .iter()
            .filter(|(_, grants)| grants.iter().any(|grant| grant.menu_id == menu_id))
            .map(|(role_id, _)| *role_id)
            .collect())
    }
}

#[async_trait]
impl FeatureRepository for InMemoryAdminRepository {
    async fn list_features(&self) -> AppResult<Vec<FeatureDefinition>> {
        let state = self.state.read().await;
        let mut features: Vec<FeatureDefinition> = state.features.values().cloned().collect();
        features.sort_by(|left, right| left.feature_key().cmp(right.feature_key()));
        Ok(features)
    }

    async fn find_feature(&self, feature_id: FeatureId) -> AppResult<Option<FeatureDefinition>> {
        Ok(self.state.read().await.features.get(&feature_id).cloned())
    }

    async fn find_feature_by_key(&self, feature_key: &str) -> AppResult<Option<FeatureDefinition>> {
        Ok(self
            .state
            .read()
            .await
            .features
            .values()
            .find(|feature| feature.feature_key() == feature_key)
            .cloned())
    }

    async fn create_feature(&self, feature: &FeatureDefinition) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .features
            .values()
            .any(|existing| existing.feature_key() == feature.feature_key())
        {
            return Err(AppError::Conflict(format!(
                "feature '{}' already exists",
                feature.feature_key()
            )));
        }
        state.features.insert(feature.id(), feature.clone());
        Ok(())
    }

    async fn update_feature(&self, feature: &FeatureDefinition) -> AppResult<()> {
        let mut state = self.state.write().await;
        let Some(existing) = state.features.get_mut(&feature.id()) else {
            return Err(not_found("feature", feature.id()));
        };
        *existing = feature.clone();
        Ok(())
    }

    async fn list_institution_features(
        &self,
        institution_id: InstitutionId,
    ) -> AppResult<Vec<InstitutionFeature>> {
        Ok(self
            .state
            .read()
            .await
            .institution_features
            .iter()
            .filter(|((member_of, _), _)| *member_of == institution_id)
            .map(|((member_of, feature_key), is_enabled)| InstitutionFeature {
                institution_id: *member_of,
                feature_key: feature_key.clone(),
                is_enabled: *is_enabled,
            })
            .collect())
    }

    async fn upsert_institution_feature(&self, feature: &InstitutionFeature) -> AppResult<()> {
        self.state.write().await.institution_features.insert(
            (feature.institution_id, feature.feature_key.clone()),
            feature.is_enabled,
        );
        Ok(())
    }
}
