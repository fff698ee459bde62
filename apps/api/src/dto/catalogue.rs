use serde::{Deserialize, Serialize};
use tenura_application::{EffectiveFeature, SaveFeatureInput, SaveInstitutionInput, SaveMenuInput};
use tenura_core::{FeatureId, InstitutionId, MenuId};
use tenura_domain::{FeatureDefinition, Institution, InstitutionFeature, MenuDefinition};

/// Incoming payload for menu creation and replacement.
#[derive(Debug, Deserialize)]
pub struct SaveMenuRequest {
    pub menu_key: String,
    pub name: String,
    pub route: String,
    #[serde(default)]
    pub icon: String,
    pub parent_id: Option<MenuId>,
    #[serde(default)]
    pub sort_order: i32,
    pub feature_key: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

/// API representation of a menu.
#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub menu_id: MenuId,
    pub menu_key: String,
    pub name: String,
    pub route: String,
    pub icon: String,
    pub parent_id: Option<MenuId>,
    pub sort_order: i32,
    pub feature_key: Option<String>,
    pub is_active: bool,
}

/// Incoming payload for institution creation and replacement.
#[derive(Debug, Deserialize)]
pub struct SaveInstitutionRequest {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    pub email: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

/// API representation of an institution.
#[derive(Debug, Serialize)]
pub struct InstitutionResponse {
    pub institution_id: InstitutionId,
    pub name: String,
    pub code: String,
    pub address: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub is_active: bool,
}

/// Incoming payload for feature creation and replacement.
#[derive(Debug, Deserialize)]
pub struct SaveFeatureRequest {
    pub feature_key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub feature_type: String,
    #[serde(default)]
    pub default_enabled: bool,
}

/// API representation of a feature.
#[derive(Debug, Serialize)]
pub struct FeatureResponse {
    pub feature_id: FeatureId,
    pub feature_key: String,
    pub name: String,
    pub description: String,
    pub feature_type: String,
    pub default_enabled: bool,
}

/// Feature with its state for one institution.
#[derive(Debug, Serialize)]
pub struct EffectiveFeatureResponse {
    #[serde(flatten)]
    pub feature: FeatureResponse,
    pub is_enabled: bool,
    pub overridden: bool,
}

/// Incoming payload for an institution feature override.
#[derive(Debug, Deserialize)]
pub struct SetInstitutionFeatureRequest {
    pub feature_key: String,
    pub is_enabled: bool,
}

/// API representation of an institution feature override.
#[derive(Debug, Serialize)]
pub struct InstitutionFeatureResponse {
    pub institution_id: InstitutionId,
    pub feature_key: String,
    pub is_enabled: bool,
}

fn active_by_default() -> bool {
    true
}

impl From<SaveMenuRequest> for SaveMenuInput {
    fn from(request: SaveMenuRequest) -> Self {
        Self {
            menu_key: request.menu_key,
            name: request.name,
            route: request.route,
            icon: request.icon,
            parent_id: request.parent_id,
            sort_order: request.sort_order,
            feature_key: request.feature_key,
            is_active: request.is_active,
        }
    }
}

impl From<MenuDefinition> for MenuResponse {
    fn from(menu: MenuDefinition) -> Self {
        Self {
            menu_id: menu.id(),
            menu_key: menu.menu_key().to_owned(),
            name: menu.name().to_owned(),
            route: menu.route().to_owned(),
            icon: menu.icon().to_owned(),
            parent_id: menu.parent_id(),
            sort_order: menu.sort_order(),
            feature_key: menu.feature_key().map(str::to_owned),
            is_active: menu.is_active(),
        }
    }
}

impl From<SaveInstitutionRequest> for SaveInstitutionInput {
    fn from(request: SaveInstitutionRequest) -> Self {
        Self {
            name: request.name,
            code: request.code,
            address: request.address,
            phone_number: request.phone_number,
            email: request.email,
            is_active: request.is_active,
        }
    }
}

impl From<Institution> for InstitutionResponse {
    fn from(institution: Institution) -> Self {
        Self {
            institution_id: institution.id(),
            name: institution.name().to_owned(),
            code: institution.code().to_owned(),
            address: institution.address().to_owned(),
            phone_number: institution.phone_number().to_owned(),
            email: institution.email().map(str::to_owned),
            is_active: institution.is_active(),
        }
    }
}

impl From<SaveFeatureRequest> for SaveFeatureInput {
    fn from(request: SaveFeatureRequest) -> Self {
        Self {
            feature_key: request.feature_key,
            name: request.name,
            description: request.description,
            feature_type: request.feature_type,
            default_enabled: request.default_enabled,
        }
    }
}

impl From<FeatureDefinition> for FeatureResponse {
    fn from(feature: FeatureDefinition) -> Self {
        Self {
            feature_id: feature.id(),
            feature_key: feature.feature_key().to_owned(),
            name: feature.name().to_owned(),
            description: feature.description().to_owned(),
            feature_type: feature.feature_type().to_owned(),
            default_enabled: feature.default_enabled(),
        }
    }
}

impl From<EffectiveFeature> for EffectiveFeatureResponse {
    fn from(effective: EffectiveFeature) -> Self {
        Self {
            feature: FeatureResponse::from(effective.feature),
            is_enabled: effective.is_enabled,
            overridden: effective.overridden,
        }
    }
}

impl From<InstitutionFeature> for InstitutionFeatureResponse {
    fn from(feature: InstitutionFeature) -> Self {
        Self {
            institution_id: feature.institution_id,
            feature_key: feature.feature_key,
            is_enabled: feature.is_enabled,
        }
    }
}
