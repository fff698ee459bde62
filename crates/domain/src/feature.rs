use serde::{Deserialize, Serialize};
use tenura_core::{AppResult, FeatureId, InstitutionId, NonEmptyString};

/// Feature flag definition with its default state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDefinition {
    id: FeatureId,
    feature_key: NonEmptyString,
    name: NonEmptyString,
    description: String,
    feature_type: NonEmptyString,
    default_enabled: bool,
}

impl FeatureDefinition {
    /// Creates a feature definition.
    pub fn new(
        id: FeatureId,
        feature_key: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        feature_type: impl Into<String>,
        default_enabled: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            feature_key: NonEmptyString::for_field("feature_key", feature_key)?,
            name: NonEmptyString::for_field("name", name)?,
            description: description.into().trim().to_owned(),
            feature_type: NonEmptyString::for_field("feature_type", feature_type)?,
            default_enabled,
        })
    }

    /// Returns the feature id.
    #[must_use]
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Returns the unique feature key.
    #[must_use]
    pub fn feature_key(&self) -> &str {
        self.feature_key.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the free-form feature type.
    #[must_use]
    pub fn feature_type(&self) -> &str {
        self.feature_type.as_str()
    }

    /// Returns whether the feature is on when an institution has no override.
    #[must_use]
    pub fn default_enabled(&self) -> bool {
        self.default_enabled
    }
}

/// Per-institution override of a feature flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionFeature {
    /// Institution the override applies to.
    pub institution_id: InstitutionId,
    /// Overridden feature.
    pub feature_key: String,
    /// Effective state.
    pub is_enabled: bool,
}
