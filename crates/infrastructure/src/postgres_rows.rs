//! Row shapes shared by the Postgres repositories.

use std::str::FromStr;

use sqlx::FromRow;
use uuid::Uuid;

use tenura_core::{
    AppError, AppResult, FeatureId, InstitutionId, MenuId, PermissionId, RoleId, UserId,
};
use tenura_domain::{
    FeatureDefinition, Institution, MenuDefinition, PermissionDefinition, Role, RoleScope,
    UserAccount,
};

/// Maps unique violations to `Conflict` and everything else to `Internal`.
pub(crate) fn map_write_error(error: sqlx::Error, operation: &str, conflict: String) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(conflict);
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

/// Maps a read failure to `Internal`.
pub(crate) fn read_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |error| AppError::Internal(format!("failed to {operation}: {error}"))
}

fn decode_error(kind: &'static str, id: Uuid) -> impl FnOnce(AppError) -> AppError {
    move |error| AppError::Internal(format!("stored {kind} '{id}' is invalid: {error}"))
}

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub scope: String,
    pub institution_id: Option<Uuid>,
    pub is_active: bool,
    pub is_administrator: bool,
}

impl RoleRow {
    pub(crate) fn into_role(self) -> AppResult<Role> {
        let id = self.id;
        let scope = RoleScope::from_str(&self.scope).map_err(decode_error("role", id))?;
        Role::new(
            RoleId::from_uuid(id),
            self.name,
            self.description,
            scope,
            self.institution_id.map(InstitutionId::from_uuid),
            self.is_active,
            self.is_administrator,
        )
        .map_err(decode_error("role", id))
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PermissionRow {
    pub id: Uuid,
    pub name: String,
    pub service: String,
    pub resource: String,
    pub action: String,
    pub is_active: bool,
    pub is_high_risk: bool,
    pub description: String,
}

impl PermissionRow {
    pub(crate) fn into_permission(self) -> AppResult<PermissionDefinition> {
        let id = self.id;
        PermissionDefinition::new(
            PermissionId::from_uuid(id),
            self.name,
            self.service,
            self.resource,
            self.action,
            self.is_active,
            self.is_high_risk,
            self.description,
        )
        .map_err(decode_error("permission", id))
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct MenuRow {
    pub id: Uuid,
    pub menu_key: String,
    pub name: String,
    pub route: String,
    pub icon: String,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
    pub feature_key: Option<String>,
    pub is_active: bool,
}

impl MenuRow {
    pub(crate) fn into_menu(self) -> AppResult<MenuDefinition> {
        let id = self.id;
        MenuDefinition::new(
            MenuId::from_uuid(id),
            self.menu_key,
            self.name,
            self.route,
            self.icon,
            self.parent_id.map(MenuId::from_uuid),
            self.sort_order,
            self.feature_key,
            self.is_active,
        )
        .map_err(decode_error("menu", id))
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct InstitutionRow {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub is_active: bool,
}

impl InstitutionRow {
    pub(crate) fn into_institution(self) -> AppResult<Institution> {
        let id = self.id;
        Institution::new(
            InstitutionId::from_uuid(id),
            self.name,
            self.code,
            self.address,
            self.phone_number,
            self.email,
            self.is_active,
        )
        .map_err(decode_error("institution", id))
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct FeatureRow {
    pub id: Uuid,
    pub feature_key: String,
    pub name: String,
    pub description: String,
    pub feature_type: String,
    pub default_enabled: bool,
}

impl FeatureRow {
    pub(crate) fn into_feature(self) -> AppResult<FeatureDefinition> {
        let id = self.id;
        FeatureDefinition::new(
            FeatureId::from_uuid(id),
            self.feature_key,
            self.name,
            self.description,
            self.feature_type,
            self.default_enabled,
        )
        .map_err(decode_error("feature", id))
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub short_name: String,
    pub is_active: bool,
}

impl UserRow {
    pub(crate) fn into_account(self) -> AppResult<UserAccount> {
        let id = self.id;
        UserAccount::new(
            UserId::from_uuid(id),
            self.username,
            self.email,
            self.full_name,
            self.short_name,
            self.is_active,
        )
        .map_err(decode_error("user", id))
    }
}

pub(crate) fn role_uuids(role_ids: &[RoleId]) -> Vec<Uuid> {
    role_ids.iter().map(RoleId::as_uuid).collect()
}
