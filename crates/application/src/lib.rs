//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod audit_ports;
mod auth_service;
mod authorization_gate;
mod feature_service;
mod institution_service;
mod menu_service;
mod permission_cache;
mod scope_resolver;
mod security_admin_ports;
mod security_admin_service;
mod token_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use access_ports::{AccessCache, AuthorizationRepository, RoleMenuAccess, RolePermissionName};
pub use audit_ports::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditRepository};
pub use auth_service::{
    AuthService, LoginAccount, LoginRepository, LoginSession, MenuMappingEntry, PasswordHasher,
    RoleMenuEntry,
};
pub use authorization_gate::{AccessRequirement, AuthorizationGate};
pub use feature_service::{EffectiveFeature, FeatureRepository, FeatureService, SaveFeatureInput};
pub use institution_service::{InstitutionRepository, InstitutionService, SaveInstitutionInput};
pub use menu_service::{MenuRepository, MenuService, SaveMenuInput};
pub use permission_cache::{PermissionCache, ResolvedAccess};
pub use scope_resolver::{CallerScope, ScopeResolver};
pub use security_admin_ports::{
    CreatePermissionInput, CreateRoleInput, RoleMenuMapping, SecurityAdminRepository,
    UpdateRoleInput,
};
pub use security_admin_service::SecurityAdminService;
pub use token_service::{IssuedToken, SessionClaims, TokenCodec, TokenService};
pub use user_service::{
    CreateUserInput, UpdateUserInput, UserMembership, UserRecord, UserRepository, UserService,
};
