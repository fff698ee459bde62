//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod feature;
mod institution;
mod menu;
mod permission;
mod security;
mod user;

pub use access::{AccessMap, MethodAccess};
pub use feature::{FeatureDefinition, InstitutionFeature};
pub use institution::Institution;
pub use menu::{MenuDefinition, RoleMenuGrant};
pub use permission::{PermissionDefinition, PermissionMutableUpdate};
pub use security::{AuditAction, Role, RoleScope, RoutePermission};
pub use user::{EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserAccount, validate_password};
