//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_access_cache;
mod in_memory_admin_repository;
mod jwt_token_codec;
mod postgres_audit_repository;
mod postgres_authorization_repository;
mod postgres_feature_repository;
mod postgres_institution_repository;
mod postgres_menu_repository;
mod postgres_rows;
mod postgres_security_admin_repository;
mod postgres_user_repository;
mod redis_access_cache;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_access_cache::InMemoryAccessCache;
pub use in_memory_admin_repository::InMemoryAdminRepository;
pub use jwt_token_codec::JwtTokenCodec;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_feature_repository::PostgresFeatureRepository;
pub use postgres_institution_repository::PostgresInstitutionRepository;
pub use postgres_menu_repository::PostgresMenuRepository;
pub use postgres_security_admin_repository::PostgresSecurityAdminRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use redis_access_cache::RedisAccessCache;
