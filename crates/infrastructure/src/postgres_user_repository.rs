//! PostgreSQL-backed user and login repository.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use tenura_application::{
    LoginAccount, LoginRepository, RoleMenuEntry, UserMembership, UserRecord, UserRepository,
};
use tenura_core::{AppError, AppResult, InstitutionId, RoleId, UserId};
use tenura_domain::{MethodAccess, UserAccount};

use crate::postgres_rows::{MenuRow, UserRow, map_write_error, read_error, role_uuids};

mod account;
mod login;
mod lookup;

/// PostgreSQL implementation of the user and login ports.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    user_id: Uuid,
    institution_id: Uuid,
    institution_name: String,
    role_ids: Vec<Uuid>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn list_users(&self, institution_id: Option<InstitutionId>) -> AppResult<Vec<UserRecord>> {
        self.list_users_impl(institution_id).await
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        self.find_user_impl(user_id).await
    }

    async fn create_user(
        &self,
        account: &UserAccount,
        password_hash: &str,
        institution_id: InstitutionId,
        role_ids: &[RoleId],
    ) -> AppResult<()> {
        self.create_user_impl(account, password_hash, institution_id, role_ids)
            .await
    }

    async fn update_user(
        &self,
        account: &UserAccount,
        password_hash: Option<&str>,
        roles: Option<(InstitutionId, &[RoleId])>,
    ) -> AppResult<()> {
        self.update_user_impl(account, password_hash, roles).await
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.delete_user_impl(user_id).await
    }
}

#[async_trait]
impl LoginRepository for PostgresUserRepository {
    async fn find_login_account(
        &self,
        username: &str,
        institution_id: InstitutionId,
    ) -> AppResult<Option<LoginAccount>> {
        self.find_login_account_impl(username, institution_id).await
    }

    async fn list_menus_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<RoleMenuEntry>> {
        self.list_menus_for_roles_impl(role_ids).await
    }
}
