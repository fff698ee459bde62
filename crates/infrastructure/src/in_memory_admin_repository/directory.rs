use tenura_application::{InstitutionRepository, UserMembership, UserRecord, UserRepository};

use super::*;

impl AdminState {
    fn user_record(&self, user: &StoredUser, institution_id: Option<InstitutionId>) -> UserRecord {
        UserRecord {
            account: user.account.clone(),
            memberships: user
                .memberships
                .iter()
                .filter(|(member_of, _)| institution_id.is_none_or(|id| **member_of == id))
                .map(|(member_of, role_ids)| UserMembership {
                    institution_id: *member_of,
                    institution_name: self
                        .institutions
                        .get(member_of)
                        .map(|institution| institution.name().to_owned())
                        .unwrap_or_default(),
                    role_ids: role_ids.clone(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryAdminRepository {
    async fn list_users(&self, institution_id: Option<InstitutionId>) -> AppResult<Vec<UserRecord>> {
        let state = self.state.read().await;
        let mut users: Vec<UserRecord> = state
            .users
            .values()
            .filter(|user| institution_id.is_none_or(|id| user.memberships.contains_key(&id)))
            .map(|user| state.user_record(user, institution_id))
            .collect();
        users.sort_by(|left, right| left.account.username().cmp(right.account.username()));
        Ok(users)
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&user_id)
            .map(|user| state.user_record(user, None)))
    }

    async fn create_user(
        &self,
        account: &UserAccount,
        password_hash: &str,
        institution_id: InstitutionId,
        role_ids: &[RoleId],
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|user| user.account.username() == account.username())
        {
            return Err(AppError::Conflict(format!(
                "username '{}' is taken",
                account.username()
            )));
        }
        if !state.institutions.contains_key(&institution_id) {
            return Err(not_found("institution", institution_id));
        }

        state.users.insert(
            account.id(),
            StoredUser {
                account: account.clone(),
                password_hash: password_hash.to_owned(),
                memberships: BTreeMap::from([(institution_id, role_ids.to_vec())]),
            },
        );
        Ok(())
    }

    async fn update_user(
        &self,
        account: &UserAccount,
        password_hash: Option<&str>,
        roles: Option<(InstitutionId, &[RoleId])>,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&account.id()) else {
            return Err(not_found("user", account.id()));
        };

        user.account = account.clone();
        if let Some(password_hash) = password_hash {
            password_hash.clone_into(&mut user.password_hash);
        }
        if let Some((institution_id, role_ids)) = roles {
            user.memberships.insert(institution_id, role_ids.to_vec());
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.state.write().await.users.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl InstitutionRepository for InMemoryAdminRepository {
    async fn list_institutions(
        &self,
        institution_id: Option<InstitutionId>,
    ) -> AppResult<Vec<Institution>> {
        let state = self.state.read().await;
        let mut institutions: Vec<Institution> = state
            .institutions
            .values()
            .filter(|institution| institution_id.is_none_or(|id| institution.id() == id))
            .cloned()
            .collect();
        institutions.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(institutions)
    }

    async fn find_institution(
        &self,
        institution_id: InstitutionId,
    ) -> AppResult<Option<Institution>> {
        Ok(self
            .state
            .read()
            .await
            .institutions
            .get(&institution_id)
            .cloned())
    }

    async fn create_institution(&self, institution: &Institution) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .institutions
            .values()
            .any(|existing| existing.code() == institution.code())
        {
            return Err(AppError::Conflict(format!(
                "institution code '{}' is taken",
                institution.code()
            )));
        }
        state
            .institutions
            .insert(institution.id(), institution.clone());
        Ok(())
    }

    async fn update_institution(&self, institution: &Institution) -> AppResult<()> {
        let mut state = self.state.write().await;
        let Some(existing) = state.institutions.get_mut(&institution.id()) else {
            return Err(not_found("institution", institution.id()));
        };
        *existing = institution.clone();
        Ok(())
    }

    async fn delete_institution(&self, institution_id: InstitutionId) -> AppResult<()> {
        let mut state = self.state.write().await;
        let referenced = state
            .users
            .values()
            .any(|user| user.memberships.contains_key(&institution_id))
            || state
                .roles
                .values()
                .any(|role| role.institution_id() == Some(institution_id));
        if referenced {
            return Err(AppError::Conflict(format!(
                "institution '{institution_id}' still has users or roles"
            )));
        }
        state.institutions.remove(&institution_id);
        state
            .institution_features
            .retain(|(member_of, _), _| *member_of != institution_id);
        Ok(())
    }
}
