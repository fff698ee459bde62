use serde::{Deserialize, Serialize};
use tenura_application::{CreateUserInput, UpdateUserInput, UserMembership, UserRecord};
use tenura_core::{AppError, AppResult, InstitutionId, RoleId, UserId};

/// Incoming payload for user creation.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub short_name: String,
    pub password: String,
    pub institution_id: InstitutionId,
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

/// Incoming payload for user updates. Absent fields are kept.
///
/// `role_ids` replaces the roles held in `institution_id`, which defaults to
/// the caller's institution.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub short_name: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
    pub institution_id: Option<InstitutionId>,
    pub role_ids: Option<Vec<RoleId>>,
}

/// Membership of a user in one institution.
#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub institution_id: InstitutionId,
    pub institution_name: String,
    pub role_ids: Vec<RoleId>,
}

/// API representation of a user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub short_name: String,
    pub is_active: bool,
    pub memberships: Vec<MembershipResponse>,
}

impl From<CreateUserRequest> for CreateUserInput {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            full_name: request.full_name,
            short_name: request.short_name,
            password: request.password,
            institution_id: request.institution_id,
            role_ids: request.role_ids,
        }
    }
}

impl UpdateUserRequest {
    /// Builds the service input, binding a role replacement to an
    /// institution.
    pub fn into_input(self, caller_institution: Option<InstitutionId>) -> AppResult<UpdateUserInput> {
        let roles = match self.role_ids {
            Some(role_ids) => {
                let institution_id = self.institution_id.or(caller_institution).ok_or_else(|| {
                    AppError::Validation(
                        "institution_id is required when replacing roles".to_owned(),
                    )
                })?;
                Some((institution_id, role_ids))
            }
            None => None,
        };

        Ok(UpdateUserInput {
            email: self.email,
            full_name: self.full_name,
            short_name: self.short_name,
            is_active: self.is_active,
            password: self.password,
            roles,
        })
    }
}

impl From<UserMembership> for MembershipResponse {
    fn from(membership: UserMembership) -> Self {
        Self {
            institution_id: membership.institution_id,
            institution_name: membership.institution_name,
            role_ids: membership.role_ids,
        }
    }
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        let account = record.account;
        Self {
            user_id: account.id(),
            username: account.username().to_owned(),
            email: account.email().to_owned(),
            full_name: account.full_name().to_owned(),
            short_name: account.short_name().to_owned(),
            is_active: account.is_active(),
            memberships: record
                .memberships
                .into_iter()
                .map(MembershipResponse::from)
                .collect(),
        }
    }
}
