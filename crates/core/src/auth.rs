use serde::{Deserialize, Serialize};

use crate::{InstitutionId, RoleId, UserId};

/// Identity admitted by the authorization gate.
///
/// Built once per request from verified token claims and handed to
/// handlers by value. Nothing downstream re-reads the raw token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
    username: String,
    role_ids: Vec<RoleId>,
    institution_id: Option<InstitutionId>,
}

impl UserIdentity {
    /// Creates an identity from verified claims.
    #[must_use]
    pub fn new(
        user_id: UserId,
        username: impl Into<String>,
        role_ids: Vec<RoleId>,
        institution_id: Option<InstitutionId>,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            role_ids,
            institution_id,
        }
    }

    /// Returns the token subject.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name carried in the token.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns the role set in token order.
    #[must_use]
    pub fn role_ids(&self) -> &[RoleId] {
        self.role_ids.as_slice()
    }

    /// Returns the role ids comma-joined, for metadata propagation.
    #[must_use]
    pub fn role_ids_joined(&self) -> String {
        self.role_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Returns the institution the session is bound to, if any.
    #[must_use]
    pub fn institution_id(&self) -> Option<InstitutionId> {
        self.institution_id
    }
}

#[cfg(test)]
mod tests {
    use super::UserIdentity;
    use crate::{RoleId, UserId};

    #[test]
    fn role_ids_are_comma_joined() {
        let first = RoleId::new();
        let second = RoleId::new();
        let identity = UserIdentity::new(UserId::new(), "alice", vec![first, second], None);

        assert_eq!(identity.role_ids_joined(), format!("{first},{second}"));
    }

    #[test]
    fn empty_role_set_joins_to_empty_string() {
        let identity = UserIdentity::new(UserId::new(), "alice", Vec::new(), None);
        assert!(identity.role_ids_joined().is_empty());
    }
}
