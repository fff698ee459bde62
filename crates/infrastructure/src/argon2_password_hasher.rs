//! Argon2id password hasher.
//!
//! Parameters follow the OWASP password storage baseline: m=19456 (19 MiB),
//! t=2, p=1.

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use tenura_application::PasswordHasher as PasswordHasherPort;
use tenura_core::{AppError, AppResult};

/// Argon2id implementation of the password hasher port.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates a hasher with the baseline parameters.
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(19456, 2, 1, None).unwrap_or_else(|_| Params::default());

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherPort for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|error| AppError::Internal(format!("failed to hash password: {error}")))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|error| {
            AppError::Internal(format!("stored password hash is malformed: {error}"))
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "password verification failed: {error}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Argon2PasswordHasher;
    use tenura_application::PasswordHasher as PasswordHasherPort;
    use tenura_core::{AppError, AppResult};

    #[test]
    fn hash_is_salted_and_verifies() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash_password("s3cret-passphrase")?;
        let second = hasher.hash_password("s3cret-passphrase")?;

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(hasher.verify_password("s3cret-passphrase", &first)?);
        assert!(hasher.verify_password("s3cret-passphrase", &second)?);
        Ok(())
    }

    #[test]
    fn wrong_password_is_a_mismatch_not_an_error() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash_password("s3cret-passphrase")?;
        assert!(!hasher.verify_password("guess", &hash)?);
        Ok(())
    }

    #[test]
    fn malformed_stored_hash_is_internal() {
        let hasher = Argon2PasswordHasher::new();
        assert!(matches!(
            hasher.verify_password("anything", "$2b$12$legacy-bcrypt-hash"),
            Err(AppError::Internal(_))
        ));
    }
}
