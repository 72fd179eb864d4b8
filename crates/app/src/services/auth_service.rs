//! Auth service: credential checks and user accounts.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use maintrack_domain::error::{MaintrackError, NotFoundError, ValidationError};
use maintrack_domain::id::UserId;
use maintrack_domain::user::User;

use crate::ports::UserRepository;

/// Hashing a password failed inside argon2.
#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(String);

impl From<PasswordHashError> for MaintrackError {
    fn from(err: PasswordHashError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Hash a password into a PHC string using argon2 with a random salt.
///
/// # Errors
///
/// Returns [`PasswordHashError`] if argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHashError(err.to_string()))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Application service for logging in and managing users.
pub struct AuthService<R> {
    repo: R,
}

impl<R: UserRepository> AuthService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Check a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] when either value is blank,
    /// [`MaintrackError::InvalidCredentials`] when the user is unknown or the
    /// password does not match, or a storage error from the repository.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, MaintrackError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::Required { field: "username" }.into());
        }
        if password.is_empty() {
            return Err(ValidationError::Required { field: "password" }.into());
        }
        match self.repo.get_by_username(username).await? {
            Some(user) if verify_password(password, &user.password_hash) => {
                tracing::info!(user_id = %user.id, "user logged in");
                Ok(user)
            }
            _ => {
                tracing::warn!("rejected login attempt");
                Err(MaintrackError::InvalidCredentials)
            }
        }
    }

    /// Create a user with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Duplicate`] when the username is taken,
    /// [`MaintrackError::Validation`] for blank values, or a storage error.
    #[tracing::instrument(skip(self, password, full_name))]
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        full_name: Option<String>,
    ) -> Result<User, MaintrackError> {
        if password.is_empty() {
            return Err(ValidationError::Required { field: "password" }.into());
        }
        let username = username.trim();
        if self.repo.get_by_username(username).await?.is_some() {
            return Err(ValidationError::Duplicate {
                field: "username",
                value: username.to_string(),
            }
            .into());
        }
        let user = User::new(username, full_name, hash_password(password)?)?;
        self.repo.create(user).await
    }

    /// Return the named user, creating it when missing. Used to seed the
    /// initial administrator; an existing password is left untouched.
    ///
    /// # Errors
    ///
    /// Returns a validation or storage error.
    pub async fn ensure_user(
        &self,
        username: &str,
        password: &str,
        full_name: Option<String>,
    ) -> Result<User, MaintrackError> {
        if let Some(existing) = self.repo.get_by_username(username.trim()).await? {
            return Ok(existing);
        }
        self.create_user(username, password, full_name).await
    }

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::NotFound`] when no user with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_user(&self, id: UserId) -> Result<User, MaintrackError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "User",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all users, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_users(&self) -> Result<Vec<User>, MaintrackError> {
        self.repo.get_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::InMemoryUserRepo;

    async fn service_with_admin() -> AuthService<InMemoryUserRepo> {
        let svc = AuthService::new(InMemoryUserRepo::default());
        svc.create_user("admin", "s3cret", Some("Site Admin".to_string()))
            .await
            .unwrap();
        svc
    }

    #[test]
    fn should_verify_hashed_password() {
        let hash = hash_password("correct_password").unwrap();
        assert!(verify_password("correct_password", &hash));
        assert!(!verify_password("wrong_password", &hash));
    }

    #[test]
    fn should_reject_malformed_stored_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn should_authenticate_with_correct_password() {
        let svc = service_with_admin().await;
        let user = svc.authenticate("admin", "s3cret").await.unwrap();
        assert_eq!(user.display_name(), "Site Admin");
    }

    #[tokio::test]
    async fn should_reject_wrong_password() {
        let svc = service_with_admin().await;
        let result = svc.authenticate("admin", "nope").await;
        assert!(matches!(result, Err(MaintrackError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn should_reject_unknown_user() {
        let svc = service_with_admin().await;
        let result = svc.authenticate("ghost", "s3cret").await;
        assert!(matches!(result, Err(MaintrackError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn should_require_username_and_password() {
        let svc = service_with_admin().await;
        assert!(matches!(
            svc.authenticate("", "x").await,
            Err(MaintrackError::Validation(ValidationError::Required {
                field: "username"
            }))
        ));
        assert!(matches!(
            svc.authenticate("admin", "").await,
            Err(MaintrackError::Validation(ValidationError::Required {
                field: "password"
            }))
        ));
    }

    #[tokio::test]
    async fn should_reject_duplicate_username() {
        let svc = service_with_admin().await;
        let result = svc.create_user("admin", "other", None).await;
        assert!(matches!(
            result,
            Err(MaintrackError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[tokio::test]
    async fn should_keep_existing_user_when_ensuring() {
        let svc = service_with_admin().await;
        let before = svc.list_users().await.unwrap();
        svc.ensure_user("admin", "different", None).await.unwrap();
        let after = svc.list_users().await.unwrap();
        assert_eq!(before.len(), after.len());
        assert!(svc.authenticate("admin", "s3cret").await.is_ok());
    }
}
