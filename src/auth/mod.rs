//! Admin authentication: credential checks and sessions.

mod password;
mod sessions;

pub use password::{verify_password, Argon2Hasher};
pub use sessions::SessionStore;

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::db::{StoreError, UserRepository};
use crate::models::Identity;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username and password are required")]
    MissingCredentials,
    #[error("no such user")]
    NotFound,
    #[error("password does not match")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Database(#[from] StoreError),
}

impl AuthError {
    /// True when the caller supplied bad credentials, as opposed to the
    /// check itself failing.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCredentials | AuthError::NotFound | AuthError::InvalidCredentials
        )
    }
}

/// Input for the hash checked when the username is unknown.
const DECOY_PASSWORD: &str = "storefront-decoy-password";

/// Verifies admin credentials and manages account passwords.
#[derive(Clone)]
pub struct Authenticator {
    users: UserRepository,
    hasher: Argon2Hasher,
    /// Hash verified for unknown usernames so they cost as much as a wrong
    /// password.
    decoy_hash: Arc<OnceCell<String>>,
}

impl Authenticator {
    pub fn new(users: UserRepository, hasher: Argon2Hasher) -> Self {
        Self {
            users,
            hasher,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Resolves a username and password to the account's identity.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let Some(user) = self.users.find_by_username(username).await? else {
            let decoy = self
                .decoy_hash
                .get_or_try_init(|| self.hash_blocking(DECOY_PASSWORD))
                .await?
                .clone();
            check_password(decoy, password).await?;
            return Err(AuthError::NotFound);
        };

        if !check_password(user.password_hash, password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Identity {
            id: user.id,
            name: user.username,
        })
    }

    pub async fn create_user(&self, username: &str, password: &str) -> Result<i64, AuthError> {
        let hash = self.hash_blocking(password).await?;
        Ok(self.users.create(username, &hash).await?)
    }

    pub async fn set_password(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let hash = self.hash_blocking(password).await?;
        Ok(self.users.set_password(username, &hash).await?)
    }

    async fn hash_blocking(&self, password: &str) -> Result<String, AuthError> {
        if password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        let hasher = self.hasher;
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?
    }
}

async fn check_password(stored: String, password: &str) -> Result<bool, AuthError> {
    let candidate = password.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&stored, &candidate))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?
}
