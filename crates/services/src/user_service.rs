use std::sync::Arc;

use quest_core::model::{User, UserId};
use storage::repository::{StorageError, UserRepository};
use tracing::{debug, info};

use crate::Clock;
use crate::error::UserServiceError;

/// Create-or-fetch user directory keyed by email.
#[derive(Clone)]
pub struct UserService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>) -> Self {
        Self { clock, users }
    }

    /// Return the user registered under `email`, creating it if needed.
    ///
    /// An existing record is returned unchanged: a different `username` for a
    /// known email is ignored.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::User` if the username or email is blank.
    /// Returns `UserServiceError::Storage` if persistence fails.
    pub async fn create_or_get(
        &self,
        username: String,
        email: String,
    ) -> Result<User, UserServiceError> {
        if let Some(existing) = self.users.find_user_by_email(&email).await? {
            debug!(user_id = %existing.id, "email already registered");
            return Ok(existing);
        }

        let user = User::register(UserId::generate(), username, email, self.clock.now())?;
        match self.users.insert_user(&user).await {
            Ok(()) => {
                info!(user_id = %user.id, "registered user");
                Ok(user)
            }
            // Lost a race with a concurrent registration of the same email.
            Err(StorageError::Conflict) => self
                .users
                .find_user_by_email(&user.email)
                .await?
                .ok_or(UserServiceError::Storage(StorageError::Conflict)),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::NotFound` when the user does not exist.
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn get_user(&self, id: &UserId) -> Result<User, UserServiceError> {
        self.users
            .get_user(id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(id.clone()))
    }

    /// Add `delta` to the user's total score and refresh `last_active`.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::NotFound` when the user does not exist.
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn apply_score_increment(
        &self,
        id: &UserId,
        delta: u64,
    ) -> Result<(), UserServiceError> {
        match self.users.increment_score(id, delta, self.clock.now()).await {
            Ok(()) => Ok(()),
            Err(StorageError::NotFound) => Err(UserServiceError::NotFound(id.clone())),
            Err(e) => Err(e.into()),
        }
    }
}
