use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("email cannot be empty")]
    EmptyEmail,
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// Level assigned to every newly registered user.
pub const STARTING_LEVEL: u32 = 1;

/// A learner, keyed naturally by email.
///
/// `total_score` only ever grows: it is the running sum of every quiz score
/// the user has submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub level: u32,
    pub total_score: u64,
    pub achievements: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Builds a brand-new user at level 1 with no score or achievements.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if the username or email is blank.
    pub fn register(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let username = username.into();
        let email = email.into();

        if username.trim().is_empty() {
            return Err(UserError::EmptyUsername);
        }
        if email.trim().is_empty() {
            return Err(UserError::EmptyEmail);
        }

        Ok(Self {
            id,
            username,
            email,
            level: STARTING_LEVEL,
            total_score: 0,
            achievements: Vec::new(),
            created_at: now,
            last_active: now,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
