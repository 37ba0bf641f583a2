use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quest_core::model::{Lesson, LessonId, User, UserId, UserProgress};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Upper bound on rows returned by any list query.
pub const FETCH_LIMIT: u32 = 1000;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("database connection is not available")]
    Unavailable,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a brand-new user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id or email is already taken.
    async fn insert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Fetch a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup itself fails.
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StorageError>;

    /// Fetch a user by exact email.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup itself fails.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Add `delta` to the user's total score and stamp `last_active`, as one
    /// atomic store operation.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no user has this ID.
    async fn increment_score(
        &self,
        id: &UserId,
        delta: u64,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}

/// Repository contract for the lesson catalog.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// List lessons in insertion order, optionally restricted to one level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query or decoding failures.
    async fn list_lessons(&self, level: Option<u32>, limit: u32)
    -> Result<Vec<Lesson>, StorageError>;

    /// Fetch a lesson by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup itself fails.
    async fn get_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, StorageError>;

    /// Append a single lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is already taken.
    async fn insert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// Delete every lesson, then insert `lessons`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either step fails.
    async fn replace_all_lessons(&self, lessons: &[Lesson]) -> Result<(), StorageError>;
}

/// Repository contract for the append-only progress log.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Append a progress record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_progress(&self, progress: &UserProgress) -> Result<(), StorageError>;

    /// Progress records for a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query or decoding failures.
    async fn progress_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<UserProgress>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<HashMap<UserId, User>>>,
    lessons: Arc<Mutex<Vec<Lesson>>>,
    progress: Arc<Mutex<Vec<UserProgress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn limit_usize(limit: u32) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        if guard.contains_key(&user.id) || guard.values().any(|u| u.email == user.email) {
            return Err(StorageError::Conflict);
        }
        guard.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.values().find(|u| u.email == email).cloned())
    }

    async fn increment_score(
        &self,
        id: &UserId,
        delta: u64,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        let user = guard.get_mut(id).ok_or(StorageError::NotFound)?;
        user.total_score = user.total_score.saturating_add(delta);
        user.last_active = at;
        Ok(())
    }
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn list_lessons(
        &self,
        level: Option<u32>,
        limit: u32,
    ) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lessons.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|l| level.is_none_or(|lvl| l.level == lvl))
            .take(limit_usize(limit))
            .cloned()
            .collect())
    }

    async fn get_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, StorageError> {
        let guard = self.lessons.lock().map_err(poisoned)?;
        Ok(guard.iter().find(|l| &l.id == id).cloned())
    }

    async fn insert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut guard = self.lessons.lock().map_err(poisoned)?;
        if guard.iter().any(|l| l.id == lesson.id) {
            return Err(StorageError::Conflict);
        }
        guard.push(lesson.clone());
        Ok(())
    }

    async fn replace_all_lessons(&self, lessons: &[Lesson]) -> Result<(), StorageError> {
        let mut guard = self.lessons.lock().map_err(poisoned)?;
        *guard = lessons.to_vec();
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn append_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.push(progress.clone());
        Ok(())
    }

    async fn progress_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<UserProgress>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|p| &p.user_id == user_id)
            .take(limit_usize(limit))
            .cloned()
            .collect())
    }
}

//
// ─── UNAVAILABLE ───────────────────────────────────────────────────────────────
//

/// Stand-in used when no store is configured or reachable.
///
/// Every call fails with `StorageError::Unavailable`, so the process can keep
/// serving the endpoints that do not need the store.
#[derive(Clone, Copy, Default)]
pub struct UnavailableRepository;

#[async_trait]
impl UserRepository for UnavailableRepository {
    async fn insert_user(&self, _user: &User) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    async fn get_user(&self, _id: &UserId) -> Result<Option<User>, StorageError> {
        Err(StorageError::Unavailable)
    }

    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, StorageError> {
        Err(StorageError::Unavailable)
    }

    async fn increment_score(
        &self,
        _id: &UserId,
        _delta: u64,
        _at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

#[async_trait]
impl LessonRepository for UnavailableRepository {
    async fn list_lessons(
        &self,
        _level: Option<u32>,
        _limit: u32,
    ) -> Result<Vec<Lesson>, StorageError> {
        Err(StorageError::Unavailable)
    }

    async fn get_lesson(&self, _id: &LessonId) -> Result<Option<Lesson>, StorageError> {
        Err(StorageError::Unavailable)
    }

    async fn insert_lesson(&self, _lesson: &Lesson) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    async fn replace_all_lessons(&self, _lessons: &[Lesson]) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

#[async_trait]
impl ProgressRepository for UnavailableRepository {
    async fn append_progress(&self, _progress: &UserProgress) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    async fn progress_for_user(
        &self,
        _user_id: &UserId,
        _limit: u32,
    ) -> Result<Vec<UserProgress>, StorageError> {
        Err(StorageError::Unavailable)
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub(crate) enum Backend {
    InMemory,
    Sqlite(SqlitePool),
    Unavailable,
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub lessons: Arc<dyn LessonRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub(crate) backend: Backend,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            users: Arc::new(repo.clone()),
            lessons: Arc::new(repo.clone()),
            progress: Arc::new(repo),
            backend: Backend::InMemory,
        }
    }

    /// Storage whose every operation fails with `StorageError::Unavailable`.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            users: Arc::new(UnavailableRepository),
            lessons: Arc::new(UnavailableRepository),
            progress: Arc::new(UnavailableRepository),
            backend: Backend::Unavailable,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.backend, Backend::Unavailable)
    }

    /// Release the underlying connection pool, if any.
    pub async fn close(&self) {
        match &self.backend {
            Backend::Sqlite(pool) => pool.close().await,
            Backend::InMemory | Backend::Unavailable => {}
        }
    }
}
