use std::sync::Arc;

use quest_core::model::{Lesson, LessonId};
use storage::repository::{FETCH_LIMIT, LessonRepository};
use tracing::{error, info};

use crate::Clock;
use crate::error::LessonServiceError;
use crate::sample_data::sample_lessons;

/// Read access to the lesson catalog plus the administrative reseed.
#[derive(Clone)]
pub struct LessonService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
}

impl LessonService {
    #[must_use]
    pub fn new(clock: Clock, lessons: Arc<dyn LessonRepository>) -> Self {
        Self { clock, lessons }
    }

    /// List lessons in insertion order, optionally restricted to one level.
    ///
    /// `Some(0)` filters for level 0; only `None` means "every level".
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Storage` if repository access fails.
    pub async fn list_lessons(&self, level: Option<u32>) -> Result<Vec<Lesson>, LessonServiceError> {
        let lessons = self.lessons.list_lessons(level, FETCH_LIMIT).await?;
        Ok(lessons)
    }

    /// Fetch a lesson by ID.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::NotFound` when the lesson does not exist.
    /// Returns `LessonServiceError::Storage` if repository access fails.
    pub async fn get_lesson(&self, id: &LessonId) -> Result<Lesson, LessonServiceError> {
        self.lessons
            .get_lesson(id)
            .await?
            .ok_or_else(|| LessonServiceError::NotFound(id.clone()))
    }

    /// Replace the whole catalog with the built-in sample lessons.
    ///
    /// Any lesson added before the reseed is lost. Returns the number of
    /// lessons installed.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Storage` if the replacement fails.
    pub async fn reseed(&self) -> Result<usize, LessonServiceError> {
        let samples = sample_lessons(self.clock.now());
        let count = samples.len();

        self.lessons
            .replace_all_lessons(&samples)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to reseed lesson catalog");
                e
            })?;

        info!(count, "reseeded lesson catalog");
        Ok(count)
    }
}
