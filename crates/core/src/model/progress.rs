use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{LessonId, ProgressId, UserId};

/// Append-only record of one quiz attempt.
///
/// A new record is written for every submission; earlier attempts on the same
/// lesson are kept as history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub id: ProgressId,
    pub user_id: UserId,
    pub lesson_id: LessonId,
    pub completed: bool,
    pub score: Option<u32>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl UserProgress {
    /// Record of a finished attempt with its score.
    #[must_use]
    pub fn completed(
        id: ProgressId,
        user_id: UserId,
        lesson_id: LessonId,
        score: u32,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            lesson_id,
            completed: true,
            score: Some(score),
            completed_at: Some(at),
        }
    }
}
