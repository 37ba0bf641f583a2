use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info, warn};

use quest_core::grading::{QuizAnswer, QuizOutcome, grade};
use quest_core::model::{LessonId, ProgressId, UserId, UserProgress};
use storage::repository::{FETCH_LIMIT, LessonRepository, ProgressRepository};

use crate::Clock;
use crate::error::{QuizError, UserServiceError};
use crate::user_service::UserService;

/// A learner's answers for one lesson's quiz.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizSubmission {
    pub user_id: UserId,
    pub lesson_id: LessonId,
    #[serde(default)]
    pub answers: Vec<QuizAnswer>,
}

/// Grades submissions and records the outcome.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
    progress: Arc<dyn ProgressRepository>,
    users: UserService,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        lessons: Arc<dyn LessonRepository>,
        progress: Arc<dyn ProgressRepository>,
        users: UserService,
    ) -> Self {
        Self {
            clock,
            lessons,
            progress,
            users,
        }
    }

    /// Grade a submission, append a progress record, then add the score to
    /// the user's total.
    ///
    /// The two writes are independent. A user that does not exist has no
    /// total to update, so the outcome is still returned. Any other increment
    /// failure leaves the progress record in place and is reported as
    /// `QuizError::ScoreNotApplied`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::LessonNotFound` if the lesson does not exist.
    /// Returns `QuizError::Storage` if reading the lesson or appending progress fails.
    /// Returns `QuizError::ScoreNotApplied` if the score increment failed for
    /// an existing user.
    pub async fn submit(&self, submission: &QuizSubmission) -> Result<QuizOutcome, QuizError> {
        let lesson = self
            .lessons
            .get_lesson(&submission.lesson_id)
            .await?
            .ok_or_else(|| QuizError::LessonNotFound(submission.lesson_id.clone()))?;

        let outcome = grade(&lesson.quiz_questions, &submission.answers);

        let progress = UserProgress::completed(
            ProgressId::generate(),
            submission.user_id.clone(),
            submission.lesson_id.clone(),
            outcome.score,
            self.clock.now(),
        );
        self.progress.append_progress(&progress).await?;

        match self
            .users
            .apply_score_increment(&submission.user_id, u64::from(outcome.score))
            .await
        {
            Ok(()) => {}
            Err(UserServiceError::NotFound(_)) => {
                warn!(
                    user_id = %submission.user_id,
                    progress_id = %progress.id,
                    "quiz submitted for unknown user; score not applied"
                );
            }
            Err(source) => {
                error!(
                    user_id = %submission.user_id,
                    lesson_id = %submission.lesson_id,
                    progress_id = %progress.id,
                    error = %source,
                    "progress recorded but score increment failed"
                );
                return Err(QuizError::ScoreNotApplied {
                    progress_id: progress.id,
                    source,
                });
            }
        }

        info!(
            user_id = %submission.user_id,
            lesson_id = %submission.lesson_id,
            score = outcome.score,
            passed = outcome.passed,
            "quiz submitted"
        );
        Ok(outcome)
    }

    /// Every recorded attempt for a user, oldest first.
    ///
    /// An unknown user simply has no history.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if repository access fails.
    pub async fn progress_for_user(&self, user_id: &UserId) -> Result<Vec<UserProgress>, QuizError> {
        let records = self.progress.progress_for_user(user_id, FETCH_LIMIT).await?;
        Ok(records)
    }
}
