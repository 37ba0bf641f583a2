use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::lesson_service::LessonService;
use crate::quiz_service::QuizService;
use crate::tutor_service::TutorService;
use crate::user_service::UserService;

/// Assembles the request-facing services over one shared storage.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    users: Arc<UserService>,
    lessons: Arc<LessonService>,
    quiz: Arc<QuizService>,
    tutor: Arc<TutorService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: Storage, tutor: TutorService, clock: Clock) -> Self {
        let users = UserService::new(clock, Arc::clone(&storage.users));
        let lessons = LessonService::new(clock, Arc::clone(&storage.lessons));
        let quiz = QuizService::new(
            clock,
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.progress),
            users.clone(),
        );

        Self {
            storage,
            users: Arc::new(users),
            lessons: Arc::new(lessons),
            quiz: Arc::new(quiz),
            tutor: Arc::new(tutor),
        }
    }

    /// Whether a real store is attached.
    #[must_use]
    pub fn store_available(&self) -> bool {
        self.storage.is_available()
    }

    #[must_use]
    pub fn users(&self) -> Arc<UserService> {
        Arc::clone(&self.users)
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonService> {
        Arc::clone(&self.lessons)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn tutor(&self) -> Arc<TutorService> {
        Arc::clone(&self.tutor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quest_core::time::fixed_now;

    #[tokio::test]
    async fn unavailable_storage_is_reported_not_fatal() {
        let services = AppServices::new(
            Storage::unavailable(),
            TutorService::disabled(),
            Clock::fixed(fixed_now()),
        );
        assert!(!services.store_available());

        let err = services.lessons().list_lessons(None).await.unwrap_err();
        assert!(err.is_store_unavailable());
    }
}
