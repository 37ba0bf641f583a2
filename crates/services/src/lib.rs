#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod lesson_service;
pub mod quiz_service;
pub mod sample_data;
pub mod tutor_service;
pub mod user_service;

pub use quest_core::Clock;

pub use app_services::AppServices;
pub use error::{LessonServiceError, QuizError, TutorError, UserServiceError};
pub use lesson_service::LessonService;
pub use quiz_service::{QuizService, QuizSubmission};
pub use tutor_service::{TutorConfig, TutorQuery, TutorReply, TutorService};
pub use user_service::UserService;
