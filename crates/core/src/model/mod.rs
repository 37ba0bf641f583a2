mod ids;
mod lesson;
mod progress;
mod user;

pub use ids::{LessonId, ProgressId, UserId};

pub use lesson::{Lesson, QuizQuestion};
pub use progress::UserProgress;
pub use user::{STARTING_LEVEL, User, UserError};
