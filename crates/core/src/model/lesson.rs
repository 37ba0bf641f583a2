use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::ids::LessonId;

//
// ─── QUIZ QUESTION ─────────────────────────────────────────────────────────────
//

/// A multiple-choice question embedded in a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuizQuestion {
    #[must_use]
    pub fn new<I, S>(question: impl Into<String>, options: I, correct_answer: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_answer: correct_answer.into(),
        }
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A content unit with an ordered quiz.
///
/// The position of each entry in `quiz_questions` is what submitted answers
/// are matched against when grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub description: String,
    pub level: u32,
    /// Free-form structured payload (key points, illustrations, ...).
    pub content: Value,
    #[serde(default)]
    pub quiz_questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
}
