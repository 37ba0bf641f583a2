//! Quiz grading.
//!
//! Answers are matched to questions by position. Only the first `N` answers
//! are considered, where `N` is the number of questions on the lesson; extras
//! are ignored and missing answers count as wrong.

use serde::{Deserialize, Serialize};

use crate::model::QuizQuestion;

/// Minimum score (inclusive) for an attempt to count as passed.
pub const PASS_THRESHOLD: u32 = 70;

/// One submitted answer, positionally matched to a quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizAnswer {
    #[serde(default)]
    pub selected_option: Option<String>,
}

impl QuizAnswer {
    #[must_use]
    pub fn selected(option: impl Into<String>) -> Self {
        Self {
            selected_option: Some(option.into()),
        }
    }
}

/// Result of grading a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOutcome {
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub passed: bool,
}

/// Grade `answers` against `questions`.
///
/// `score` is `floor(correct * 100 / total)` computed in integers, or `0` for
/// a quiz with no questions.
#[must_use]
pub fn grade(questions: &[QuizQuestion], answers: &[QuizAnswer]) -> QuizOutcome {
    let correct = questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| {
            answer.selected_option.as_deref() == Some(question.correct_answer.as_str())
        })
        .count();

    let total = u32::try_from(questions.len()).unwrap_or(u32::MAX);
    // `correct` is bounded by `questions.len()`
    let correct = u32::try_from(correct).unwrap_or(total);

    let score = if total == 0 {
        0
    } else {
        let scaled = u64::from(correct) * 100 / u64::from(total);
        u32::try_from(scaled).unwrap_or(100)
    };

    QuizOutcome {
        score,
        correct_answers: correct,
        total_questions: total,
        passed: score >= PASS_THRESHOLD,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
