//! Built-in lessons installed by a catalog reseed.

use chrono::{DateTime, Utc};
use quest_core::model::{Lesson, LessonId, QuizQuestion};
use serde_json::json;

/// The fixed sample catalog, with fresh ids and `created_at = now`.
#[must_use]
pub fn sample_lessons(now: DateTime<Utc>) -> Vec<Lesson> {
    vec![
        Lesson {
            id: LessonId::generate(),
            title: "Tooth Brushing Basics".into(),
            description: "Learn the proper way to brush your teeth".into(),
            level: 1,
            content: json!({
                "key_points": ["Brush for 2 minutes", "Use fluoride toothpaste"]
            }),
            quiz_questions: vec![QuizQuestion::new(
                "How long?",
                ["1 min", "2 mins"],
                "2 mins",
            )],
            created_at: now,
        },
        Lesson {
            id: LessonId::generate(),
            title: "Healthy Foods".into(),
            description: "Discover foods for strong teeth".into(),
            level: 1,
            content: json!({
                "key_points": ["Calcium is key", "Avoid sugar"]
            }),
            quiz_questions: vec![QuizQuestion::new(
                "Best nutrient?",
                ["Vitamin C", "Calcium"],
                "Calcium",
            )],
            created_at: now,
        },
    ]
}
