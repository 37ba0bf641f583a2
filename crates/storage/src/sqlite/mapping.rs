use quest_core::model::{
    Lesson, LessonId, ProgressId, QuizQuestion, User, UserId, UserProgress,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<User, StorageError> {
    let achievements: String = row.try_get("achievements").map_err(ser)?;

    Ok(User {
        id: UserId::new(row.try_get::<String, _>("id").map_err(ser)?),
        username: row.try_get("username").map_err(ser)?,
        email: row.try_get("email").map_err(ser)?,
        level: i64_to_u32("level", row.try_get("level").map_err(ser)?)?,
        total_score: i64_to_u64("total_score", row.try_get("total_score").map_err(ser)?)?,
        achievements: from_json(&achievements)?,
        created_at: row.try_get("created_at").map_err(ser)?,
        last_active: row.try_get("last_active").map_err(ser)?,
    })
}

pub(crate) fn map_lesson_row(row: &SqliteRow) -> Result<Lesson, StorageError> {
    let content: String = row.try_get("content").map_err(ser)?;
    let questions: String = row.try_get("quiz_questions").map_err(ser)?;

    Ok(Lesson {
        id: LessonId::new(row.try_get::<String, _>("id").map_err(ser)?),
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        level: i64_to_u32("level", row.try_get("level").map_err(ser)?)?,
        content: from_json(&content)?,
        quiz_questions: from_json::<Vec<QuizQuestion>>(&questions)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<UserProgress, StorageError> {
    let score = row
        .try_get::<Option<i64>, _>("score")
        .map_err(ser)?
        .map(|s| i64_to_u32("score", s))
        .transpose()?;

    Ok(UserProgress {
        id: ProgressId::new(row.try_get::<String, _>("id").map_err(ser)?),
        user_id: UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?),
        lesson_id: LessonId::new(row.try_get::<String, _>("lesson_id").map_err(ser)?),
        completed: row.try_get::<i64, _>("completed").map_err(ser)? != 0,
        score,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}
