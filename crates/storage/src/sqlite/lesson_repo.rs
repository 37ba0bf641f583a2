use quest_core::model::{Lesson, LessonId};

use super::{
    SqliteRepository,
    mapping::{map_lesson_row, to_json},
    read_err, write_err,
};
use crate::repository::{LessonRepository, StorageError};

const LESSON_COLUMNS: &str =
    "id, title, description, level, content, quiz_questions, created_at";

const INSERT_LESSON: &str = r"
    INSERT INTO lessons (id, title, description, level, content, quiz_questions, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
";

struct LessonParams {
    content: String,
    quiz_questions: String,
}

impl LessonParams {
    fn encode(lesson: &Lesson) -> Result<Self, StorageError> {
        Ok(Self {
            content: to_json(&lesson.content)?,
            quiz_questions: to_json(&lesson.quiz_questions)?,
        })
    }
}

#[async_trait::async_trait]
impl LessonRepository for SqliteRepository {
    async fn list_lessons(
        &self,
        level: Option<u32>,
        limit: u32,
    ) -> Result<Vec<Lesson>, StorageError> {
        let rows = match level {
            Some(level) => {
                sqlx::query(&format!(
                    "SELECT {LESSON_COLUMNS} FROM lessons WHERE level = ?1 ORDER BY seq ASC LIMIT ?2"
                ))
                .bind(i64::from(level))
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {LESSON_COLUMNS} FROM lessons ORDER BY seq ASC LIMIT ?1"
                ))
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(read_err)?;

        let mut lessons = Vec::with_capacity(rows.len());
        for row in rows {
            lessons.push(map_lesson_row(&row)?);
        }
        Ok(lessons)
    }

    async fn get_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, StorageError> {
        let row = sqlx::query(&format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(read_err)?;

        row.as_ref().map(map_lesson_row).transpose()
    }

    async fn insert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let params = LessonParams::encode(lesson)?;

        sqlx::query(INSERT_LESSON)
            .bind(lesson.id.as_str())
            .bind(&lesson.title)
            .bind(&lesson.description)
            .bind(i64::from(lesson.level))
            .bind(params.content)
            .bind(params.quiz_questions)
            .bind(lesson.created_at)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;

        Ok(())
    }

    async fn replace_all_lessons(&self, lessons: &[Lesson]) -> Result<(), StorageError> {
        // Encode everything up front so a bad payload never leaves the table half-written.
        let encoded = lessons
            .iter()
            .map(|lesson| LessonParams::encode(lesson).map(|params| (lesson, params)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await.map_err(read_err)?;

        sqlx::query("DELETE FROM lessons")
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;

        for (lesson, params) in encoded {
            sqlx::query(INSERT_LESSON)
                .bind(lesson.id.as_str())
                .bind(&lesson.title)
                .bind(&lesson.description)
                .bind(i64::from(lesson.level))
                .bind(params.content)
                .bind(params.quiz_questions)
                .bind(lesson.created_at)
                .execute(&mut *tx)
                .await
                .map_err(write_err)?;
        }

        tx.commit().await.map_err(write_err)?;
        Ok(())
    }
}
