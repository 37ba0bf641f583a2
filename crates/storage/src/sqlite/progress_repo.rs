use quest_core::model::{UserId, UserProgress};

use super::{SqliteRepository, mapping::map_progress_row, read_err, write_err};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn append_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO user_progress (id, user_id, lesson_id, completed, score, completed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(progress.id.as_str())
        .bind(progress.user_id.as_str())
        .bind(progress.lesson_id.as_str())
        .bind(i64::from(progress.completed))
        .bind(progress.score.map(i64::from))
        .bind(progress.completed_at)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn progress_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<UserProgress>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, lesson_id, completed, score, completed_at
                FROM user_progress
                WHERE user_id = ?1
                ORDER BY seq ASC
                LIMIT ?2
            ",
        )
        .bind(user_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(read_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_progress_row(&row)?);
        }
        Ok(out)
    }
}
