use chrono::{DateTime, Utc};
use quest_core::model::{User, UserId};

use super::{
    SqliteRepository,
    mapping::{map_user_row, to_json, u64_to_i64},
    read_err, write_err,
};
use crate::repository::{StorageError, UserRepository};

const USER_COLUMNS: &str =
    "id, username, email, level, total_score, achievements, created_at, last_active";

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO users (id, username, email, level, total_score, achievements, created_at, last_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(user.id.as_str())
        .bind(&user.username)
        .bind(&user.email)
        .bind(i64::from(user.level))
        .bind(u64_to_i64("total_score", user.total_score)?)
        .bind(to_json(&user.achievements)?)
        .bind(user.created_at)
        .bind(user.last_active)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(read_err)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_err)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn increment_score(
        &self,
        id: &UserId,
        delta: u64,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        // Single statement so concurrent submissions never lose an increment.
        let res = sqlx::query(
            r"
            UPDATE users
            SET total_score = total_score + ?1,
                last_active = ?2
            WHERE id = ?3
            ",
        )
        .bind(u64_to_i64("delta", delta)?)
        .bind(at)
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
