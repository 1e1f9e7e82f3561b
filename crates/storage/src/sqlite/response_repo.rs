use assess_core::model::ResponseId;

use super::SqliteRepository;
use super::mapping::{conn, map_response_row};
use crate::repository::{NewResponseRecord, ResponseRecord, ResponseRepository, StorageError};

#[async_trait::async_trait]
impl ResponseRepository for SqliteRepository {
    async fn insert_response(&self, record: &NewResponseRecord) -> Result<ResponseId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO responses (user_id, assessment_id, answers, score, submitted_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(record.user_id.as_str())
        .bind(record.assessment_id.as_str())
        .bind(record.answers.as_str())
        .bind(i64::from(record.score))
        .bind(record.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(ResponseId::new(res.last_insert_rowid()))
    }

    async fn get_response(&self, id: ResponseId) -> Result<ResponseRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, user_id, assessment_id, answers, score, submitted_at
                FROM responses
                WHERE id = ?1
            ",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_response_row(&row)
    }
}
