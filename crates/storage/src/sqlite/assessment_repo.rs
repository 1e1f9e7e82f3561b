use assess_core::model::{Assessment, AssessmentId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, map_question_row, options_to_json, position_to_i64, ser};
use crate::repository::{AssessmentRepository, StorageError};

#[async_trait::async_trait]
impl AssessmentRepository for SqliteRepository {
    async fn get_assessment(&self, id: &AssessmentId) -> Result<Assessment, StorageError> {
        let header = sqlx::query(
            r"
                SELECT id, title, description
                FROM assessments
                WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        let rows = sqlx::query(
            r"
                SELECT prompt, options, answer
                FROM questions
                WHERE assessment_id = ?1
                ORDER BY position ASC
            ",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in &rows {
            questions.push(map_question_row(row)?);
        }

        Ok(Assessment::new(
            id.clone(),
            header.try_get::<String, _>("title").map_err(ser)?,
            header.try_get::<String, _>("description").map_err(ser)?,
            questions,
        ))
    }

    async fn upsert_assessment(&self, assessment: &Assessment) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO assessments (id, title, description)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description
            ",
        )
        .bind(assessment.id().as_str())
        .bind(assessment.title())
        .bind(assessment.description())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        sqlx::query("DELETE FROM questions WHERE assessment_id = ?1")
            .bind(assessment.id().as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (position, question) in assessment.questions().iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO questions (assessment_id, position, prompt, options, answer)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(assessment.id().as_str())
            .bind(position_to_i64(position)?)
            .bind(question.prompt())
            .bind(options_to_json(question.options())?)
            .bind(question.answer())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
