use assess_core::model::{AssessmentId, Question, ResponseId, UserId};
use sqlx::Row;

use crate::repository::{ResponseRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn position_to_i64(position: usize) -> Result<i64, StorageError> {
    i64::try_from(position).map_err(|_| StorageError::Serialization("position overflow".into()))
}

pub(crate) fn options_to_json(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn options_from_json(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let prompt: String = row.try_get("prompt").map_err(ser)?;
    let options = options_from_json(&row.try_get::<String, _>("options").map_err(ser)?)?;
    let answer: String = row.try_get("answer").map_err(ser)?;

    Question::new(prompt, options, answer).map_err(ser)
}

pub(crate) fn map_response_row(row: &sqlx::sqlite::SqliteRow) -> Result<ResponseRecord, StorageError> {
    Ok(ResponseRecord {
        id: ResponseId::new(row.try_get("id").map_err(ser)?),
        user_id: UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?).map_err(ser)?,
        assessment_id: AssessmentId::new(row.try_get::<String, _>("assessment_id").map_err(ser)?)
            .map_err(ser)?,
        answers: row.try_get("answers").map_err(ser)?,
        score: u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?,
        submitted_at: row.try_get("submitted_at").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_round_trip_through_json_column() {
        let options = vec!["Paris".to_string(), "Lyon, France".to_string()];
        let raw = options_to_json(&options).unwrap();
        assert_eq!(raw, r#"["Paris","Lyon, France"]"#);
        assert_eq!(options_from_json(&raw).unwrap(), options);
    }

    #[test]
    fn negative_score_is_rejected() {
        assert!(matches!(
            u32_from_i64("score", -1),
            Err(StorageError::Serialization(_))
        ));
    }
}
