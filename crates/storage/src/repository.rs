use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assess_core::model::{
    AnswerPayloadError, Assessment, AssessmentId, Response, ResponseId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store did not respond in time")]
    Timeout,
}

impl From<AnswerPayloadError> for StorageError {
    fn from(e: AnswerPayloadError) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Insert shape for a response.
///
/// `answers` is the encoded selection payload; the store keeps it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResponseRecord {
    pub user_id: UserId,
    pub assessment_id: AssessmentId,
    pub answers: String,
    pub score: u32,
    pub submitted_at: DateTime<Utc>,
}

impl NewResponseRecord {
    /// Flatten a domain `Response` into its stored shape.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the answers cannot be encoded.
    pub fn from_response(response: &Response) -> Result<Self, StorageError> {
        Ok(Self {
            user_id: response.user_id().clone(),
            assessment_id: response.assessment_id().clone(),
            answers: response.answers().encode()?,
            score: response.score().correct(),
            submitted_at: response.submitted_at(),
        })
    }
}

/// A persisted response together with its generated id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    pub id: ResponseId,
    pub user_id: UserId,
    pub assessment_id: AssessmentId,
    pub answers: String,
    pub score: u32,
    pub submitted_at: DateTime<Utc>,
}

impl ResponseRecord {
    #[must_use]
    pub fn from_new(id: ResponseId, record: NewResponseRecord) -> Self {
        Self {
            id,
            user_id: record.user_id,
            assessment_id: record.assessment_id,
            answers: record.answers,
            score: record.score,
            submitted_at: record.submitted_at,
        }
    }
}

/// Read side of the assessment catalog.
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    /// Fetch an assessment with all of its questions, in order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no assessment has this id, or other storage errors.
    async fn get_assessment(&self, id: &AssessmentId) -> Result<Assessment, StorageError>;

    /// Persist or replace an assessment and its questions.
    ///
    /// Only used by seeding and tests; sessions never write assessments.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the assessment cannot be stored.
    async fn upsert_assessment(&self, assessment: &Assessment) -> Result<(), StorageError>;
}

/// Write side for completed submissions.
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Insert one response and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the insert fails.
    async fn insert_response(&self, record: &NewResponseRecord) -> Result<ResponseId, StorageError>;

    /// Fetch a stored response by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_response(&self, id: ResponseId) -> Result<ResponseRecord, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    assessments: Arc<Mutex<HashMap<AssessmentId, Assessment>>>,
    responses: Arc<Mutex<Vec<ResponseRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored response, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn responses(&self) -> Result<Vec<ResponseRecord>, StorageError> {
        let guard = self
            .responses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl AssessmentRepository for InMemoryRepository {
    async fn get_assessment(&self, id: &AssessmentId) -> Result<Assessment, StorageError> {
        let guard = self
            .assessments
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(id).cloned().ok_or(StorageError::NotFound)
    }

    async fn upsert_assessment(&self, assessment: &Assessment) -> Result<(), StorageError> {
        let mut guard = self
            .assessments
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(assessment.id().clone(), assessment.clone());
        Ok(())
    }
}

#[async_trait]
impl ResponseRepository for InMemoryRepository {
    async fn insert_response(&self, record: &NewResponseRecord) -> Result<ResponseId, StorageError> {
        let mut guard = self
            .responses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let next = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("response id overflow".into()))?
            + 1;
        let id = ResponseId::new(next);
        guard.push(ResponseRecord::from_new(id, record.clone()));
        Ok(id)
    }

    async fn get_response(&self, id: ResponseId) -> Result<ResponseRecord, StorageError> {
        let guard = self
            .responses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}

/// Aggregates the assessment and response repositories behind trait objects.
#[derive(Clone)]
pub struct Storage {
    pub assessments: Arc<dyn AssessmentRepository>,
    pub responses: Arc<dyn ResponseRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let assessments: Arc<dyn AssessmentRepository> = Arc::new(repo.clone());
        let responses: Arc<dyn ResponseRepository> = Arc::new(repo);
        Self {
            assessments,
            responses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::Question;
    use assess_core::time::fixed_now;

    fn build_assessment(id: &str) -> Assessment {
        let q = Question::new("2+2?", vec!["3".into(), "4".into()], "4").unwrap();
        Assessment::new(AssessmentId::new(id).unwrap(), "Math", "Basics", vec![q])
    }

    fn build_record(user: &str) -> NewResponseRecord {
        NewResponseRecord {
            user_id: UserId::new(user).unwrap(),
            assessment_id: AssessmentId::new("a1").unwrap(),
            answers: r#"{"0":"4"}"#.into(),
            score: 1,
            submitted_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn missing_assessment_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo
            .get_assessment(&AssessmentId::new("nope").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn upserted_assessment_reads_back_equal() {
        let repo = InMemoryRepository::new();
        let assessment = build_assessment("a1");
        repo.upsert_assessment(&assessment).await.unwrap();

        let first = repo.get_assessment(assessment.id()).await.unwrap();
        let second = repo.get_assessment(assessment.id()).await.unwrap();
        assert_eq!(first, assessment);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn inserts_get_distinct_ids() {
        let repo = InMemoryRepository::new();
        let first = repo.insert_response(&build_record("u1")).await.unwrap();
        let second = repo.insert_response(&build_record("u1")).await.unwrap();
        assert_ne!(first, second);

        let stored = repo.get_response(second).await.unwrap();
        assert_eq!(stored.user_id.as_str(), "u1");
        assert_eq!(stored.answers, r#"{"0":"4"}"#);
        assert_eq!(repo.responses().unwrap().len(), 2);
    }

    #[test]
    fn every_storage_error_has_its_own_message() {
        let errors = [
            StorageError::NotFound,
            StorageError::Connection("reset".into()),
            StorageError::Serialization("bad payload".into()),
            StorageError::Timeout,
        ];
        for e in &errors {
            // Every variant listed here is constructed by an adapter.
            match e {
                StorageError::NotFound
                | StorageError::Connection(_)
                | StorageError::Serialization(_)
                | StorageError::Timeout => {}
            }
        }

        let messages: std::collections::HashSet<String> =
            errors.iter().map(ToString::to_string).collect();
        assert_eq!(messages.len(), errors.len());
    }
}
