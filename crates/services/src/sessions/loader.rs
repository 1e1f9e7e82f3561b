use std::sync::Arc;
use std::time::Duration;

use assess_core::model::{Assessment, AssessmentId};
use storage::repository::{AssessmentRepository, StorageError};

use super::service::AssessmentSession;
use crate::config::ServiceConfig;
use crate::error::LoadError;

/// Fetches assessments for new sessions.
///
/// Read-only; a failed load is never retried here.
#[derive(Clone)]
pub struct AssessmentLoader {
    assessments: Arc<dyn AssessmentRepository>,
    timeout: Duration,
}

impl AssessmentLoader {
    #[must_use]
    pub fn new(assessments: Arc<dyn AssessmentRepository>) -> Self {
        Self {
            assessments,
            timeout: ServiceConfig::DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load an assessment with its full question set.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NotFound` if the store has no such assessment.
    /// Returns `LoadError::Store` for store failures, including an expired
    /// read (`StorageError::Timeout`).
    #[tracing::instrument(skip(self, id), fields(assessment_id = %id))]
    pub async fn load(&self, id: &AssessmentId) -> Result<Assessment, LoadError> {
        match tokio::time::timeout(self.timeout, self.assessments.get_assessment(id)).await {
            Ok(Ok(assessment)) => {
                tracing::debug!(questions = assessment.question_count(), "assessment loaded");
                Ok(assessment)
            }
            Ok(Err(StorageError::NotFound)) => {
                tracing::info!("assessment not found");
                Err(LoadError::NotFound(id.clone()))
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "assessment load failed");
                Err(LoadError::Store(e))
            }
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis(), "assessment load timed out");
                Err(LoadError::Store(StorageError::Timeout))
            }
        }
    }

    /// Load an assessment and open a session on it with no answers selected.
    ///
    /// # Errors
    ///
    /// Same as [`AssessmentLoader::load`].
    pub async fn start_session(&self, id: &AssessmentId) -> Result<AssessmentSession, LoadError> {
        let assessment = self.load(id).await?;
        Ok(AssessmentSession::new(assessment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::Question;
    use async_trait::async_trait;
    use storage::repository::InMemoryRepository;

    struct StalledStore;

    #[async_trait]
    impl AssessmentRepository for StalledStore {
        async fn get_assessment(&self, _id: &AssessmentId) -> Result<Assessment, StorageError> {
            std::future::pending().await
        }

        async fn upsert_assessment(&self, _assessment: &Assessment) -> Result<(), StorageError> {
            Ok(())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl AssessmentRepository for BrokenStore {
        async fn get_assessment(&self, _id: &AssessmentId) -> Result<Assessment, StorageError> {
            Err(StorageError::Connection("connection reset".into()))
        }

        async fn upsert_assessment(&self, _assessment: &Assessment) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn id(raw: &str) -> AssessmentId {
        AssessmentId::new(raw).unwrap()
    }

    async fn seeded() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        let q = Question::new("2+2?", vec!["3".into(), "4".into()], "4").unwrap();
        repo.upsert_assessment(&Assessment::new(id("a1"), "Math", "", vec![q]))
            .await
            .unwrap();
        repo.upsert_assessment(&Assessment::new(id("empty"), "Nothing yet", "", Vec::new()))
            .await
            .unwrap();
        repo
    }

    #[tokio::test]
    async fn load_is_repeatable() {
        let loader = AssessmentLoader::new(Arc::new(seeded().await));

        let first = loader.load(&id("a1")).await.unwrap();
        let second = loader.load(&id("a1")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.question_count(), 1);
    }

    #[tokio::test]
    async fn missing_id_is_not_found_not_empty() {
        let loader = AssessmentLoader::new(Arc::new(seeded().await));

        let err = loader.load(&id("nonexistent-id")).await.unwrap_err();
        assert!(matches!(err, LoadError::NotFound(ref missing) if missing.as_str() == "nonexistent-id"));

        let empty = loader.load(&id("empty")).await.unwrap();
        assert_eq!(empty.question_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_carries_cause() {
        let loader = AssessmentLoader::new(Arc::new(BrokenStore));

        let err = loader.load(&id("a1")).await.unwrap_err();
        assert!(matches!(err, LoadError::Store(StorageError::Connection(_))));
    }

    #[tokio::test]
    async fn stalled_read_times_out() {
        let loader =
            AssessmentLoader::new(Arc::new(StalledStore)).with_timeout(Duration::from_millis(20));

        let err = loader.load(&id("a1")).await.unwrap_err();
        assert!(matches!(err, LoadError::Store(StorageError::Timeout)));
    }

    #[tokio::test]
    async fn started_session_has_no_answers() {
        let loader = AssessmentLoader::new(Arc::new(seeded().await));

        let session = loader.start_session(&id("a1")).await.unwrap();
        assert!(session.current().is_empty());
        assert_eq!(session.assessment().id().as_str(), "a1");
    }
}
