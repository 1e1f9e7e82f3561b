use std::sync::Arc;
use std::time::Duration;

use assess_core::model::{AnswerState, Assessment, Response, ResponseId, UserId};
use assess_core::{Clock, Score, score};
use storage::repository::{NewResponseRecord, ResponseRepository, StorageError};

use super::service::AssessmentSession;
use crate::config::ServiceConfig;
use crate::error::SubmitError;
use crate::identity::IdentityProvider;

/// Outcome of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub response_id: ResponseId,
    pub score: Score,
}

/// Gates submission on identity, scores, and writes exactly one response.
#[derive(Clone)]
pub struct SubmissionCoordinator {
    clock: Clock,
    identity: Arc<dyn IdentityProvider>,
    responses: Arc<dyn ResponseRepository>,
    identity_timeout: Duration,
    write_timeout: Duration,
}

impl SubmissionCoordinator {
    #[must_use]
    pub fn new(
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
        responses: Arc<dyn ResponseRepository>,
    ) -> Self {
        let config = ServiceConfig::default();
        Self {
            clock,
            identity,
            responses,
            identity_timeout: config.identity_timeout,
            write_timeout: config.write_timeout,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: &ServiceConfig) -> Self {
        self.identity_timeout = config.identity_timeout;
        self.write_timeout = config.write_timeout;
        self
    }

    /// Score `answers` and record them for the signed-in user.
    ///
    /// Identity is resolved first; without one nothing is scored or written.
    /// The insert is attempted once and never retried here.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Unauthenticated` if no user is signed in or the
    /// identity lookup expires.
    /// Returns `SubmitError::Store` if the response cannot be encoded or
    /// inserted, including an expired insert (`StorageError::Timeout`).
    #[tracing::instrument(skip_all, fields(assessment_id = %assessment.id()))]
    pub async fn submit(
        &self,
        assessment: &Assessment,
        answers: &AnswerState,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let Some(user_id) = self.resolve_identity().await else {
            tracing::info!("submission refused: no authenticated user");
            return Err(SubmitError::Unauthenticated);
        };

        let score = score(assessment, answers);
        let response = Response::new(
            user_id,
            assessment.id().clone(),
            answers.clone(),
            score,
            self.clock.now(),
        );
        let record = NewResponseRecord::from_response(&response)?;

        let response_id =
            match tokio::time::timeout(self.write_timeout, self.responses.insert_response(&record))
                .await
            {
                Ok(Ok(id)) => id,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "response insert failed");
                    return Err(SubmitError::Store(e));
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_ms = self.write_timeout.as_millis(),
                        "response insert timed out"
                    );
                    return Err(SubmitError::Store(StorageError::Timeout));
                }
            };

        tracing::info!(
            user_id = %response.user_id(),
            response_id = %response_id,
            score = %score,
            "submission recorded"
        );

        Ok(SubmissionReceipt { response_id, score })
    }

    /// Submit a session's answers at most once.
    ///
    /// The session moves to `Submitting` before any collaborator is called.
    /// On success it becomes `Submitted`; on any failure it returns to
    /// `Answering` with its answers intact so the user can retry. A session
    /// whose submit future is dropped mid-flight stays `Submitting` and
    /// refuses further submits.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::InProgress` or `SubmitError::AlreadySubmitted`
    /// without contacting any collaborator if the session is past
    /// `Answering`, otherwise the errors of [`SubmissionCoordinator::submit`].
    pub async fn submit_session(
        &self,
        session: &mut AssessmentSession,
    ) -> Result<SubmissionReceipt, SubmitError> {
        session.begin_submit()?;

        match self.submit(session.assessment(), session.current()).await {
            Ok(receipt) => {
                session.finish_submit(receipt);
                Ok(receipt)
            }
            Err(e) => {
                session.abort_submit();
                Err(e)
            }
        }
    }

    async fn resolve_identity(&self) -> Option<UserId> {
        if let Ok(user) =
            tokio::time::timeout(self.identity_timeout, self.identity.current_identity()).await
        {
            user
        } else {
            tracing::warn!(
                timeout_ms = self.identity_timeout.as_millis(),
                "identity lookup timed out"
            );
            None
        }
    }
}
