use chrono::{DateTime, Utc};

use crate::model::answers::AnswerState;
use crate::model::ids::{AssessmentId, UserId};
use crate::scoring::Score;

/// The record of one completed, authenticated submission.
///
/// Built once by the submission flow and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    user_id: UserId,
    assessment_id: AssessmentId,
    answers: AnswerState,
    score: Score,
    submitted_at: DateTime<Utc>,
}

impl Response {
    #[must_use]
    pub fn new(
        user_id: UserId,
        assessment_id: AssessmentId,
        answers: AnswerState,
        score: Score,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            assessment_id,
            answers,
            score,
            submitted_at,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn assessment_id(&self) -> &AssessmentId {
        &self.assessment_id
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerState {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}
