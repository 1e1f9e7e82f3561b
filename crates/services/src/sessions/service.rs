use std::fmt;

use assess_core::model::{AnswerState, Assessment};

use super::progress::SessionProgress;
use super::workflow::SubmissionReceipt;
use crate::error::{SessionError, SubmitError};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where a session stands between load and its terminal submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Loaded and accepting selections.
    Answering,
    /// A submission is in flight; selections and further submits are refused.
    Submitting,
    /// Terminal: exactly one response was written.
    Submitted(SubmissionReceipt),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One user's pass through one assessment.
///
/// Owns the loaded assessment read-only and the in-progress answers. The
/// answers live only as long as the session; nothing here persists them.
pub struct AssessmentSession {
    assessment: Assessment,
    answers: AnswerState,
    phase: SessionPhase,
}

impl AssessmentSession {
    /// Starts a session with no answers selected.
    #[must_use]
    pub fn new(assessment: Assessment) -> Self {
        Self {
            assessment,
            answers: AnswerState::new(),
            phase: SessionPhase::Answering,
        }
    }

    #[must_use]
    pub fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    /// Read-only snapshot of the current selections.
    #[must_use]
    pub fn current(&self) -> &AnswerState {
        &self.answers
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self.phase, SessionPhase::Submitted(_))
    }

    #[must_use]
    pub fn receipt(&self) -> Option<SubmissionReceipt> {
        match self.phase {
            SessionPhase::Submitted(receipt) => Some(receipt),
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.assessment.question_count();
        let answered = self.answers.len();
        SessionProgress {
            total,
            answered,
            unanswered: total.saturating_sub(answered),
            is_submitted: self.is_submitted(),
        }
    }

    /// Selects `option` for question `index`, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` once a submission has started.
    /// Returns `SessionError::InvalidSelection` if the index is out of range
    /// or the question does not list `option`.
    pub fn select(&mut self, index: usize, option: impl Into<String>) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Answering {
            return Err(SessionError::Closed);
        }

        let option = option.into();
        let offered = self
            .assessment
            .question(index)
            .is_some_and(|q| q.offers(&option));
        if !offered {
            tracing::error!(
                assessment_id = %self.assessment.id(),
                index,
                option = %option,
                "selection does not match any offered option"
            );
            return Err(SessionError::InvalidSelection { index, option });
        }

        self.answers.select(index, option);
        Ok(())
    }

    /// Moves `Answering → Submitting`, refusing re-entry.
    pub(crate) fn begin_submit(&mut self) -> Result<(), SubmitError> {
        match self.phase {
            SessionPhase::Answering => {
                self.phase = SessionPhase::Submitting;
                Ok(())
            }
            SessionPhase::Submitting => Err(SubmitError::InProgress),
            SessionPhase::Submitted(_) => Err(SubmitError::AlreadySubmitted),
        }
    }

    pub(crate) fn finish_submit(&mut self, receipt: SubmissionReceipt) {
        self.phase = SessionPhase::Submitted(receipt);
    }

    /// Back to `Answering` with the selections untouched so the user can retry.
    pub(crate) fn abort_submit(&mut self) {
        if self.phase == SessionPhase::Submitting {
            self.phase = SessionPhase::Answering;
        }
    }
}

impl fmt::Debug for AssessmentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssessmentSession")
            .field("assessment_id", self.assessment.id())
            .field("questions", &self.assessment.question_count())
            .field("answered", &self.answers.len())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::Score;
    use assess_core::model::{AssessmentId, Question, ResponseId};

    fn build_assessment() -> Assessment {
        Assessment::new(
            AssessmentId::new("a1").unwrap(),
            "Quiz",
            "",
            vec![
                Question::new("Pick", vec!["a".into(), "b".into()], "a").unwrap(),
                Question::new("Pick again", vec!["x".into(), "y".into()], "y").unwrap(),
            ],
        )
    }

    fn receipt(session: &AssessmentSession) -> SubmissionReceipt {
        SubmissionReceipt {
            response_id: ResponseId::new(1),
            score: assess_core::score(session.assessment(), session.current()),
        }
    }

    #[test]
    fn last_selection_wins() {
        let mut session = AssessmentSession::new(build_assessment());
        session.select(0, "a").unwrap();
        session.select(0, "b").unwrap();

        assert_eq!(session.current().selected(0), Some("b"));
        assert_eq!(session.current().len(), 1);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let mut session = AssessmentSession::new(build_assessment());
        let err = session.select(2, "a").unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidSelection {
                index: 2,
                option: "a".into()
            }
        );
        assert!(session.current().is_empty());
    }

    #[test]
    fn rejects_option_not_offered() {
        let mut session = AssessmentSession::new(build_assessment());
        session.select(1, "x").unwrap();

        let err = session.select(1, "z").unwrap_err();
        assert!(matches!(err, SessionError::InvalidSelection { index: 1, .. }));
        assert_eq!(session.current().selected(1), Some("x"));
    }

    #[test]
    fn progress_counts_answers() {
        let mut session = AssessmentSession::new(build_assessment());
        session.select(1, "y").unwrap();

        let progress = session.progress();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.unanswered, 1);
        assert!(!progress.is_submitted);
    }

    #[test]
    fn submit_guard_refuses_reentry() {
        let mut session = AssessmentSession::new(build_assessment());
        session.begin_submit().unwrap();

        assert!(matches!(session.begin_submit(), Err(SubmitError::InProgress)));
        assert_eq!(session.select(0, "a"), Err(SessionError::Closed));

        let receipt = receipt(&session);
        session.finish_submit(receipt);
        assert!(matches!(
            session.begin_submit(),
            Err(SubmitError::AlreadySubmitted)
        ));
        assert_eq!(session.receipt(), Some(receipt));
        assert_eq!(session.select(0, "a"), Err(SessionError::Closed));
    }

    #[test]
    fn aborted_submit_keeps_answers_and_reopens() {
        let mut session = AssessmentSession::new(build_assessment());
        session.select(0, "a").unwrap();
        session.begin_submit().unwrap();
        session.abort_submit();

        assert_eq!(session.phase(), SessionPhase::Answering);
        assert_eq!(session.current().selected(0), Some("a"));
        session.select(1, "y").unwrap();

        let score: Score = assess_core::score(session.assessment(), session.current());
        assert_eq!(score.correct(), 2);
    }
}
