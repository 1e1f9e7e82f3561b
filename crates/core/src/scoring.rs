use std::fmt;

use crate::model::{AnswerState, Assessment};

/// Points earned against the number of questions in the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Score {
    correct: u32,
    total: u32,
}

impl Score {
    /// Number of questions answered correctly.
    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    /// Maximum achievable score, equal to the question count.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.correct == self.total
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} out of {}", self.correct, self.total)
    }
}

/// Scores `answers` against the assessment's answer key.
///
/// One point per question whose selected option equals the key exactly.
/// Unanswered questions, and selections for indices past the last question,
/// earn nothing.
#[must_use]
pub fn score(assessment: &Assessment, answers: &AnswerState) -> Score {
    let correct = assessment
        .questions()
        .iter()
        .enumerate()
        .filter(|(index, question)| {
            answers
                .selected(*index)
                .is_some_and(|option| question.is_correct(option))
        })
        .fold(0_u32, |acc, _| acc.saturating_add(1));

    let total = u32::try_from(assessment.question_count()).unwrap_or(u32::MAX);

    Score { correct, total }
}
