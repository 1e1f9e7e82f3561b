use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnswerPayloadError {
    #[error("invalid answer payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// In-progress selections for one session: question index → chosen option.
///
/// Unanswered questions are absent. Selecting twice for the same index keeps
/// only the latest choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerState {
    selections: BTreeMap<usize, String>,
}

impl AnswerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `option` for `index`, replacing any earlier selection.
    ///
    /// Range and option membership are checked by the owning session.
    pub fn select(&mut self, index: usize, option: impl Into<String>) {
        self.selections.insert(index, option.into());
    }

    #[must_use]
    pub fn selected(&self, index: usize) -> Option<&str> {
        self.selections.get(&index).map(String::as_str)
    }

    /// Number of answered questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Iterates selections in ascending question order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.selections.iter().map(|(i, o)| (*i, o.as_str()))
    }

    /// Encodes the selections for the response store.
    ///
    /// The format is a JSON object keyed by decimal question index in
    /// ascending order, e.g. `{"0":"4","1":"Lyon"}`.
    ///
    /// # Errors
    ///
    /// Returns `AnswerPayloadError` if serialization fails.
    pub fn encode(&self) -> Result<String, AnswerPayloadError> {
        Ok(serde_json::to_string(&self.selections)?)
    }

    /// Decodes a payload produced by [`AnswerState::encode`].
    ///
    /// # Errors
    ///
    /// Returns `AnswerPayloadError::Malformed` if the payload is not a JSON
    /// object of index → option.
    pub fn decode(payload: &str) -> Result<Self, AnswerPayloadError> {
        let selections = serde_json::from_str(payload)?;
        Ok(Self { selections })
    }
}

impl FromIterator<(usize, String)> for AnswerState {
    fn from_iter<T: IntoIterator<Item = (usize, String)>>(iter: T) -> Self {
        Self {
            selections: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_overwrites_previous_choice() {
        let mut answers = AnswerState::new();
        answers.select(0, "a");
        answers.select(0, "b");

        assert_eq!(answers.selected(0), Some("b"));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn unanswered_indices_are_absent() {
        let mut answers = AnswerState::new();
        answers.select(2, "x");

        assert_eq!(answers.selected(0), None);
        assert_eq!(answers.selected(1), None);
        assert_eq!(answers.selected(2), Some("x"));
    }

    #[test]
    fn encodes_in_index_order() {
        let mut answers = AnswerState::new();
        answers.select(10, "ten");
        answers.select(1, "Lyon");
        answers.select(0, "4");

        assert_eq!(
            answers.encode().unwrap(),
            r#"{"0":"4","1":"Lyon","10":"ten"}"#
        );
    }

    #[test]
    fn decodes_stored_payload() {
        let answers = AnswerState::decode(r#"{"0":"4","1":"Lyon"}"#).unwrap();
        assert_eq!(answers.selected(0), Some("4"));
        assert_eq!(answers.selected(1), Some("Lyon"));

        assert!(AnswerState::decode(r#"{"first":"4"}"#).is_err());
        assert!(AnswerState::decode("[]").is_err());
    }
}
