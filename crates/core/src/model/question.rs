use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must offer at least one option")]
    NoOptions,
}

/// A single multiple-choice question with its answer key.
///
/// The key is expected to be one of `options`; that is owned by whoever
/// authored the assessment. A question whose key matches no option is still
/// loadable, it just can never be answered correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    answer: String,
}

impl Question {
    /// Creates a new question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` if the prompt is blank.
    /// Returns `QuestionError::NoOptions` if `options` is empty.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }

        Ok(Self {
            prompt,
            options,
            answer: answer.into(),
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Returns true if `option` is one of the listed options.
    #[must_use]
    pub fn offers(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Returns true if the answer key is one of the listed options.
    #[must_use]
    pub fn has_valid_key(&self) -> bool {
        self.offers(&self.answer)
    }

    /// Exact, case-sensitive comparison against the key.
    ///
    /// Never satisfied when the key is not among the options.
    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        self.has_valid_key() && self.answer == option
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn rejects_empty_options() {
        let err = Question::new("2+2?", Vec::new(), "4").unwrap_err();
        assert_eq!(err, QuestionError::NoOptions);
    }

    #[test]
    fn rejects_blank_prompt() {
        let err = Question::new("  ", opts(&["a"]), "a").unwrap_err();
        assert_eq!(err, QuestionError::EmptyPrompt);
    }

    #[test]
    fn correctness_is_case_sensitive() {
        let q = Question::new("Capital of France?", opts(&["Paris", "Lyon"]), "Paris").unwrap();
        assert!(q.is_correct("Paris"));
        assert!(!q.is_correct("paris"));
        assert!(!q.is_correct("Paris "));
    }

    #[test]
    fn mismatched_key_is_never_correct() {
        let q = Question::new("Pick one", opts(&["a", "b"]), "c").unwrap();
        assert!(!q.has_valid_key());
        assert!(!q.is_correct("c"));
        assert!(!q.is_correct("a"));
    }
}
