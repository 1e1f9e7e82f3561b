use thiserror::Error;

use crate::model::{AnswerPayloadError, ParseIdError, QuestionError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    InvalidId(#[from] ParseIdError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    AnswerPayload(#[from] AnswerPayloadError),
}
