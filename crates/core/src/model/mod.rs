mod answers;
mod assessment;
mod ids;
mod question;
mod response;

pub use ids::{AssessmentId, ParseIdError, ResponseId, UserId};

pub use answers::{AnswerPayloadError, AnswerState};
pub use assessment::Assessment;
pub use question::{Question, QuestionError};
pub use response::Response;
