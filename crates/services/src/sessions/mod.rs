mod loader;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::{LoadError, SessionError, SubmitError};
pub use loader::AssessmentLoader;
pub use progress::SessionProgress;
pub use service::{AssessmentSession, SessionPhase};
pub use workflow::{SubmissionCoordinator, SubmissionReceipt};
