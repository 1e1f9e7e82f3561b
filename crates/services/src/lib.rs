#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod identity;
pub mod sessions;

pub use assess_core::Clock;

pub use app_services::AssessmentServices;
pub use config::ServiceConfig;
pub use error::{AppServicesError, LoadError, SessionError, SubmitError};
pub use identity::{IdentityProvider, LocalIdentity};
pub use sessions::{
    AssessmentLoader, AssessmentSession, SessionPhase, SessionProgress, SubmissionCoordinator,
    SubmissionReceipt,
};
