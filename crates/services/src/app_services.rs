use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::config::ServiceConfig;
use crate::error::AppServicesError;
use crate::identity::IdentityProvider;
use crate::sessions::{AssessmentLoader, SubmissionCoordinator};

/// Assembles the loader and submission coordinator over one storage backend.
#[derive(Clone)]
pub struct AssessmentServices {
    loader: Arc<AssessmentLoader>,
    submissions: Arc<SubmissionCoordinator>,
}

impl AssessmentServices {
    #[must_use]
    pub fn new(
        storage: &Storage,
        identity: Arc<dyn IdentityProvider>,
        clock: Clock,
        config: &ServiceConfig,
    ) -> Self {
        let loader = Arc::new(
            AssessmentLoader::new(Arc::clone(&storage.assessments))
                .with_timeout(config.read_timeout),
        );
        let submissions = Arc::new(
            SubmissionCoordinator::new(clock, identity, Arc::clone(&storage.responses))
                .with_config(config),
        );
        Self {
            loader,
            submissions,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        identity: Arc<dyn IdentityProvider>,
        clock: Clock,
        config: &ServiceConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, identity, clock, config))
    }

    #[must_use]
    pub fn loader(&self) -> Arc<AssessmentLoader> {
        Arc::clone(&self.loader)
    }

    #[must_use]
    pub fn submissions(&self) -> Arc<SubmissionCoordinator> {
        Arc::clone(&self.submissions)
    }
}
