use std::time::Duration;

/// Bounds applied to the collaborator calls a session makes.
///
/// An expired read surfaces as a store error, an expired identity lookup as
/// an unauthenticated outcome, and an expired insert as a store error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    pub read_timeout: Duration,
    pub identity_timeout: Duration,
    pub write_timeout: Duration,
}

impl ServiceConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Same bound for every collaborator call.
    #[must_use]
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            read_timeout: timeout,
            identity_timeout: timeout,
            write_timeout: timeout,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::uniform(Self::DEFAULT_TIMEOUT)
    }
}
