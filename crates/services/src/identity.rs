use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use assess_core::model::UserId;
use async_trait::async_trait;

/// Source of the currently authenticated user.
///
/// Consulted fresh on every submission; callers must not cache the result
/// across a session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_identity(&self) -> Option<UserId>;
}

/// Process-local identity, set by whoever performed the sign-in.
#[derive(Debug, Default)]
pub struct LocalIdentity {
    current: RwLock<Option<UserId>>,
}

impl LocalIdentity {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signed_in(user: UserId) -> Self {
        Self {
            current: RwLock::new(Some(user)),
        }
    }

    pub fn sign_in(&self, user: UserId) {
        *self.write() = Some(user);
    }

    pub fn sign_out(&self) {
        *self.write() = None;
    }

    // The slot is a plain `Option`, so a panicked writer cannot leave it torn.
    fn write(&self) -> RwLockWriteGuard<'_, Option<UserId>> {
        self.current.write().unwrap_or_else(|poisoned| {
            tracing::warn!("identity lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn current_identity(&self) -> Option<UserId> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
