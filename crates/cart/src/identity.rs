//! Identity change feed consumed by the synchronizer.
//!
//! Token issuance and session management belong to the hosted auth
//! provider; all the cart needs is "who is signed in right now" and a
//! notification when that answer changes. A tokio watch channel gives both.

use tokio::sync::watch;

use pulsefit_core::UserId;

/// Receiving side of the identity feed, held by the synchronizer.
pub type IdentityWatch = watch::Receiver<Option<UserId>>;

/// Publishes the current authenticated user to any number of subscribers.
///
/// The auth integration layer calls [`sign_in`](Self::sign_in) and
/// [`sign_out`](Self::sign_out) as the hosted provider reports transitions.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    tx: watch::Sender<Option<UserId>>,
}

impl IdentityProvider {
    /// Create a provider with no user signed in.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Subscribe to identity changes.
    #[must_use]
    pub fn subscribe(&self) -> IdentityWatch {
        self.tx.subscribe()
    }

    /// Report a sign-in. Subscribers are notified even if the same user
    /// signs in again (a fresh token still warrants a cart reload).
    pub fn sign_in(&self, user: UserId) {
        tracing::debug!(user = %user, "identity sign-in");
        self.tx.send_replace(Some(user));
    }

    /// Report a sign-out.
    pub fn sign_out(&self) {
        tracing::debug!("identity sign-out");
        self.tx.send_replace(None);
    }

    /// Current user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserId> {
        self.tx.borrow().clone()
    }
}

impl Default for IdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_observe_transitions() {
        let provider = IdentityProvider::new();
        let mut watch = provider.subscribe();
        assert!(watch.borrow().is_none());

        provider.sign_in(UserId::new("usr_1"));
        watch.changed().await.expect("sender alive");
        assert_eq!(watch.borrow().as_ref(), Some(&UserId::new("usr_1")));

        provider.sign_out();
        watch.changed().await.expect("sender alive");
        assert!(watch.borrow().is_none());
    }

    #[tokio::test]
    async fn test_repeat_sign_in_notifies_again() {
        let provider = IdentityProvider::new();
        let mut watch = provider.subscribe();
        provider.sign_in(UserId::new("usr_1"));
        watch.changed().await.expect("sender alive");
        provider.sign_in(UserId::new("usr_1"));
        watch.changed().await.expect("sender alive");
    }

    #[test]
    fn test_current_user() {
        let provider = IdentityProvider::new();
        assert!(provider.current_user().is_none());
        provider.sign_in(UserId::new("usr_2"));
        assert_eq!(provider.current_user(), Some(UserId::new("usr_2")));
    }
}
