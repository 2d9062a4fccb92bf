//! Session observer driven by the test

use slug_registry_core::{SessionObserver, UserIdentity};
use tokio::sync::watch;

/// A [`SessionObserver`] whose identity is set by hand
///
/// ```
/// use slug_registry_testing::ManualSession;
/// use slug_registry_core::SessionObserver;
///
/// let session = ManualSession::signed_in("alice");
/// assert_eq!(session.current().unwrap().uid.as_str(), "alice");
///
/// session.sign_out();
/// assert!(session.current().is_none());
/// ```
#[derive(Debug)]
pub struct ManualSession {
    identity: watch::Sender<Option<UserIdentity>>,
}

impl ManualSession {
    /// Start with nobody signed in
    #[must_use]
    pub fn new() -> Self {
        Self {
            identity: watch::channel(None).0,
        }
    }

    /// Start with `uid` signed in
    #[must_use]
    pub fn signed_in(uid: &str) -> Self {
        let session = Self::new();
        session.sign_in(uid);
        session
    }

    /// Publish `uid` as the current user
    pub fn sign_in(&self, uid: &str) {
        self.identity.send_replace(Some(UserIdentity::new(uid)));
    }

    /// Publish "nobody signed in"
    pub fn sign_out(&self) {
        self.identity.send_replace(None);
    }
}

impl Default for ManualSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for ManualSession {
    fn watch(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.identity.subscribe()
    }
}
