//! Session observer contract.
//!
//! The identity subsystem is external. The registry only needs to know who
//! is signed in right now and to be told when that changes; both come from a
//! [`SessionObserver`].

use crate::slug::OwnerId;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The authenticated user as reported by the session subsystem
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Stable user identifier; also the owner of the user's slugs
    pub uid: OwnerId,
}

impl UserIdentity {
    /// Creates an identity for the given user id
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: OwnerId::new(uid),
        }
    }
}

/// Read-only view of the current session.
///
/// `None` means nobody is signed in. Implementations publish every change
/// through the watch channel returned by [`SessionObserver::watch`].
pub trait SessionObserver: Send + Sync {
    /// Subscribe to identity changes
    fn watch(&self) -> watch::Receiver<Option<UserIdentity>>;

    /// The identity at this moment
    fn current(&self) -> Option<UserIdentity> {
        self.watch().borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(watch::Sender<Option<UserIdentity>>);

    impl SessionObserver for Fixed {
        fn watch(&self) -> watch::Receiver<Option<UserIdentity>> {
            self.0.subscribe()
        }
    }

    #[test]
    fn current_reads_latest_value() {
        let (tx, _rx) = watch::channel(None);
        let session = Fixed(tx);
        assert_eq!(session.current(), None);

        session.0.send_replace(Some(UserIdentity::new("alice")));
        assert_eq!(session.current(), Some(UserIdentity::new("alice")));
    }
}
