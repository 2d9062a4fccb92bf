//! Listener registry for state observers.
//!
//! A plain ordered map from [`SubscriptionId`] to callback. Callbacks are
//! invoked synchronously, in subscription order, every time the owning store
//! notifies. The registry knows nothing about any reactive framework.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Callback registered with a [`ListenerRegistry`]
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Identifier handed out for each registered listener
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Ordered collection of listeners observing values of type `T`
pub struct ListenerRegistry<T> {
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<SubscriptionId, Listener<T>>>,
}

impl<T: 'static> ListenerRegistry<T> {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(BTreeMap::new()),
        })
    }

    /// Registers a listener and returns the guard that keeps it alive.
    ///
    /// The listener is not invoked here; callers that need an initial
    /// delivery do it themselves while they hold whatever lock guards `T`.
    pub fn register(self: &Arc<Self>, listener: Listener<T>) -> Subscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(id, listener);

        let registry: Weak<Self> = Arc::downgrade(self);
        Subscription {
            id,
            cancel: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.remove(id);
                }
            })),
        }
    }

    /// Removes a listener. Unknown ids are ignored.
    pub fn remove(&self, id: SubscriptionId) {
        self.lock().remove(&id);
    }

    /// Number of registered listeners
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when no listener is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Invokes every listener with `value`.
    ///
    /// The listener list is copied out before any callback runs, so a
    /// callback may subscribe or unsubscribe without deadlocking.
    pub fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self.lock().values().cloned().collect();
        for listener in listeners {
            listener(value);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<SubscriptionId, Listener<T>>> {
        // Callbacks never run under this lock, so poisoning cannot leave the map half-updated.
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Guard for a registered listener.
///
/// Dropping the guard unsubscribes. Call [`Subscription::detach`] to keep the
/// listener registered for the lifetime of the registry instead.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    id: SubscriptionId,
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Identifier of the underlying listener
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the listener now
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keeps the listener registered after this guard is gone
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
