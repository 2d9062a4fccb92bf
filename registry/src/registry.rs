//! The slug registry: a store wired to a backend and a session.

use crate::reducer::{SlugEnvironment, SlugReducer};
use crate::types::{SlugAction, SlugState, SyncPhase};
use slug_registry_core::{ApiError, NewSlug, OwnerId, SessionObserver, SlugApi, SlugId, SlugRecord};
use slug_registry_runtime::{Store, StoreError, Subscription};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

type SlugStore = Store<SlugState, SlugAction, SlugEnvironment, SlugReducer>;

/// Errors returned by [`SlugRegistry`] operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The backend refused or never answered
    #[error("Slug API error: {0}")]
    Api(#[from] ApiError),

    /// The underlying store rejected the request (shut down or timed out)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Tuning knobs for [`SlugRegistry`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// How long [`SlugRegistry::add`] and [`SlugRegistry::reset`] wait for the backend
    pub confirm_timeout: Duration,
    /// How long [`SlugRegistry::teardown`] waits for in-flight calls
    pub shutdown_timeout: Duration,
    /// Capacity of the store's action broadcast
    pub broadcast_capacity: usize,
}

impl RegistryConfig {
    /// Set the confirmation timeout
    #[must_use]
    pub const fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Set the teardown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            confirm_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(5),
            broadcast_capacity: 64,
        }
    }
}

/// Client-side mirror of the signed-in user's slugs
///
/// Constructed once by the application entry point and shared by `Arc`.
/// The registry follows the session on its own: a new identity triggers one
/// full resync, signing out clears the snapshot.
///
/// ```ignore
/// let registry = SlugRegistry::init(api, session).await?;
/// let _sub = registry.subscribe(|slugs| println!("{} slugs", slugs.len())).await;
///
/// let record = registry.add(NewSlug::new("docs", "https://docs.rs")).await?;
/// registry.update(SlugRecord { redirect: "https://docs.rs/std".into(), ..record }).await?;
/// ```
pub struct SlugRegistry {
    store: SlugStore,
    config: RegistryConfig,
    next_request: AtomicU64,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl SlugRegistry {
    /// Build a registry with the default configuration
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] if the initial reconciliation could
    /// not be submitted.
    pub async fn init(
        api: Arc<dyn SlugApi>,
        session: Arc<dyn SessionObserver>,
    ) -> Result<Self, RegistryError> {
        Self::with_config(api, session, RegistryConfig::default()).await
    }

    /// Build a registry and start following `session`
    ///
    /// Reconciles once for the identity present right now: a signed-in user
    /// gets their list, otherwise the anonymous list is loaded. Later
    /// identity changes are picked up by a background watcher task.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] if the initial reconciliation could
    /// not be submitted.
    pub async fn with_config(
        api: Arc<dyn SlugApi>,
        session: Arc<dyn SessionObserver>,
        config: RegistryConfig,
    ) -> Result<Self, RegistryError> {
        let store = Store::with_broadcast_capacity(
            SlugState::default(),
            SlugReducer,
            SlugEnvironment::new(api),
            config.broadcast_capacity,
        );

        let mut identities = session.watch();
        let initial = identities.borrow_and_update().clone();
        let anonymous = initial.is_none();

        let next_request = AtomicU64::new(0);
        store.send(SlugAction::SessionChanged { identity: initial }).await?;
        if anonymous {
            let request_id = next_request.fetch_add(1, Ordering::Relaxed);
            store.send(SlugAction::Reset { request_id }).await?;
        }

        let watcher_store = store.clone();
        let watcher = tokio::spawn(async move {
            while identities.changed().await.is_ok() {
                let identity = identities.borrow_and_update().clone();
                if watcher_store
                    .send(SlugAction::SessionChanged { identity })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            tracing::debug!("Session watcher stopped");
        });

        Ok(Self {
            store,
            config,
            next_request,
            watcher: Mutex::new(Some(watcher)),
        })
    }

    /// Observe the snapshot
    ///
    /// `listener` is called immediately with the current records and again,
    /// synchronously, after every change. Dropping the returned
    /// [`Subscription`] stops the calls.
    pub async fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[SlugRecord]) + Send + Sync + 'static,
    {
        let seen = AtomicU64::new(u64::MAX);
        self.store
            .subscribe(move |state: &SlugState| {
                if seen.swap(state.revision, Ordering::AcqRel) != state.revision {
                    listener(&state.slugs);
                }
            })
            .await
    }

    /// Clone of the current records
    pub async fn snapshot(&self) -> Vec<SlugRecord> {
        self.store.state(|s| s.slugs.clone()).await
    }

    /// Current synchronization phase
    pub async fn phase(&self) -> SyncPhase {
        self.store.state(SlugState::phase).await
    }

    /// Identity the registry currently follows
    pub async fn owner(&self) -> Option<OwnerId> {
        self.store.state(|s| s.owner.clone()).await
    }

    /// Reload the full list for the current owner
    ///
    /// Waits for the backend to answer. Failures are logged and leave the
    /// snapshot unchanged; this never returns an error.
    pub async fn reset(&self) {
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let answered = self
            .store
            .send_and_wait_for(
                SlugAction::Reset { request_id },
                move |action| action.answers_reset(request_id),
                self.config.confirm_timeout,
            )
            .await;

        if let Err(error) = answered {
            tracing::warn!(%error, "Reset did not complete");
        }
    }

    /// Create a slug and append the confirmed record
    ///
    /// Returns the record as assigned by the backend.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Api`]: the backend refused the create; the snapshot is unchanged
    /// - [`RegistryError::Store`]: the registry is shut down, or no answer within the confirm timeout
    pub async fn add(&self, slug: NewSlug) -> Result<SlugRecord, RegistryError> {
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);

        let answer = self
            .store
            .send_and_wait_for(
                SlugAction::Add { request_id, slug },
                move |action| action.answers_create(request_id),
                self.config.confirm_timeout,
            )
            .await?;

        match answer {
            SlugAction::SlugCreated { record, .. } => Ok(record),
            SlugAction::CreateFailed { error, .. } => Err(RegistryError::Api(error)),
            // `answers_create` only matches the two variants above.
            _ => Err(RegistryError::Store(StoreError::ChannelClosed)),
        }
    }

    /// Replace the record with `record.id`
    ///
    /// The snapshot changes immediately; the backend write runs in the
    /// background. If it fails, a resync is scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] if the registry is shut down.
    pub async fn update(&self, record: SlugRecord) -> Result<(), RegistryError> {
        Ok(self.store.send(SlugAction::Update { record }).await?)
    }

    /// Remove the record with `id`
    ///
    /// The snapshot changes immediately; the backend delete runs in the
    /// background. If it fails, a resync is scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] if the registry is shut down.
    pub async fn remove(&self, id: SlugId) -> Result<(), RegistryError> {
        Ok(self.store.send(SlugAction::Remove { id }).await?)
    }

    /// Wait until no backend call started by the registry is outstanding
    pub async fn settled(&self) {
        self.store.settled().await;
    }

    /// Stop following the session and wait for in-flight calls
    ///
    /// Further operations fail with [`StoreError::ShutdownInProgress`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] if calls were still running when the
    /// shutdown timeout elapsed.
    pub async fn teardown(&self) -> Result<(), RegistryError> {
        self.stop_watcher();
        Ok(self.store.shutdown(self.config.shutdown_timeout).await?)
    }

    fn stop_watcher(&self) {
        let handle = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl Drop for SlugRegistry {
    fn drop(&mut self) {
        self.stop_watcher();
    }
}

impl std::fmt::Debug for SlugRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlugRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
