//! Slug store reducer.
//!
//! Local mutations are applied optimistically before the backend call is
//! issued. Backend calls run as effects and report back through the result
//! variants of [`SlugAction`]. A failed background write schedules a resync
//! for the same owner so the snapshot converges on server truth.

use crate::types::{Mutation, SlugAction, SlugState};
use slug_registry_core::effect::Effect;
use slug_registry_core::reducer::Reducer;
use slug_registry_core::{smallvec, NewSlug, OwnerId, SlugApi, SlugId, SlugRecord, SmallVec, UserIdentity};
use std::sync::Arc;

/// Dependencies of [`SlugReducer`]
#[derive(Clone)]
pub struct SlugEnvironment {
    /// Backend the store synchronizes with
    pub api: Arc<dyn SlugApi>,
}

impl SlugEnvironment {
    /// Wrap a backend
    #[must_use]
    pub fn new(api: Arc<dyn SlugApi>) -> Self {
        Self { api }
    }
}

impl std::fmt::Debug for SlugEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlugEnvironment").finish_non_exhaustive()
    }
}

type Effects = SmallVec<[Effect<SlugAction>; 4]>;

/// Reducer for the slug store
#[derive(Clone, Copy, Debug, Default)]
pub struct SlugReducer;

impl Reducer for SlugReducer {
    type State = SlugState;
    type Action = SlugAction;
    type Environment = SlugEnvironment;

    fn reduce(&self, state: &mut SlugState, action: SlugAction, env: &SlugEnvironment) -> Effects {
        match action {
            SlugAction::SessionChanged { identity } => session_changed(state, identity, env),
            SlugAction::Reset { request_id } => smallvec![start_resync(state, Some(request_id), env)],
            SlugAction::Add { request_id, slug } => smallvec![create(state, request_id, slug, env)],
            SlugAction::Update { record } => {
                if !state.replace(record.clone()) {
                    tracing::debug!(id = %record.id, "Update for unknown id, sending anyway");
                }
                smallvec![write_update(state.effective_owner(), record, env)]
            },
            SlugAction::Remove { id } => {
                if !state.remove(&id) {
                    tracing::debug!(%id, "Remove for unknown id, sending anyway");
                }
                smallvec![write_delete(state.effective_owner(), id, env)]
            },

            SlugAction::SlugsLoaded {
                owner,
                generation,
                slugs,
                ..
            } => {
                state.pending_syncs = state.pending_syncs.saturating_sub(1);
                if owner == state.effective_owner() {
                    tracing::debug!(%owner, generation, count = slugs.len(), "Applying resync");
                    state.replace_all(slugs);
                    state.initialized = true;
                } else {
                    tracing::debug!(%owner, generation, "Discarding list for previous owner");
                }
                smallvec![Effect::None]
            },
            SlugAction::SyncFailed {
                owner,
                generation,
                error,
                ..
            } => {
                state.pending_syncs = state.pending_syncs.saturating_sub(1);
                tracing::warn!(%owner, generation, kind = error.kind(), %error, "Resync failed, keeping snapshot");
                metrics::counter!("registry.resync.failed").increment(1);
                smallvec![Effect::None]
            },
            SlugAction::SlugCreated {
                request_id,
                owner,
                record,
            } => {
                if owner == state.effective_owner() {
                    tracing::debug!(request_id, id = %record.id, "Slug confirmed");
                    state.upsert(record);
                } else {
                    tracing::debug!(request_id, %owner, "Created slug belongs to previous owner");
                }
                smallvec![Effect::None]
            },
            SlugAction::CreateFailed { request_id, error } => {
                tracing::warn!(request_id, kind = error.kind(), %error, "Create failed");
                smallvec![Effect::None]
            },
            SlugAction::MutationFailed {
                operation,
                id,
                owner,
                error,
            } => {
                tracing::warn!(
                    operation = operation.as_str(),
                    %id,
                    %owner,
                    kind = error.kind(),
                    %error,
                    "Background write failed"
                );
                if owner == state.effective_owner() {
                    metrics::counter!("registry.reconcile.scheduled").increment(1);
                    smallvec![start_resync(state, None, env)]
                } else {
                    smallvec![Effect::None]
                }
            },
        }
    }
}

fn session_changed(state: &mut SlugState, identity: Option<UserIdentity>, env: &SlugEnvironment) -> Effects {
    match identity {
        Some(user) if state.owner.as_ref() == Some(&user.uid) => {
            tracing::trace!(owner = %user.uid, "Session repeated current identity");
            smallvec![Effect::None]
        },
        Some(user) => {
            tracing::info!(owner = %user.uid, "Session owner changed, resyncing");
            state.owner = Some(user.uid);
            state.clear();
            state.initialized = false;
            smallvec![start_resync(state, None, env)]
        },
        None if state.owner.is_some() => {
            tracing::info!("Signed out, clearing slugs");
            state.owner = None;
            state.clear();
            state.initialized = true;
            smallvec![Effect::None]
        },
        None => smallvec![Effect::None],
    }
}

fn start_resync(state: &mut SlugState, request_id: Option<u64>, env: &SlugEnvironment) -> Effect<SlugAction> {
    state.sync_generation += 1;
    state.pending_syncs += 1;
    metrics::counter!("registry.resync.total").increment(1);

    let owner = state.effective_owner();
    let generation = state.sync_generation;
    let api = Arc::clone(&env.api);
    tracing::debug!(%owner, generation, "Starting resync");

    Effect::future(async move {
        Some(match api.list(owner.clone()).await {
            Ok(slugs) => SlugAction::SlugsLoaded {
                owner,
                generation,
                request_id,
                slugs,
            },
            Err(error) => SlugAction::SyncFailed {
                owner,
                generation,
                request_id,
                error,
            },
        })
    })
}

fn create(state: &SlugState, request_id: u64, slug: NewSlug, env: &SlugEnvironment) -> Effect<SlugAction> {
    let owner = state.effective_owner();
    let api = Arc::clone(&env.api);

    Effect::future(async move {
        Some(match api.create(owner.clone(), slug).await {
            Ok(record) => SlugAction::SlugCreated {
                request_id,
                owner,
                record,
            },
            Err(error) => SlugAction::CreateFailed { request_id, error },
        })
    })
}

fn write_update(owner: OwnerId, record: SlugRecord, env: &SlugEnvironment) -> Effect<SlugAction> {
    let api = Arc::clone(&env.api);
    let id = record.id.clone();

    Effect::future(async move {
        api.update(owner.clone(), record)
            .await
            .err()
            .map(|error| SlugAction::MutationFailed {
                operation: Mutation::Update,
                id,
                owner,
                error,
            })
    })
}

fn write_delete(owner: OwnerId, id: SlugId, env: &SlugEnvironment) -> Effect<SlugAction> {
    let api = Arc::clone(&env.api);

    Effect::future(async move {
        api.delete(owner.clone(), id.clone())
            .await
            .err()
            .map(|error| SlugAction::MutationFailed {
                operation: Mutation::Delete,
                id,
                owner,
                error,
            })
    })
}
