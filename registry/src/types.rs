//! State and actions of the slug store.

use slug_registry_core::{ApiError, NewSlug, OwnerId, SlugId, SlugRecord, UserIdentity};

/// Where the snapshot stands relative to the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPhase {
    /// No list has been loaded yet
    Uninitialized,
    /// At least one resync is in flight
    Syncing,
    /// The snapshot reflects the last completed resync plus local mutations
    Ready,
}

/// Snapshot of the signed-in user's slugs
///
/// Mutated only by [`SlugReducer`](crate::SlugReducer) while the store's
/// write lock is held.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlugState {
    /// Identity last reported by the session, `None` when nobody is signed in
    pub owner: Option<OwnerId>,
    /// Records in arrival order; ids are pairwise unique
    pub slugs: Vec<SlugRecord>,
    /// Bumped on every change to `slugs`
    pub revision: u64,
    /// Resyncs issued but not yet answered
    pub pending_syncs: usize,
    /// Set once a list has been applied (or the snapshot is known empty)
    pub initialized: bool,
    /// Number of resyncs issued so far
    pub sync_generation: u64,
}

impl SlugState {
    /// Current synchronization phase
    #[must_use]
    pub const fn phase(&self) -> SyncPhase {
        if self.pending_syncs > 0 {
            SyncPhase::Syncing
        } else if self.initialized {
            SyncPhase::Ready
        } else {
            SyncPhase::Uninitialized
        }
    }

    /// Owner the backend is addressed as: the signed-in user or the sentinel
    #[must_use]
    pub fn effective_owner(&self) -> OwnerId {
        OwnerId::or_anonymous(self.owner.as_ref())
    }

    /// Replace the snapshot wholesale, keeping the first record per id
    pub(crate) fn replace_all(&mut self, incoming: Vec<SlugRecord>) {
        let mut slugs: Vec<SlugRecord> = Vec::with_capacity(incoming.len());
        for record in incoming {
            if slugs.iter().any(|r| r.id == record.id) {
                tracing::warn!(id = %record.id, "Dropping duplicate id from backend list");
                continue;
            }
            slugs.push(record);
        }
        self.slugs = slugs;
        self.revision += 1;
    }

    pub(crate) fn clear(&mut self) {
        if !self.slugs.is_empty() {
            self.slugs.clear();
            self.revision += 1;
        }
    }

    /// Append a confirmed record; an already known id is replaced in place.
    pub(crate) fn upsert(&mut self, record: SlugRecord) {
        match self.slugs.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.slugs.push(record),
        }
        self.revision += 1;
    }

    /// Returns `false` if no record has `record.id`.
    pub(crate) fn replace(&mut self, record: SlugRecord) -> bool {
        let Some(existing) = self.slugs.iter_mut().find(|r| r.id == record.id) else {
            return false;
        };
        if *existing != record {
            *existing = record;
            self.revision += 1;
        }
        true
    }

    /// Returns `false` if no record has `id`.
    pub(crate) fn remove(&mut self, id: &SlugId) -> bool {
        let before = self.slugs.len();
        self.slugs.retain(|r| &r.id != id);
        let removed = self.slugs.len() != before;
        if removed {
            self.revision += 1;
        }
        removed
    }
}

/// Background write that can fail after being applied locally
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// `update`
    Update,
    /// `delete`
    Delete,
}

impl Mutation {
    /// Label for logs and metrics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Everything the slug store reacts to
///
/// Commands come from the registry facade and the session watcher; the
/// remaining variants are produced by effects when backend calls complete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlugAction {
    // Commands
    /// The session reported an identity (possibly the same one again)
    SessionChanged {
        /// New identity, `None` after sign-out
        identity: Option<UserIdentity>,
    },
    /// Reload the full list for the current owner
    Reset {
        /// Echoed back in the resulting `SlugsLoaded` or `SyncFailed`
        request_id: u64,
    },
    /// Create a slug on the backend
    Add {
        /// Correlates the answer with the caller
        request_id: u64,
        /// Slug to create
        slug: NewSlug,
    },
    /// Replace a record locally and on the backend
    Update {
        /// New contents; matched by id
        record: SlugRecord,
    },
    /// Remove a record locally and on the backend
    Remove {
        /// Id to remove
        id: SlugId,
    },

    // Backend results
    /// A resync returned a list
    SlugsLoaded {
        /// Owner the list was requested for
        owner: OwnerId,
        /// Generation of the resync that produced it
        generation: u64,
        /// Correlation id of the `Reset` that asked for it, if any
        request_id: Option<u64>,
        /// Records in backend order
        slugs: Vec<SlugRecord>,
    },
    /// A resync failed
    SyncFailed {
        /// Owner the list was requested for
        owner: OwnerId,
        /// Generation of the failed resync
        generation: u64,
        /// Correlation id of the `Reset` that asked for it, if any
        request_id: Option<u64>,
        /// Cause
        error: ApiError,
    },
    /// The backend confirmed a create
    SlugCreated {
        /// Correlation id from [`SlugAction::Add`]
        request_id: u64,
        /// Owner the record was created for
        owner: OwnerId,
        /// Authoritative record
        record: SlugRecord,
    },
    /// The backend refused or never answered a create
    CreateFailed {
        /// Correlation id from [`SlugAction::Add`]
        request_id: u64,
        /// Cause
        error: ApiError,
    },
    /// A background update or delete failed
    MutationFailed {
        /// Which write failed
        operation: Mutation,
        /// Record the write targeted
        id: SlugId,
        /// Owner the write was sent for
        owner: OwnerId,
        /// Cause
        error: ApiError,
    },
}

impl SlugAction {
    /// Returns `true` for the answer to the `Add` with `request_id`
    #[must_use]
    pub const fn answers_create(&self, request_id: u64) -> bool {
        match self {
            Self::SlugCreated { request_id: id, .. } | Self::CreateFailed { request_id: id, .. } => {
                *id == request_id
            },
            _ => false,
        }
    }

    /// Returns `true` for the answer to the `Reset` with `request_id`
    ///
    /// Resyncs started by the session or by a failed write carry no
    /// correlation id and never match.
    #[must_use]
    pub const fn answers_reset(&self, request_id: u64) -> bool {
        match self {
            Self::SlugsLoaded { request_id: Some(id), .. } | Self::SyncFailed { request_id: Some(id), .. } => {
                *id == request_id
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, redirect: &str) -> SlugRecord {
        SlugRecord::new(id, format!("s{id}"), redirect)
    }

    #[test]
    fn phase_follows_pending_and_initialized() {
        let mut state = SlugState::default();
        assert_eq!(state.phase(), SyncPhase::Uninitialized);

        state.pending_syncs = 1;
        assert_eq!(state.phase(), SyncPhase::Syncing);

        state.pending_syncs = 0;
        state.initialized = true;
        assert_eq!(state.phase(), SyncPhase::Ready);
    }

    #[test]
    fn effective_owner_defaults_to_sentinel() {
        let mut state = SlugState::default();
        assert!(state.effective_owner().is_anonymous());

        state.owner = Some(OwnerId::new("alice"));
        assert_eq!(state.effective_owner().as_str(), "alice");
    }

    #[test]
    fn replace_all_keeps_first_of_duplicate_ids() {
        let mut state = SlugState::default();
        state.replace_all(vec![record("1", "/a"), record("2", "/b"), record("1", "/c")]);

        assert_eq!(state.slugs, vec![record("1", "/a"), record("2", "/b")]);
        assert_eq!(state.revision, 1);
    }

    #[test]
    fn unchanged_replace_keeps_revision() {
        let mut state = SlugState::default();
        state.replace_all(vec![record("1", "/a")]);

        assert!(state.replace(record("1", "/a")));
        assert_eq!(state.revision, 1);

        assert!(state.replace(record("1", "/b")));
        assert_eq!(state.revision, 2);

        assert!(!state.replace(record("9", "/z")));
        assert!(!state.remove(&SlugId::new("9")));
        assert_eq!(state.revision, 2);
    }

    #[test]
    fn upsert_replaces_known_id_in_place() {
        let mut state = SlugState::default();
        state.replace_all(vec![record("1", "/a"), record("2", "/b")]);
        state.upsert(record("1", "/new"));
        state.upsert(record("3", "/c"));

        let ids: Vec<&str> = state.slugs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(state.slugs[0].redirect, "/new");
    }

    #[test]
    fn clear_on_empty_is_not_a_change() {
        let mut state = SlugState::default();
        state.clear();
        assert_eq!(state.revision, 0);
    }

    #[test]
    fn answers_match_correlation() {
        let created = SlugAction::CreateFailed {
            request_id: 7,
            error: ApiError::TransportFailure("down".into()),
        };
        assert!(created.answers_create(7));
        assert!(!created.answers_create(8));
        assert!(!SlugAction::Reset { request_id: 7 }.answers_create(7));

        let loaded = SlugAction::SlugsLoaded {
            owner: OwnerId::anonymous(),
            generation: 3,
            request_id: Some(4),
            slugs: vec![],
        };
        assert!(loaded.answers_reset(4));
        assert!(!loaded.answers_reset(3));

        let reconciling = SlugAction::SyncFailed {
            owner: OwnerId::anonymous(),
            generation: 4,
            request_id: None,
            error: ApiError::TransportFailure("down".into()),
        };
        assert!(!reconciling.answers_reset(4));
    }
}
