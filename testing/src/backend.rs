//! In-memory slug backend for fast, deterministic tests
//!
//! [`InMemorySlugApi`] implements [`SlugApi`] against a `Vec` of records and
//! records every call it receives. Tests can additionally:
//!
//! - inject a failure per operation ([`InMemorySlugApi::fail`])
//! - hold an operation at a gate until released ([`InMemorySlugApi::hold`]),
//!   to force interleavings between in-flight requests and local mutations

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned lock

use slug_registry_core::{ApiError, ApiFuture, NewSlug, OwnerId, SlugApi, SlugId, SlugRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// One of the five backend operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// `list`
    List,
    /// `create`
    Create,
    /// `update`
    Update,
    /// `delete`
    Delete,
    /// `resolve`
    Resolve,
}

impl ApiOperation {
    const ALL: [Self; 5] = [Self::List, Self::Create, Self::Update, Self::Delete, Self::Resolve];
}

/// A call received by the backend, with its arguments
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    /// `list(owner)`
    List {
        /// Requested owner
        owner: OwnerId,
    },
    /// `create(owner, slug)`
    Create {
        /// Owner the record is created for
        owner: OwnerId,
        /// Submitted slug
        slug: NewSlug,
    },
    /// `update(owner, record)`
    Update {
        /// Owner sent with the update
        owner: OwnerId,
        /// Submitted record
        record: SlugRecord,
    },
    /// `delete(owner, id)`
    Delete {
        /// Owner sent with the delete
        owner: OwnerId,
        /// Id to delete
        id: SlugId,
    },
    /// `resolve(slug)`
    Resolve {
        /// Looked-up slug
        slug: String,
    },
}

impl ApiCall {
    /// The operation this call invoked
    #[must_use]
    pub const fn operation(&self) -> ApiOperation {
        match self {
            Self::List { .. } => ApiOperation::List,
            Self::Create { .. } => ApiOperation::Create,
            Self::Update { .. } => ApiOperation::Update,
            Self::Delete { .. } => ApiOperation::Delete,
            Self::Resolve { .. } => ApiOperation::Resolve,
        }
    }
}

#[derive(Debug, Default)]
struct Backend {
    /// Records in insertion order, tagged with their owner
    records: Vec<(OwnerId, SlugRecord)>,
    next_id: u64,
    calls: Vec<ApiCall>,
    failures: HashMap<ApiOperation, ApiError>,
}

impl Backend {
    fn assign_id(&mut self) -> SlugId {
        self.next_id += 1;
        SlugId::new(self.next_id.to_string())
    }
}

/// In-memory [`SlugApi`] implementation
///
/// Clones share the same backend, so a test can keep a handle while the
/// registry owns another.
///
/// # Example
///
/// ```
/// use slug_registry_testing::InMemorySlugApi;
/// use slug_registry_core::{OwnerId, SlugApi};
///
/// # tokio_test::block_on(async {
/// let api = InMemorySlugApi::new();
/// api.seed(&OwnerId::new("alice"), "docs", "https://docs.rs");
///
/// let slugs = api.list(OwnerId::new("alice")).await.unwrap();
/// assert_eq!(slugs.len(), 1);
/// assert_eq!(slugs[0].id.as_str(), "1");
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct InMemorySlugApi {
    backend: Arc<Mutex<Backend>>,
    gates: Arc<HashMap<ApiOperation, watch::Sender<bool>>>,
}

impl InMemorySlugApi {
    /// Create an empty backend with every operation open
    #[must_use]
    pub fn new() -> Self {
        let gates = ApiOperation::ALL
            .into_iter()
            .map(|op| (op, watch::channel(true).0))
            .collect();

        Self {
            backend: Arc::new(Mutex::new(Backend::default())),
            gates: Arc::new(gates),
        }
    }

    /// Store a record for `owner` directly, bypassing the call log
    pub fn seed(&self, owner: &OwnerId, slug: &str, redirect: &str) -> SlugRecord {
        let mut backend = self.backend.lock().unwrap();
        let record = NewSlug::new(slug, redirect).confirm(backend.assign_id());
        backend.records.push((owner.clone(), record.clone()));
        record
    }

    /// Records currently stored for `owner`, in insertion order
    #[must_use]
    pub fn records_for(&self, owner: &OwnerId) -> Vec<SlugRecord> {
        let backend = self.backend.lock().unwrap();
        backend
            .records
            .iter()
            .filter(|(o, _)| o == owner)
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Every call received so far, in arrival order
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.backend.lock().unwrap().calls.clone()
    }

    /// Number of calls received for `operation`
    #[must_use]
    pub fn call_count(&self, operation: ApiOperation) -> usize {
        self.backend
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Make every subsequent `operation` fail with `error`
    pub fn fail(&self, operation: ApiOperation, error: ApiError) {
        self.backend.lock().unwrap().failures.insert(operation, error);
    }

    /// Undo [`InMemorySlugApi::fail`]
    pub fn recover(&self, operation: ApiOperation) {
        self.backend.lock().unwrap().failures.remove(&operation);
    }

    /// Block `operation` after it has been recorded, until released
    ///
    /// Failures and results are evaluated after the gate opens.
    pub fn hold(&self, operation: ApiOperation) {
        self.gate(operation).send_replace(false);
    }

    /// Let held and future `operation` calls proceed
    pub fn release(&self, operation: ApiOperation) {
        self.gate(operation).send_replace(true);
    }

    fn gate(&self, operation: ApiOperation) -> &watch::Sender<bool> {
        // Every operation gets a gate in `new`.
        &self.gates[&operation]
    }

    /// Record `call`, wait at its gate, then return any injected failure.
    async fn enter(&self, call: ApiCall) -> Result<(), ApiError> {
        let operation = call.operation();
        self.backend.lock().unwrap().calls.push(call);

        let mut open = self.gate(operation).subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        let _ = open.wait_for(|open| *open).await;

        match self.backend.lock().unwrap().failures.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Default for InMemorySlugApi {
    fn default() -> Self {
        Self::new()
    }
}

impl SlugApi for InMemorySlugApi {
    fn list(&self, owner: OwnerId) -> ApiFuture<'_, Vec<SlugRecord>> {
        Box::pin(async move {
            self.enter(ApiCall::List { owner: owner.clone() }).await?;
            Ok(self.records_for(&owner))
        })
    }

    fn create(&self, owner: OwnerId, slug: NewSlug) -> ApiFuture<'_, SlugRecord> {
        Box::pin(async move {
            self.enter(ApiCall::Create {
                owner: owner.clone(),
                slug: slug.clone(),
            })
            .await?;

            let mut backend = self.backend.lock().unwrap();
            let record = slug.confirm(backend.assign_id());
            backend.records.push((owner, record.clone()));
            Ok(record)
        })
    }

    fn update(&self, owner: OwnerId, record: SlugRecord) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            self.enter(ApiCall::Update {
                owner: owner.clone(),
                record: record.clone(),
            })
            .await?;

            // Unmatched ids are acknowledged without effect.
            let mut backend = self.backend.lock().unwrap();
            if let Some((_, stored)) = backend
                .records
                .iter_mut()
                .find(|(o, r)| *o == owner && r.id == record.id)
            {
                *stored = record;
            }
            Ok(())
        })
    }

    fn delete(&self, owner: OwnerId, id: SlugId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            self.enter(ApiCall::Delete {
                owner: owner.clone(),
                id: id.clone(),
            })
            .await?;

            self.backend
                .lock()
                .unwrap()
                .records
                .retain(|(o, r)| !(*o == owner && r.id == id));
            Ok(())
        })
    }

    fn resolve(&self, slug: String) -> ApiFuture<'_, String> {
        Box::pin(async move {
            self.enter(ApiCall::Resolve { slug: slug.clone() }).await?;

            // Duplicate slugs across owners: the most recently stored wins.
            let backend = self.backend.lock().unwrap();
            backend
                .records
                .iter()
                .rev()
                .find(|(_, r)| r.slug == slug)
                .map(|(_, r)| r.redirect.clone())
                .ok_or(ApiError::NotFound(slug))
        })
    }
}
