//! Integration tests for Store action broadcasting
//!
//! Covers the request/response pattern built on `send_and_wait_for`:
//! correlation of concurrent requests, visibility of the reduced state when
//! the answer arrives, and which actions are published at all.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use slug_registry_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use slug_registry_runtime::{Store, StoreError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Action {
    /// Ask for a confirmation after `delay_ms`
    Request { id: u64, delay_ms: u64 },
    /// Answer to `Request`
    Confirmed { id: u64 },
    /// Answer that is never produced for odd ids
    Rejected { id: u64 },
    /// Local change with no effect
    Touch,
}

#[derive(Debug, Default)]
struct Ledger {
    confirmed: Vec<u64>,
    touches: u32,
}

struct Env;

struct LedgerReducer;

impl Reducer for LedgerReducer {
    type State = Ledger;
    type Action = Action;
    type Environment = Env;

    fn reduce(&self, state: &mut Ledger, action: Action, _env: &Env) -> SmallVec<[Effect<Action>; 4]> {
        match action {
            Action::Request { id, delay_ms } => smallvec![Effect::future(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Some(if id % 2 == 0 {
                    Action::Confirmed { id }
                } else {
                    Action::Rejected { id }
                })
            })],
            Action::Confirmed { id } => {
                state.confirmed.push(id);
                smallvec![Effect::None]
            },
            Action::Rejected { .. } => smallvec![Effect::None],
            Action::Touch => {
                state.touches += 1;
                smallvec![Effect::None]
            },
        }
    }
}

fn store() -> Store<Ledger, Action, Env, LedgerReducer> {
    Store::new(Ledger::default(), LedgerReducer, Env)
}

fn answers(id: u64) -> impl Fn(&Action) -> bool {
    move |action| matches!(action, Action::Confirmed { id: i } | Action::Rejected { id: i } if *i == id)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn answer_is_reduced_before_it_is_observed() {
    let store = store();

    let answer = store
        .send_and_wait_for(Action::Request { id: 2, delay_ms: 5 }, answers(2), Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(answer, Action::Confirmed { id: 2 });
    assert_eq!(store.state(|s| s.confirmed.clone()).await, vec![2]);
}

#[tokio::test]
async fn concurrent_requests_get_their_own_answers() {
    let store = store();

    // The slower request is sent first; each caller must still get its own answer.
    let slow = {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .send_and_wait_for(Action::Request { id: 4, delay_ms: 40 }, answers(4), Duration::from_secs(1))
                .await
        })
    };
    let fast = {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .send_and_wait_for(Action::Request { id: 3, delay_ms: 5 }, answers(3), Duration::from_secs(1))
                .await
        })
    };

    assert_eq!(fast.await.unwrap(), Ok(Action::Rejected { id: 3 }));
    assert_eq!(slow.await.unwrap(), Ok(Action::Confirmed { id: 4 }));
}

#[tokio::test]
async fn initial_actions_are_not_broadcast() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store.send(Action::Touch).await.unwrap();

    assert!(rx.try_recv().is_err());
    assert_eq!(store.state(|s| s.touches).await, 1);
}

#[tokio::test]
async fn unmatched_predicate_times_out() {
    let store = store();

    let result = store
        .send_and_wait_for(Action::Request { id: 6, delay_ms: 0 }, answers(7), Duration::from_millis(30))
        .await;

    assert_eq!(result, Err(StoreError::Timeout));
    // The effect still ran and was reduced.
    store.settled().await;
    assert_eq!(store.state(|s| s.confirmed.clone()).await, vec![6]);
}

#[tokio::test]
async fn listeners_run_before_answer_is_broadcast() {
    let store = store();
    let order = Arc::new(Mutex::new(Vec::new()));

    let _subscription = {
        let order = Arc::clone(&order);
        store
            .subscribe(move |s: &Ledger| order.lock().unwrap().push(format!("state:{}", s.confirmed.len())))
            .await
    };

    let mut rx = store.subscribe_actions();
    store.send(Action::Request { id: 8, delay_ms: 0 }).await.unwrap();
    let broadcast = rx.recv().await.unwrap();
    order.lock().unwrap().push(format!("broadcast:{broadcast:?}"));

    assert_eq!(
        *order.lock().unwrap(),
        vec![
            "state:0".to_string(),
            "state:0".to_string(),
            "state:1".to_string(),
            "broadcast:Confirmed { id: 8 }".to_string(),
        ]
    );
}

#[tokio::test]
async fn shutdown_waits_for_in_flight_effects() {
    let store = store();
    store.send(Action::Request { id: 10, delay_ms: 20 }).await.unwrap();
    assert_eq!(store.pending_effects(), 1);

    store.shutdown(Duration::from_secs(1)).await.unwrap();

    assert_eq!(store.pending_effects(), 0);
    assert_eq!(
        store.send(Action::Touch).await,
        Err(StoreError::ShutdownInProgress)
    );
}

#[tokio::test]
async fn shutdown_times_out_on_slow_effect() {
    let store = store();
    store.send(Action::Request { id: 12, delay_ms: 500 }).await.unwrap();

    let result = store.shutdown(Duration::from_millis(20)).await;

    assert_eq!(result, Err(StoreError::ShutdownTimeout(1)));
}
