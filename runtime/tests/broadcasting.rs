//! Integration tests for Store action broadcasting
//!
//! Action observation lets tests and renderers wait for the feedback
//! produced by effects without polling state.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::Arc;
use std::time::Duration;
use taskboard_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use taskboard_runtime::{Store, StoreConfig, StoreError};
use tokio::sync::Mutex;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum SyncAction {
    /// Push a batch of tasks to the remote in three pages
    StartSync { batch: u64 },
    /// One page was uploaded
    PageUploaded { batch: u64, page: u32 },
    /// Batch finished (terminal action)
    SyncFinished { batch: u64 },
    /// Batch failed (terminal action, never produced here)
    SyncFailed { batch: u64, error: String },
    /// Simple command with a single feedback event
    Touch,
    /// Feedback for `Touch`
    Touched { count: u32 },
}

#[derive(Debug, Clone, Default)]
struct SyncState {
    touches: u32,
    pages: Vec<u32>,
}

#[derive(Clone)]
struct SyncEnvironment;

#[derive(Clone)]
struct SyncReducer;

impl Reducer for SyncReducer {
    type State = SyncState;
    type Action = SyncAction;
    type Environment = SyncEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SyncAction::StartSync { batch } => smallvec![Effect::Future(Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Some(SyncAction::PageUploaded { batch, page: 1 })
            }))],
            SyncAction::PageUploaded { batch, page } => {
                state.pages.push(page);
                if page < 3 {
                    smallvec![Effect::Future(Box::pin(async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Some(SyncAction::PageUploaded { batch, page: page + 1 })
                    }))]
                } else {
                    smallvec![Effect::Future(Box::pin(async move {
                        Some(SyncAction::SyncFinished { batch })
                    }))]
                }
            },
            SyncAction::SyncFinished { .. } | SyncAction::SyncFailed { .. } => {
                smallvec![Effect::None]
            },
            SyncAction::Touch => {
                state.touches += 1;
                let count = state.touches;
                smallvec![Effect::Future(Box::pin(async move {
                    Some(SyncAction::Touched { count })
                }))]
            },
            SyncAction::Touched { .. } => smallvec![Effect::None],
        }
    }
}

fn store() -> Store<SyncState, SyncAction, SyncEnvironment, SyncReducer> {
    Store::new(SyncState::default(), SyncReducer, SyncEnvironment)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn send_and_wait_for_immediate_feedback() {
    let store = store();

    let result = store
        .send_and_wait_for(
            SyncAction::Touch,
            |action| matches!(action, SyncAction::Touched { .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(result, SyncAction::Touched { count: 1 });
}

#[tokio::test]
async fn send_and_wait_for_multi_step_feedback() {
    let store = store();

    let result = store
        .send_and_wait_for(
            SyncAction::StartSync { batch: 42 },
            |action| matches!(action, SyncAction::SyncFinished { batch: 42 }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(result, SyncAction::SyncFinished { batch: 42 });
    assert_eq!(store.state(|s| s.pages.clone()).await, vec![1, 2, 3]);
}

#[tokio::test]
async fn send_and_wait_for_times_out_when_nothing_matches() {
    let store = store();

    let result = store
        .send_and_wait_for(
            SyncAction::StartSync { batch: 99 },
            |action| matches!(action, SyncAction::SyncFailed { batch: 99, .. }),
            Duration::from_millis(50),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Timeout)));
}

#[tokio::test]
async fn concurrent_waiters_get_their_own_terminal_action() {
    let store = Arc::new(store());
    let mut handles = vec![];

    for batch in 1..=5 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .send_and_wait_for(
                    SyncAction::StartSync { batch },
                    move |action| {
                        matches!(action, SyncAction::SyncFinished { batch: done } if *done == batch)
                    },
                    Duration::from_secs(2),
                )
                .await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.expect("Task panicked");
        assert!(result.is_ok(), "Batch {} should finish", i + 1);
    }

    assert_eq!(store.state(|s| s.pages.len()).await, 15);
}

#[tokio::test]
async fn subscribe_actions_sees_feedback_in_order() {
    let store = store();
    let mut rx = store.subscribe_actions();

    let received = Arc::new(Mutex::new(Vec::new()));
    let collector = {
        let received = Arc::clone(&received);
        tokio::spawn(async move {
            // PageUploaded 1..=3, then SyncFinished
            for _ in 0..4 {
                if let Ok(action) = rx.recv().await {
                    received.lock().await.push(action);
                }
            }
        })
    };

    store.send(SyncAction::StartSync { batch: 7 }).await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), collector)
        .await
        .unwrap()
        .unwrap();

    let actions = received.lock().await;
    assert_eq!(
        *actions,
        vec![
            SyncAction::PageUploaded { batch: 7, page: 1 },
            SyncAction::PageUploaded { batch: 7, page: 2 },
            SyncAction::PageUploaded { batch: 7, page: 3 },
            SyncAction::SyncFinished { batch: 7 },
        ]
    );
}

#[tokio::test]
async fn directly_sent_actions_are_not_broadcast() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store.send(SyncAction::Touched { count: 0 }).await.unwrap();

    assert!(matches!(
        rx.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn lagging_subscriber_skips_but_keeps_receiving() {
    let store = Store::with_config(
        SyncState::default(),
        SyncReducer,
        SyncEnvironment,
        StoreConfig::default().with_broadcast_capacity(4),
    );

    let mut rx = store.subscribe_actions();

    for _ in 0..20 {
        let mut handle = store.send(SyncAction::Touch).await.unwrap();
        handle.wait().await;
    }

    let mut received = 0;
    let mut lagged = false;
    loop {
        match rx.try_recv() {
            Ok(_) => received += 1,
            Err(tokio::sync::broadcast::error::TryRecvError::Lagged(_)) => lagged = true,
            Err(_) => break,
        }
    }

    assert!(lagged, "Expected subscriber to lag");
    assert!(received > 0 && received < 20);
    assert_eq!(store.state(|s| s.touches).await, 20);
}
