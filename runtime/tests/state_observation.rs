//! Integration tests for state publication
//!
//! Every applied action publishes a full snapshot to the store's `watch`
//! channel. New subscribers see the latest snapshot immediately.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::time::Duration;
use taskboard_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use taskboard_runtime::{Store, StoreError};

#[derive(Debug, Clone, Default, PartialEq)]
struct ListState {
    entries: Vec<u32>,
    is_loading: bool,
}

#[derive(Debug, Clone)]
enum ListAction {
    Append(u32),
    Load,
    Loaded(Vec<u32>),
}

#[derive(Clone)]
struct ListReducer;

impl Reducer for ListReducer {
    type State = ListState;
    type Action = ListAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ListAction::Append(value) => {
                state.entries.push(value);
                SmallVec::new()
            },
            ListAction::Load => {
                state.is_loading = true;
                smallvec![Effect::Future(Box::pin(async {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Some(ListAction::Loaded(vec![7, 8, 9]))
                }))]
            },
            ListAction::Loaded(entries) => {
                state.is_loading = false;
                state.entries = entries;
                SmallVec::new()
            },
        }
    }
}

fn store() -> Store<ListState, ListAction, (), ListReducer> {
    Store::new(ListState::default(), ListReducer, ())
}

#[tokio::test]
async fn new_subscriber_sees_initial_state() {
    let store = store();

    let states = store.subscribe_state();

    assert_eq!(*states.borrow(), ListState::default());
}

#[tokio::test]
async fn new_subscriber_sees_latest_state_without_waiting() {
    let store = store();
    store.send(ListAction::Append(1)).await.unwrap();
    store.send(ListAction::Append(2)).await.unwrap();

    let states = store.subscribe_state();

    assert_eq!(states.borrow().entries, vec![1, 2]);
    assert_eq!(store.current_state().entries, vec![1, 2]);
}

#[tokio::test]
async fn subscriber_is_notified_of_each_send() {
    let store = store();
    let mut states = store.subscribe_state();

    store.send(ListAction::Append(5)).await.unwrap();

    states.changed().await.unwrap();
    assert_eq!(states.borrow_and_update().entries, vec![5]);
}

#[tokio::test]
async fn loading_flag_is_published_before_feedback() -> Result<(), StoreError> {
    let store = store();
    let mut states = store.subscribe_state();

    let mut handle = store.send(ListAction::Load).await?;
    assert!(states.borrow_and_update().is_loading);

    handle.wait_with_timeout(Duration::from_secs(1)).await?;

    let latest = states.borrow_and_update().clone();
    assert!(!latest.is_loading);
    assert_eq!(latest.entries, vec![7, 8, 9]);
    Ok(())
}

#[tokio::test]
async fn concurrent_sends_are_all_applied() {
    let store = store();

    let handles: Vec<_> = (0..50)
        .map(|value| {
            let store = store.clone();
            tokio::spawn(async move { store.send(ListAction::Append(value)).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut entries = store.current_state().entries;
    entries.sort_unstable();
    assert_eq!(entries, (0..50).collect::<Vec<_>>());
}

#[tokio::test]
async fn published_snapshots_follow_application_order() {
    let store = store();
    let mut states = store.subscribe_state();

    let observer = tokio::spawn(async move {
        let mut lengths = Vec::new();
        while states.changed().await.is_ok() {
            let len = states.borrow_and_update().entries.len();
            lengths.push(len);
            if len == 20 {
                break;
            }
        }
        lengths
    });

    for value in 0..20 {
        store.send(ListAction::Append(value)).await.unwrap();
    }

    let lengths = tokio::time::timeout(Duration::from_secs(1), observer)
        .await
        .unwrap()
        .unwrap();

    // Observers may skip snapshots but never see an older one after a newer one
    assert!(lengths.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(lengths.last(), Some(&20));
}
