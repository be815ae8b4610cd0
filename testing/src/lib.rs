//! # Taskboard Testing
//!
//! Testing utilities and helpers for Taskboard.
//!
//! This crate provides:
//! - In-memory implementations of the data-source traits
//! - Task fixtures and property-based strategies
//! - A Given-When-Then harness for reducers
//! - A store-free effect runner for inspecting feedback actions
//!
//! ## Example
//!
//! ```ignore
//! use taskboard_testing::{ReducerTest, effects::collect_actions};
//!
//! #[tokio::test]
//! async fn refresh_reloads_tasks() {
//!     let env = test_environment();
//!     let mut state = TasksState::default();
//!
//!     let effects = TasksReducer.reduce(&mut state, TasksAction::Refresh, &env);
//!     let feedback = collect_actions(effects).await;
//!
//!     assert!(matches!(feedback[0], TasksAction::RefreshFinished { .. }));
//! }
//! ```

pub mod mocks;

/// Task fixtures shared by crate tests.
pub mod fixtures {
    use taskboard_core::task::{Task, TaskId};

    /// Active task whose title and description derive from `id`
    #[must_use]
    pub fn task(id: &str) -> Task {
        Task::new(TaskId::new(id), format!("Title {id}"), format!("Description {id}"))
    }

    /// Completed task whose title and description derive from `id`
    #[must_use]
    pub fn completed_task(id: &str) -> Task {
        task(id).completed(true)
    }

    /// `active` active tasks followed by `completed` completed ones
    #[must_use]
    pub fn mixed_tasks(active: usize, completed: usize) -> Vec<Task> {
        (0..active)
            .map(|i| task(&format!("active-{i}")))
            .chain((0..completed).map(|i| completed_task(&format!("done-{i}"))))
            .collect()
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;
    use taskboard_core::task::{Task, TaskId};

    /// Arbitrary task with a short alphanumeric id
    pub fn arb_task() -> impl Strategy<Value = Task> {
        ("[a-z0-9]{1,12}", ".{0,24}", ".{0,48}", any::<bool>()).prop_map(
            |(id, title, description, completed)| {
                Task::new(TaskId::new(id), title, description).completed(completed)
            },
        )
    }

    /// Up to `max` tasks with unique ids
    pub fn arb_tasks(max: usize) -> impl Strategy<Value = Vec<Task>> {
        proptest::collection::vec(arb_task(), 0..=max).prop_map(|tasks| {
            tasks
                .into_iter()
                .enumerate()
                .map(|(i, mut task)| {
                    task.id = TaskId::new(format!("{i}-{}", task.id));
                    task
                })
                .collect()
        })
    }
}

/// Store-free effect execution.
///
/// Reducer tests usually stop at "which effects came back". When the
/// interesting part is the feedback action an effect produces, these helpers
/// drive the effect to completion without a `Store`.
pub mod effects {
    use futures::StreamExt;
    use futures::future::BoxFuture;
    use taskboard_core::effect::Effect;

    /// Runs every effect and returns the actions they feed back, in order.
    ///
    /// - `Delay` yields its action immediately (no sleeping)
    /// - `Parallel` children are run one after another
    /// - `Stream` contributes only its first item, since subscriptions may
    ///   never end
    pub async fn collect_actions<A, I>(effects: I) -> Vec<A>
    where
        A: Send + 'static,
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut actions = Vec::new();
        for effect in effects {
            run_effect(effect, &mut actions).await;
        }
        actions
    }

    fn run_effect<A: Send + 'static>(effect: Effect<A>, actions: &mut Vec<A>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            match effect {
                Effect::None => {},
                Effect::Parallel(children) | Effect::Sequential(children) => {
                    for child in children {
                        run_effect(child, actions).await;
                    }
                },
                Effect::Delay { action, .. } => actions.push(*action),
                Effect::Future(future) => {
                    if let Some(action) = future.await {
                        actions.push(action);
                    }
                },
                Effect::Stream(mut stream) => {
                    if let Some(action) = stream.next().await {
                        actions.push(action);
                    }
                },
            }
        })
    }
}

// Re-export commonly used items
pub use mocks::{FakeNetworkDataSource, InMemoryTaskStore, SequentialIdGenerator};
pub use reducer_test::{ReducerTest, assertions};
