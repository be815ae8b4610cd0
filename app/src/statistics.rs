//! Statistics screen: share of active and completed tasks.

use crate::environment::TodoEnvironment;
use std::sync::Arc;
use taskboard_core::{
    SmallVec, async_effect, effect::Effect, observe, reducer::Reducer, smallvec,
    task::active_and_completed_stats,
};
use taskboard_macros::Action;
use taskboard_repository::{RepositoryError, TasksSnapshot};
use tokio_stream::wrappers::WatchStream;

/// UI state of the statistics screen
#[derive(Clone, Debug, PartialEq)]
pub struct StatisticsState {
    /// Waiting for the first snapshot or a refresh
    pub is_loading: bool,
    /// There are no tasks
    pub is_empty: bool,
    /// Percentage of tasks still active
    pub active_tasks_percent: f32,
    /// Percentage of tasks completed
    pub completed_tasks_percent: f32,
    /// Why the last load failed, if it did
    pub load_error: Option<RepositoryError>,
    /// The repository subscription is running
    pub is_observing: bool,
}

impl Default for StatisticsState {
    fn default() -> Self {
        Self {
            is_loading: true,
            is_empty: true,
            active_tasks_percent: 0.0,
            completed_tasks_percent: 0.0,
            load_error: None,
            is_observing: false,
        }
    }
}

/// Actions of the statistics screen
#[derive(Action, Clone, Debug)]
pub enum StatisticsAction {
    /// Subscribe to the repository
    #[command]
    Start,

    /// Pull the remote copy
    #[command]
    Refresh,

    /// New repository snapshot
    #[event]
    TasksUpdated {
        /// All tasks or the read error
        result: TasksSnapshot,
    },

    /// A refresh finished
    #[event]
    RefreshFinished {
        /// Refresh outcome
        result: Result<(), RepositoryError>,
    },
}

/// Reducer for the statistics screen
#[derive(Clone, Copy, Debug, Default)]
pub struct StatisticsReducer;

impl Reducer for StatisticsReducer {
    type State = StatisticsState;
    type Action = StatisticsAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            StatisticsAction::Start => {
                if state.is_observing {
                    return SmallVec::new();
                }
                state.is_observing = true;
                state.is_loading = true;

                smallvec![observe! {
                    stream: WatchStream::new(env.repository.observe_tasks()),
                    map: |result| StatisticsAction::TasksUpdated { result }
                }]
            },

            StatisticsAction::Refresh => {
                state.is_loading = true;
                let repository = Arc::clone(&env.repository);
                smallvec![async_effect! {
                    let result = repository.refresh_tasks().await;
                    Some(StatisticsAction::RefreshFinished { result })
                }]
            },

            StatisticsAction::TasksUpdated { result: Ok(tasks) } => {
                let stats = active_and_completed_stats(&tasks);
                *state = StatisticsState {
                    is_loading: false,
                    is_empty: tasks.is_empty(),
                    active_tasks_percent: stats.active_tasks_percent,
                    completed_tasks_percent: stats.completed_tasks_percent,
                    load_error: None,
                    is_observing: state.is_observing,
                };
                SmallVec::new()
            },

            StatisticsAction::TasksUpdated { result: Err(error) } => {
                tracing::warn!(%error, "Loading statistics failed");
                *state = StatisticsState {
                    is_loading: false,
                    load_error: Some(error),
                    is_observing: state.is_observing,
                    ..StatisticsState::default()
                };
                SmallVec::new()
            },

            StatisticsAction::RefreshFinished { result } => {
                state.is_loading = false;
                if let Err(error) = result {
                    tracing::warn!(%error, "Refreshing statistics failed");
                    state.load_error = Some(error);
                }
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::data_source::DataSourceError;
    use taskboard_testing::{ReducerTest, assertions, fixtures};

    fn env() -> TodoEnvironment {
        crate::test_support::environment(Vec::new())
    }

    #[test]
    fn starts_loading_and_empty() {
        let state = StatisticsState::default();
        assert!(state.is_loading);
        assert!(state.is_empty);
    }

    #[test]
    fn start_subscribes_once() {
        ReducerTest::new(StatisticsReducer)
            .with_env(env())
            .given_state(StatisticsState::default())
            .when_action(StatisticsAction::Start)
            .then_effects(assertions::assert_has_stream_effect)
            .run();

        ReducerTest::new(StatisticsReducer)
            .with_env(env())
            .given_state(StatisticsState {
                is_observing: true,
                ..StatisticsState::default()
            })
            .when_action(StatisticsAction::Start)
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn snapshot_computes_percentages() {
        ReducerTest::new(StatisticsReducer)
            .with_env(env())
            .given_state(StatisticsState::default())
            .when_action(StatisticsAction::TasksUpdated {
                result: Ok(fixtures::mixed_tasks(3, 1)),
            })
            .then_state(|state| {
                assert!(!state.is_loading);
                assert!(!state.is_empty);
                assert!((state.active_tasks_percent - 75.0).abs() < f32::EPSILON);
                assert!((state.completed_tasks_percent - 25.0).abs() < f32::EPSILON);
            })
            .run();
    }

    #[test]
    fn empty_snapshot_is_zero_and_empty() {
        ReducerTest::new(StatisticsReducer)
            .with_env(env())
            .given_state(StatisticsState::default())
            .when_action(StatisticsAction::TasksUpdated { result: Ok(Vec::new()) })
            .then_state(|state| {
                assert!(state.is_empty);
                assert!(state.active_tasks_percent.abs() < f32::EPSILON);
                assert!(state.completed_tasks_percent.abs() < f32::EPSILON);
            })
            .run();
    }

    #[test]
    fn load_failure_becomes_error_state() {
        let error = RepositoryError::Local(DataSourceError::Database("locked".into()));
        ReducerTest::new(StatisticsReducer)
            .with_env(env())
            .given_state(StatisticsState::default())
            .when_action(StatisticsAction::TasksUpdated {
                result: Err(error.clone()),
            })
            .then_state(move |state| {
                assert!(!state.is_loading);
                assert_eq!(state.load_error, Some(error));
            })
            .run();
    }
}
