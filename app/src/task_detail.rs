//! Task detail screen.

use crate::environment::TodoEnvironment;
use crate::messages::UserMessage;
use std::sync::Arc;
use taskboard_core::{
    SmallVec, async_effect, effect::Effect, observe, reducer::Reducer, smallvec,
    task::{Task, TaskId},
};
use taskboard_macros::Action;
use taskboard_repository::RepositoryError;

/// UI state of the detail screen
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskDetailState {
    /// Task being shown
    pub task_id: Option<TaskId>,
    /// Latest value of the task; `None` until loaded or after deletion
    pub task: Option<Task>,
    /// A load or refresh is in flight
    pub is_loading: bool,
    /// Pending snackbar message
    pub user_message: Option<UserMessage>,
    /// A delete is in flight
    pub is_deleting: bool,
    /// The task was deleted from this screen
    pub is_task_deleted: bool,
}

impl TaskDetailState {
    /// True once a task value is available
    #[must_use]
    pub const fn is_data_available(&self) -> bool {
        self.task.is_some()
    }
}

/// Actions of the detail screen
#[derive(Action, Clone, Debug)]
pub enum TaskDetailAction {
    /// Observe the given task
    #[command]
    Start {
        /// Task to show
        task_id: TaskId,
    },

    /// Pull the remote copy
    #[command]
    Refresh,

    /// Delete the task
    #[command]
    Delete,

    /// Complete or re-activate the task
    #[command]
    SetCompleted(bool),

    /// The renderer has shown `user_message`
    #[command]
    SnackbarMessageShown,

    /// New value of an observed task
    #[event]
    TaskUpdated {
        /// Task the value belongs to
        task_id: TaskId,
        /// The task, `None` if it no longer exists, or the read error
        result: Result<Option<Task>, RepositoryError>,
    },

    /// A refresh finished
    #[event]
    RefreshFinished {
        /// Refresh outcome
        result: Result<(), RepositoryError>,
    },

    /// The delete finished
    #[event]
    Deleted {
        /// Deleted task
        task_id: TaskId,
        /// Write outcome
        result: Result<(), RepositoryError>,
    },

    /// A completion change finished
    #[event]
    CompletionChanged {
        /// Changed task
        task_id: TaskId,
        /// Requested completion
        completed: bool,
        /// Write outcome
        result: Result<(), RepositoryError>,
    },
}

/// Reducer for the detail screen
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskDetailReducer;

impl Reducer for TaskDetailReducer {
    type State = TaskDetailState;
    type Action = TaskDetailAction;
    type Environment = TodoEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TaskDetailAction::Start { task_id } => {
                if state.task_id.as_ref() == Some(&task_id) {
                    return SmallVec::new();
                }
                // Events for a previously shown task are dropped by id below
                *state = TaskDetailState {
                    task_id: Some(task_id.clone()),
                    is_loading: true,
                    ..TaskDetailState::default()
                };

                let stream = env.repository.observe_task(&task_id);
                smallvec![observe! {
                    stream: stream,
                    map: |result| TaskDetailAction::TaskUpdated {
                        task_id: task_id.clone(),
                        result,
                    }
                }]
            },

            TaskDetailAction::Refresh => {
                let Some(task_id) = state.task_id.clone() else {
                    return SmallVec::new();
                };
                state.is_loading = true;

                let repository = Arc::clone(&env.repository);
                smallvec![async_effect! {
                    let result = repository.refresh_task(&task_id).await;
                    Some(TaskDetailAction::RefreshFinished { result })
                }]
            },

            TaskDetailAction::Delete => {
                let Some(task_id) = state.task_id.clone() else {
                    return SmallVec::new();
                };
                if state.is_deleting || state.is_task_deleted {
                    return SmallVec::new();
                }
                state.is_deleting = true;

                let repository = Arc::clone(&env.repository);
                smallvec![async_effect! {
                    let result = repository.delete_task(&task_id).await;
                    Some(TaskDetailAction::Deleted { task_id, result })
                }]
            },

            TaskDetailAction::SetCompleted(completed) => {
                let Some(task) = &state.task else {
                    return SmallVec::new();
                };

                let task_id = task.id.clone();
                let repository = Arc::clone(&env.repository);
                smallvec![async_effect! {
                    let result = if completed {
                        repository.complete_task(&task_id).await
                    } else {
                        repository.activate_task(&task_id).await
                    };
                    Some(TaskDetailAction::CompletionChanged {
                        task_id,
                        completed,
                        result,
                    })
                }]
            },

            TaskDetailAction::SnackbarMessageShown => {
                state.user_message = None;
                SmallVec::new()
            },

            TaskDetailAction::TaskUpdated { task_id, .. }
            | TaskDetailAction::Deleted { task_id, .. }
            | TaskDetailAction::CompletionChanged { task_id, .. }
                if state.task_id.as_ref() != Some(&task_id) =>
            {
                tracing::debug!(%task_id, "Dropping event for a task no longer shown");
                SmallVec::new()
            },

            TaskDetailAction::TaskUpdated { result, .. } => {
                state.is_loading = false;
                match result {
                    Ok(Some(task)) => state.task = Some(task),
                    Ok(None) => {
                        state.task = None;
                        // Disappearing after our own delete is expected
                        if !state.is_deleting && !state.is_task_deleted {
                            state.user_message = Some(UserMessage::LoadingTaskError);
                        }
                    },
                    Err(error) => {
                        tracing::warn!(%error, "Loading task failed");
                        state.task = None;
                        state.user_message = Some(UserMessage::LoadingTaskError);
                    },
                }
                SmallVec::new()
            },

            TaskDetailAction::RefreshFinished { result } => {
                state.is_loading = false;
                if let Err(error) = result {
                    tracing::warn!(%error, "Refreshing task failed");
                    state.user_message = Some(UserMessage::LoadingTaskError);
                }
                SmallVec::new()
            },

            TaskDetailAction::Deleted { result, .. } => {
                state.is_deleting = false;
                match result {
                    Ok(()) => {
                        state.is_task_deleted = true;
                        state.task = None;
                    },
                    Err(error) => {
                        tracing::warn!(%error, "Deleting task failed");
                        state.user_message = Some(UserMessage::UpdateTaskError);
                    },
                }
                SmallVec::new()
            },

            TaskDetailAction::CompletionChanged {
                completed, result, ..
            } => {
                state.user_message = Some(match result {
                    Ok(()) if completed => UserMessage::TaskMarkedComplete,
                    Ok(()) => UserMessage::TaskMarkedActive,
                    Err(error) => {
                        tracing::warn!(%error, "Changing completion failed");
                        UserMessage::UpdateTaskError
                    },
                });
                SmallVec::new()
            },
        }
    }
}
