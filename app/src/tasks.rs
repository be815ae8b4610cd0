//! Tasks list screen.
//!
//! Shows every task under the current filter, keeps itself up to date by
//! observing the repository, and handles completion toggles and bulk
//! clearing. Writes never touch `tasks` directly: the repository
//! re-publishes after each write and the subscription brings the change in.

use crate::environment::TodoEnvironment;
use crate::messages::{EditResult, UserMessage};
use std::sync::Arc;
use std::time::Duration;
use taskboard_core::{
    SmallVec, async_effect, delay, effect::Effect, observe, reducer::Reducer, smallvec,
    task::{Task, TaskFilter, TaskId},
};
use taskboard_macros::Action;
use taskboard_repository::{RepositoryError, TasksSnapshot};
use tokio_stream::wrappers::WatchStream;

/// How long a snackbar message stays up when the renderer never acknowledges it
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(4);

/// UI state of the tasks list
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TasksState {
    /// Every task, in repository order
    pub tasks: Vec<Task>,
    /// Tasks visible under `filter`
    pub items: Vec<Task>,
    /// A load or refresh is in flight
    pub is_loading: bool,
    /// Current filter
    pub filter: TaskFilter,
    /// Pending snackbar message
    pub user_message: Option<UserMessage>,
    /// Bumped whenever `user_message` is set, so only the latest expiry clears it
    pub message_serial: u64,
    /// Why the last load failed, if it did
    pub load_error: Option<RepositoryError>,
    /// The repository subscription is running
    pub is_observing: bool,
    /// An edit result has already been shown
    pub edit_result_shown: bool,
}

impl TasksState {
    /// Heading for the current filter
    #[must_use]
    pub const fn filtering_label(&self) -> &'static str {
        self.filter.label()
    }

    /// Placeholder for an empty list under the current filter
    #[must_use]
    pub const fn no_tasks_label(&self) -> &'static str {
        self.filter.empty_message()
    }

    /// True when nothing is visible
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn show_message(&mut self, message: UserMessage) -> Effect<TasksAction> {
        self.user_message = Some(message);
        self.message_serial += 1;
        let serial = self.message_serial;
        delay! {
            duration: MESSAGE_TIMEOUT,
            action: TasksAction::MessageExpired { serial }
        }
    }

    fn show_tasks(&mut self, tasks: Vec<Task>) {
        self.items = self.filter.apply(&tasks);
        self.tasks = tasks;
    }
}

/// Actions of the tasks list
#[derive(Action, Clone, Debug)]
pub enum TasksAction {
    // Commands
    /// Subscribe to the repository and refresh from the remote
    #[command]
    Start,

    /// Pull the remote copy
    #[command]
    Refresh,

    /// Change the filter
    #[command]
    SetFilter(TaskFilter),

    /// Complete or re-activate a task
    #[command]
    SetTaskCompletion {
        /// Task to change
        task_id: TaskId,
        /// Desired completion
        completed: bool,
    },

    /// Delete every completed task
    #[command]
    ClearCompletedTasks,

    /// Show the outcome of the add/edit or detail screen (once)
    #[command]
    ShowEditResultMessage(EditResult),

    /// The renderer has shown `user_message`
    #[command]
    SnackbarMessageShown,

    // Events
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

    /// A completion change finished
    #[event]
    CompletionChanged {
        /// Task that changed
        task_id: TaskId,
        /// Requested completion
        completed: bool,
        /// Write outcome
        result: Result<(), RepositoryError>,
    },

    /// Clearing completed tasks finished
    #[event]
    CompletedTasksCleared {
        /// Write outcome
        result: Result<(), RepositoryError>,
    },

    /// A snackbar message reached `MESSAGE_TIMEOUT`
    #[event]
    MessageExpired {
        /// `message_serial` at the time the message was set
        serial: u64,
    },
}

/// Reducer for the tasks list
#[derive(Clone, Copy, Debug, Default)]
pub struct TasksReducer;

impl TasksReducer {
    /// Creates a new `TasksReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn refresh(env: &TodoEnvironment) -> Effect<TasksAction> {
        let repository = Arc::clone(&env.repository);
        async_effect! {
            let result = repository.refresh_tasks().await;
            Some(TasksAction::RefreshFinished { result })
        }
    }
}

impl Reducer for TasksReducer {
    type State = TasksState;
    type Action = TasksAction;
    type Environment = TodoEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            TasksAction::Start => {
                if state.is_observing {
                    return SmallVec::new();
                }
                state.is_observing = true;
                state.is_loading = true;

                smallvec![
                    observe! {
                        stream: WatchStream::new(env.repository.observe_tasks()),
                        map: |result| TasksAction::TasksUpdated { result }
                    },
                    Self::refresh(env),
                ]
            },

            TasksAction::Refresh => {
                state.is_loading = true;
                smallvec![Self::refresh(env)]
            },

            TasksAction::SetFilter(filter) => {
                if filter == state.filter {
                    return SmallVec::new();
                }
                state.filter = filter;
                state.items = filter.apply(&state.tasks);
                SmallVec::new()
            },

            TasksAction::SetTaskCompletion { task_id, completed } => {
                let Some(task) = state.tasks.iter().find(|t| t.id == task_id) else {
                    tracing::debug!(%task_id, "Completion change for unknown task ignored");
                    return SmallVec::new();
                };
                if task.is_completed == completed {
                    return SmallVec::new();
                }

                let repository = Arc::clone(&env.repository);
                smallvec![async_effect! {
                    let result = if completed {
                        repository.complete_task(&task_id).await
                    } else {
                        repository.activate_task(&task_id).await
                    };
                    Some(TasksAction::CompletionChanged { task_id, completed, result })
                }]
            },

            TasksAction::ClearCompletedTasks => {
                let repository = Arc::clone(&env.repository);
                smallvec![async_effect! {
                    let result = repository.clear_completed_tasks().await;
                    Some(TasksAction::CompletedTasksCleared { result })
                }]
            },

            TasksAction::ShowEditResultMessage(result) => {
                if state.edit_result_shown {
                    return SmallVec::new();
                }
                state.edit_result_shown = true;
                smallvec![state.show_message(result.message())]
            },

            TasksAction::SnackbarMessageShown => {
                state.user_message = None;
                SmallVec::new()
            },

            // ========== Events ==========
            TasksAction::TasksUpdated { result } => {
                state.is_loading = false;
                match result {
                    Ok(tasks) => {
                        state.load_error = None;
                        state.show_tasks(tasks);
                        SmallVec::new()
                    },
                    Err(error) => {
                        tracing::warn!(%error, "Loading tasks failed");
                        state.show_tasks(Vec::new());
                        state.load_error = Some(error);
                        smallvec![state.show_message(UserMessage::LoadingTasksError)]
                    },
                }
            },

            TasksAction::RefreshFinished { result } => {
                state.is_loading = false;
                let Err(error) = result else {
                    return SmallVec::new();
                };
                tracing::warn!(%error, "Refreshing tasks failed");
                smallvec![state.show_message(UserMessage::LoadingTasksError)]
            },

            TasksAction::CompletionChanged {
                task_id,
                completed,
                result,
            } => {
                let message = match result {
                    Ok(()) if completed => UserMessage::TaskMarkedComplete,
                    Ok(()) => UserMessage::TaskMarkedActive,
                    Err(error) => {
                        tracing::warn!(%task_id, %error, "Changing completion failed");
                        UserMessage::UpdateTaskError
                    },
                };
                smallvec![state.show_message(message)]
            },

            TasksAction::CompletedTasksCleared { result } => {
                let message = match result {
                    Ok(()) => UserMessage::CompletedTasksCleared,
                    Err(error) => {
                        tracing::warn!(%error, "Clearing completed tasks failed");
                        UserMessage::UpdateTaskError
                    },
                };
                smallvec![state.show_message(message)]
            },

            TasksAction::MessageExpired { serial } => {
                if serial == state.message_serial {
                    state.user_message = None;
                }
                SmallVec::new()
            },
        }
    }
}
