//! Add/edit task screen.
//!
//! Edits a draft held in state. `Save` validates the draft and then either
//! creates a task or updates the existing one; the completion flag of an
//! existing task is left as it was.

use crate::environment::TodoEnvironment;
use crate::messages::{EditResult, UserMessage};
use std::sync::Arc;
use taskboard_core::{
    SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec,
    task::{Task, TaskId, is_blank_task},
};
use taskboard_macros::Action;
use taskboard_repository::RepositoryError;

/// UI state of the add/edit screen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddEditTaskState {
    /// Task being edited; `None` while adding a new one
    pub task_id: Option<TaskId>,
    /// Draft title
    pub title: String,
    /// Draft description
    pub description: String,
    /// Completion of the task being edited
    pub is_task_completed: bool,
    /// The existing task is being loaded
    pub is_loading: bool,
    /// A save is in flight
    pub is_saving: bool,
    /// Pending snackbar message
    pub user_message: Option<UserMessage>,
    /// The draft has been written
    pub is_task_saved: bool,
    /// The screen was opened without a task id
    pub is_new_task: bool,
}

impl AddEditTaskState {
    /// What the tasks list should announce once this screen is done
    #[must_use]
    pub const fn edit_result(&self) -> Option<EditResult> {
        if !self.is_task_saved {
            None
        } else if self.is_new_task {
            Some(EditResult::Added)
        } else {
            Some(EditResult::Saved)
        }
    }
}

/// Actions of the add/edit screen
#[derive(Action, Clone, Debug)]
pub enum AddEditTaskAction {
    /// Open the screen, loading the task when editing
    #[command]
    Load {
        /// Task to edit, `None` to add a new one
        task_id: Option<TaskId>,
    },

    /// Title field changed
    #[command]
    UpdateTitle(String),

    /// Description field changed
    #[command]
    UpdateDescription(String),

    /// Write the draft
    #[command]
    Save,

    /// The renderer has shown `user_message`
    #[command]
    SnackbarMessageShown,

    /// The task to edit was read
    #[event]
    TaskLoaded {
        /// Task that was requested
        task_id: TaskId,
        /// The task, `None` if it does not exist, or the read error
        result: Result<Option<Task>, RepositoryError>,
    },

    /// The save finished
    #[event]
    Saved {
        /// Id of the written task, or the write error
        result: Result<TaskId, RepositoryError>,
    },
}

/// Reducer for the add/edit screen
#[derive(Clone, Copy, Debug, Default)]
pub struct AddEditTaskReducer;

impl AddEditTaskReducer {
    fn save(state: &AddEditTaskState, env: &TodoEnvironment) -> Effect<AddEditTaskAction> {
        let repository = Arc::clone(&env.repository);
        let title = state.title.clone();
        let description = state.description.clone();

        match state.task_id.clone() {
            None => async_effect! {
                let result = repository
                    .create_task(title, description)
                    .await
                    .map(|task| task.id);
                Some(AddEditTaskAction::Saved { result })
            },
            Some(task_id) => async_effect! {
                let written = repository.update_task(&task_id, title, description).await;
                Some(AddEditTaskAction::Saved {
                    result: written.map(|()| task_id),
                })
            },
        }
    }
}

impl Reducer for AddEditTaskReducer {
    type State = AddEditTaskState;
    type Action = AddEditTaskAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AddEditTaskAction::Load { task_id: None } => {
                *state = AddEditTaskState {
                    is_new_task: true,
                    ..AddEditTaskState::default()
                };
                SmallVec::new()
            },

            AddEditTaskAction::Load {
                task_id: Some(task_id),
            } => {
                *state = AddEditTaskState {
                    task_id: Some(task_id.clone()),
                    is_loading: true,
                    ..AddEditTaskState::default()
                };

                let repository = Arc::clone(&env.repository);
                smallvec![async_effect! {
                    let result = repository.get_task(&task_id, false).await;
                    Some(AddEditTaskAction::TaskLoaded { task_id, result })
                }]
            },

            AddEditTaskAction::UpdateTitle(title) => {
                state.title = title;
                SmallVec::new()
            },

            AddEditTaskAction::UpdateDescription(description) => {
                state.description = description;
                SmallVec::new()
            },

            AddEditTaskAction::Save => {
                if state.is_saving || state.is_loading {
                    return SmallVec::new();
                }
                if is_blank_task(&state.title, &state.description) {
                    state.user_message = Some(UserMessage::EmptyTask);
                    return SmallVec::new();
                }
                state.is_saving = true;
                smallvec![Self::save(state, env)]
            },

            AddEditTaskAction::SnackbarMessageShown => {
                state.user_message = None;
                SmallVec::new()
            },

            AddEditTaskAction::TaskLoaded { task_id, result } => {
                // A late result for a task opened earlier must not fill this draft
                if state.task_id.as_ref() != Some(&task_id) || !state.is_loading {
                    tracing::debug!(%task_id, "Dropping load result for a task no longer edited");
                    return SmallVec::new();
                }
                state.is_loading = false;
                match result {
                    Ok(Some(task)) => {
                        state.title = task.title;
                        state.description = task.description;
                        state.is_task_completed = task.is_completed;
                    },
                    Ok(None) => state.user_message = Some(UserMessage::LoadingTaskError),
                    Err(error) => {
                        tracing::warn!(%error, "Loading task for edit failed");
                        state.user_message = Some(UserMessage::LoadingTaskError);
                    },
                }
                SmallVec::new()
            },

            AddEditTaskAction::Saved { result } => {
                // Reopening the screen resets `is_saving`; results from before belong to another draft
                if !state.is_saving {
                    return SmallVec::new();
                }
                state.is_saving = false;
                match result {
                    Ok(task_id) => {
                        // Further saves update the task instead of creating another
                        state.task_id = Some(task_id);
                        state.is_task_saved = true;
                    },
                    Err(error) => {
                        tracing::warn!(%error, "Saving task failed");
                        state.user_message = Some(UserMessage::UpdateTaskError);
                    },
                }
                SmallVec::new()
            },
        }
    }
}
