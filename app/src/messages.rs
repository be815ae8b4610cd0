//! Transient user messages shown by the screens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A one-shot message for the user (snackbar text).
///
/// Screens hold at most one at a time and clear it when the renderer
/// reports it as shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserMessage {
    /// An existing task was saved
    TaskSaved,
    /// A new task was added
    TaskAdded,
    /// A task was deleted
    TaskDeleted,
    /// Completed tasks were cleared
    CompletedTasksCleared,
    /// A task was marked complete
    TaskMarkedComplete,
    /// A task was marked active
    TaskMarkedActive,
    /// The task list could not be loaded
    LoadingTasksError,
    /// A single task could not be loaded
    LoadingTaskError,
    /// A save was attempted with a blank title and description
    EmptyTask,
    /// A write to the repository failed
    UpdateTaskError,
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::TaskSaved => "Task saved",
            Self::TaskAdded => "Task added",
            Self::TaskDeleted => "Task was deleted",
            Self::CompletedTasksCleared => "Completed tasks cleared",
            Self::TaskMarkedComplete => "Task marked complete",
            Self::TaskMarkedActive => "Task marked active",
            Self::LoadingTasksError => "Error while loading tasks",
            Self::LoadingTaskError => "Error while loading task",
            Self::EmptyTask => "Tasks cannot be empty",
            Self::UpdateTaskError => "Error while updating task",
        };
        f.write_str(text)
    }
}

/// Outcome reported back to the tasks list when another screen finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditResult {
    /// An existing task was edited
    Saved,
    /// A new task was created
    Added,
    /// The task was deleted from its detail screen
    Deleted,
}

impl EditResult {
    /// Message the tasks list shows for this result
    #[must_use]
    pub const fn message(self) -> UserMessage {
        match self {
            Self::Saved => UserMessage::TaskSaved,
            Self::Added => UserMessage::TaskAdded,
            Self::Deleted => UserMessage::TaskDeleted,
        }
    }
}
