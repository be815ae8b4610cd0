//! Task model.
//!
//! A [`Task`] is the only domain entity: a title, a description, a completion
//! flag and an opaque identifier. Screens filter tasks with [`TaskFilter`] and
//! summarize them with [`active_and_completed_stats`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque task identifier
///
/// Generated identifiers are UUID strings, but the remote seeds tasks with
/// short human-readable ids (`"PISA"`), so no format is assumed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an existing identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id, returning the inner string
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single to-do item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Short title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Whether the task is completed
    pub is_completed: bool,
}

impl Task {
    /// Creates a new, active task
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            is_completed: false,
        }
    }

    /// Builder-style completion flag
    #[must_use]
    pub const fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    /// True while the task is not completed
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_completed
    }

    /// True when both title and description are blank
    #[must_use]
    pub fn is_empty(&self) -> bool {
        is_blank_task(&self.title, &self.description)
    }

    /// Text shown in list rows: the title, or the description if there is no title
    #[must_use]
    pub fn title_for_list(&self) -> &str {
        if self.title.is_empty() {
            &self.description
        } else {
            &self.title
        }
    }
}

/// True when a title/description pair would make an empty task
#[must_use]
pub fn is_blank_task(title: &str, description: &str) -> bool {
    title.trim().is_empty() && description.trim().is_empty()
}

/// Which tasks a list shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskFilter {
    /// Every task
    #[default]
    All,
    /// Tasks that are not completed
    Active,
    /// Completed tasks
    Completed,
}

impl TaskFilter {
    /// Returns true if the task is visible under this filter
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => task.is_active(),
            Self::Completed => task.is_completed,
        }
    }

    /// Returns the visible subset, preserving order
    #[must_use]
    pub fn apply(self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|task| self.matches(task)).cloned().collect()
    }

    /// Heading shown above the filtered list
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Tasks",
            Self::Active => "Active Tasks",
            Self::Completed => "Completed Tasks",
        }
    }

    /// Placeholder shown when the filtered list is empty
    #[must_use]
    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::All => "You have no tasks!",
            Self::Active => "You have no active tasks!",
            Self::Completed => "You have no completed tasks!",
        }
    }
}

/// Share of active and completed tasks, in percent
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResult {
    /// Percentage of tasks still active
    pub active_tasks_percent: f32,
    /// Percentage of tasks completed
    pub completed_tasks_percent: f32,
}

/// Computes the active/completed split; an empty list yields `0/0`
#[must_use]
#[allow(clippy::cast_precision_loss)] // task counts are far below f32 precision limits
pub fn active_and_completed_stats(tasks: &[Task]) -> StatsResult {
    if tasks.is_empty() {
        return StatsResult::default();
    }

    let total = tasks.len() as f32;
    let active = tasks.iter().filter(|task| task.is_active()).count() as f32;

    StatsResult {
        active_tasks_percent: 100.0 * active / total,
        completed_tasks_percent: 100.0 * (total - active) / total,
    }
}
