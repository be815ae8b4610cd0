//! Data-source traits for the task repository.
//!
//! The repository sits on top of two sources:
//!
//! - [`LocalTaskStore`]: the on-device table, source of truth for reads
//! - [`NetworkDataSource`]: the remote copy, mirrored after every write and
//!   pulled on forced refresh
//!
//! # Implementations
//!
//! - `SqliteTaskStore` (in `taskboard-sqlite`): Production local store
//! - `SimulatedNetworkDataSource` (in `taskboard-repository`): Latency-simulating remote
//! - `InMemoryTaskStore` / `FakeNetworkDataSource` (in `taskboard-testing`): Fast, deterministic tests
//!
//! # Dyn Compatibility
//!
//! Both traits return `Pin<Box<dyn Future>>` instead of using `async fn` so
//! they can be shared as `Arc<dyn LocalTaskStore>` inside effects.

use crate::task::{Task, TaskId};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by data-source methods
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DataSourceError>> + Send + 'a>>;

/// Errors raised by local or remote data sources.
///
/// Variants carry rendered messages so the error is `Clone` and can travel
/// inside actions and observation snapshots.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// Database connection or query failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Remote call failed.
    #[error("Network error: {0}")]
    Network(String),

    /// Failed to encode or decode a stored value.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Local task table.
///
/// Implementations serialize their own access; callers never lock around them.
pub trait LocalTaskStore: Send + Sync {
    /// All tasks in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Database`] if the read fails.
    fn get_tasks(&self) -> SourceFuture<'_, Vec<Task>>;

    /// A single task, or `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Database`] if the read fails.
    fn get_task(&self, id: &TaskId) -> SourceFuture<'_, Option<Task>>;

    /// Inserts the task, replacing any existing row with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Database`] if the write fails.
    fn upsert_task(&self, task: Task) -> SourceFuture<'_, ()>;

    /// Sets the completion flag. Returns false if no task has this id.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Database`] if the write fails.
    fn update_completed(&self, id: &TaskId, completed: bool) -> SourceFuture<'_, bool>;

    /// Replaces title and description, leaving the completion flag alone.
    /// Returns false if no task has this id.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Database`] if the write fails.
    fn update_fields(
        &self,
        id: &TaskId,
        title: String,
        description: String,
    ) -> SourceFuture<'_, bool>;

    /// Deletes one task. Returns false if no task has this id.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Database`] if the write fails.
    fn delete_task(&self, id: &TaskId) -> SourceFuture<'_, bool>;

    /// Deletes every completed task, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Database`] if the write fails.
    fn delete_completed_tasks(&self) -> SourceFuture<'_, u64>;

    /// Deletes every task.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Database`] if the write fails.
    fn delete_all_tasks(&self) -> SourceFuture<'_, ()>;

    /// Replaces the whole table with `tasks` atomically.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Database`] if the write fails; the previous
    /// contents are kept in that case.
    fn replace_all(&self, tasks: Vec<Task>) -> SourceFuture<'_, ()>;
}

/// Remote task service.
///
/// The protocol is deliberately coarse: load everything, save everything.
pub trait NetworkDataSource: Send + Sync {
    /// Fetches every remote task.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Network`] if the call fails.
    fn load_tasks(&self) -> SourceFuture<'_, Vec<NetworkTask>>;

    /// Overwrites the remote copy with `tasks`.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Network`] if the call fails.
    fn save_tasks(&self, tasks: Vec<NetworkTask>) -> SourceFuture<'_, ()>;
}

/// Completion status as the remote service encodes it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not yet completed
    #[default]
    Active,
    /// Completed
    Complete,
}

/// Remote representation of a task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTask {
    /// Remote identifier, shared with the local id
    pub id: String,
    /// Title
    pub title: String,
    /// Description
    pub short_description: String,
    /// Completion status
    #[serde(default)]
    pub status: TaskStatus,
}

impl From<NetworkTask> for Task {
    fn from(remote: NetworkTask) -> Self {
        Self {
            id: TaskId::new(remote.id),
            title: remote.title,
            description: remote.short_description,
            is_completed: remote.status == TaskStatus::Complete,
        }
    }
}

impl From<Task> for NetworkTask {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.into_inner(),
            title: task.title,
            short_description: task.description,
            status: if task.is_completed {
                TaskStatus::Complete
            } else {
                TaskStatus::Active
            },
        }
    }
}
