//! # Taskboard Repository
//!
//! The data layer the screens talk to. [`TasksRepository`] hides two sources
//! behind one interface:
//!
//! - a [`LocalTaskStore`](taskboard_core::data_source::LocalTaskStore), the
//!   source of truth for every read
//! - a [`NetworkDataSource`](taskboard_core::data_source::NetworkDataSource),
//!   which receives a full copy of the local table after every write and is
//!   pulled from on a forced refresh
//!
//! The trait is object safe so environments can hold an
//! `Arc<dyn TasksRepository>` and move clones of it into effects.
//!
//! ## Example
//!
//! ```ignore
//! use taskboard_repository::{DefaultTasksRepository, SyncMode, TasksRepository};
//!
//! let repository = DefaultTasksRepository::open(local, network, ids, SyncMode::Background).await;
//! let task = repository.create_task("Title".into(), "Description".into()).await?;
//! repository.complete_task(&task.id).await?;
//! ```

use futures::StreamExt;
use futures::stream::BoxStream;
use std::future::Future;
use std::pin::Pin;
use taskboard_core::data_source::DataSourceError;
use taskboard_core::task::{Task, TaskId};
use thiserror::Error;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

mod default_repository;
pub mod network;

pub use default_repository::{DefaultTasksRepository, SyncMode};
pub use network::SimulatedNetworkDataSource;

/// Errors returned by repository operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No task with this id exists locally.
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    /// The local store failed.
    #[error("Local store failed: {0}")]
    Local(DataSourceError),

    /// The remote failed.
    #[error("Remote failed: {0}")]
    Network(DataSourceError),
}

/// Latest view of all tasks, or the error that prevented reading them
pub type TasksSnapshot = Result<Vec<Task>, RepositoryError>;

/// Boxed future returned by repository methods
pub type RepositoryFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Stream of one task's latest value; `None` once it no longer exists
pub type TaskStream = BoxStream<'static, Result<Option<Task>, RepositoryError>>;

/// Interface to the data layer.
pub trait TasksRepository: Send + Sync {
    /// All tasks, optionally refreshing from the remote first.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Network`] if a forced refresh fails,
    /// [`RepositoryError::Local`] if the local read fails.
    fn get_tasks(&self, force_update: bool) -> RepositoryFuture<'_, Vec<Task>>;

    /// One task, optionally refreshing from the remote first.
    ///
    /// # Errors
    ///
    /// Same as [`get_tasks`](Self::get_tasks).
    fn get_task(&self, id: &TaskId, force_update: bool) -> RepositoryFuture<'_, Option<Task>>;

    /// Creates a new active task with a fresh id.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Local`] if the write fails.
    fn create_task(&self, title: String, description: String) -> RepositoryFuture<'_, Task>;

    /// Replaces the title and description, keeping the completion flag.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] for an unknown id.
    fn update_task(
        &self,
        id: &TaskId,
        title: String,
        description: String,
    ) -> RepositoryFuture<'_, ()>;

    /// Marks a task completed.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] for an unknown id.
    fn complete_task(&self, id: &TaskId) -> RepositoryFuture<'_, ()>;

    /// Marks a task active again.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] for an unknown id.
    fn activate_task(&self, id: &TaskId) -> RepositoryFuture<'_, ()>;

    /// Deletes a task. Deleting an unknown id is not an error.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Local`] if the write fails.
    fn delete_task(&self, id: &TaskId) -> RepositoryFuture<'_, ()>;

    /// Deletes every completed task.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Local`] if the write fails.
    fn clear_completed_tasks(&self) -> RepositoryFuture<'_, ()>;

    /// Deletes every task.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Local`] if the write fails.
    fn delete_all_tasks(&self) -> RepositoryFuture<'_, ()>;

    /// Replaces all local tasks with the remote copy.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Network`] if the remote cannot be loaded; local
    /// data is untouched in that case.
    fn refresh_tasks(&self) -> RepositoryFuture<'_, ()>;

    /// Refreshes the data behind one task.
    ///
    /// The remote protocol is all-or-nothing, so this is a full refresh.
    ///
    /// # Errors
    ///
    /// Same as [`refresh_tasks`](Self::refresh_tasks).
    fn refresh_task(&self, id: &TaskId) -> RepositoryFuture<'_, ()>;

    /// Current-value observation of all tasks.
    ///
    /// The receiver holds the latest snapshot immediately and is updated
    /// after every local write and refresh.
    fn observe_tasks(&self) -> watch::Receiver<TasksSnapshot>;

    /// Observation of a single task, derived from [`observe_tasks`](Self::observe_tasks).
    fn observe_task(&self, id: &TaskId) -> TaskStream {
        let id = id.clone();
        WatchStream::new(self.observe_tasks())
            .map(move |snapshot| snapshot.map(|tasks| tasks.into_iter().find(|t| t.id == id)))
            .boxed()
    }
}
