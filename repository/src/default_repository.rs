//! Local-first repository with remote mirroring.

use crate::{RepositoryError, RepositoryFuture, TasksRepository, TasksSnapshot};
use std::sync::Arc;
use taskboard_core::data_source::{LocalTaskStore, NetworkDataSource, NetworkTask};
use taskboard_core::environment::IdGenerator;
use taskboard_core::task::{Task, TaskId};
use taskboard_runtime::metrics::{REPOSITORY_REFRESHES, REPOSITORY_SYNC_FAILURES};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinSet;

/// How writes are mirrored to the remote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Spawn the mirror and return as soon as the local write is done.
    /// Mirror failures are logged and counted, never returned.
    #[default]
    Background,

    /// Await the mirror; its failure is returned from the write.
    Inline,
}

/// Default [`TasksRepository`].
///
/// Every write hits the local store first, then re-publishes the
/// observation snapshot, then mirrors the whole local table to the remote.
/// There is no conflict resolution: the last mirror to run wins.
///
/// Background mirrors are owned by the repository and are aborted when it
/// is dropped; call [`flush`](Self::flush) first to let them finish.
pub struct DefaultTasksRepository {
    local: Arc<dyn LocalTaskStore>,
    network: Arc<dyn NetworkDataSource>,
    ids: Arc<dyn IdGenerator>,
    sync_mode: SyncMode,
    snapshot: watch::Sender<TasksSnapshot>,
    // Serializes read-then-publish so a slow reader never overwrites a newer snapshot
    publish_lock: Mutex<()>,
    // Mirrors read the local table inside this lock, so the last one holds the latest rows
    sync_lock: Arc<Mutex<()>>,
    mirrors: Mutex<JoinSet<()>>,
}

impl std::fmt::Debug for DefaultTasksRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultTasksRepository")
            .field("sync_mode", &self.sync_mode)
            .finish_non_exhaustive()
    }
}

impl DefaultTasksRepository {
    /// Build the repository and seed the observation snapshot from the
    /// local store. A failed initial read is published as an error snapshot.
    pub async fn open(
        local: Arc<dyn LocalTaskStore>,
        network: Arc<dyn NetworkDataSource>,
        ids: Arc<dyn IdGenerator>,
        sync_mode: SyncMode,
    ) -> Self {
        let initial = local.get_tasks().await.map_err(RepositoryError::Local);
        if let Err(error) = &initial {
            tracing::warn!(%error, "Initial task load failed");
        }

        Self {
            local,
            network,
            ids,
            sync_mode,
            snapshot: watch::Sender::new(initial),
            publish_lock: Mutex::new(()),
            sync_lock: Arc::new(Mutex::new(())),
            mirrors: Mutex::new(JoinSet::new()),
        }
    }

    /// Configured mirroring mode
    #[must_use]
    pub const fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    /// Wait for every background mirror spawned so far.
    ///
    /// Writes issued while flushing are not held up; their mirrors are left
    /// for the next flush.
    pub async fn flush(&self) {
        let mut pending = std::mem::take(&mut *self.mirrors.lock().await);
        while let Some(result) = pending.join_next().await {
            if let Err(error) = result {
                tracing::error!(%error, "Remote mirror task failed");
            }
        }
    }

    /// Re-read the local table and publish it to observers.
    async fn publish(&self) {
        let _guard = self.publish_lock.lock().await;
        let snapshot = self.local.get_tasks().await.map_err(RepositoryError::Local);
        if let Ok(tasks) = &snapshot {
            tracing::trace!(count = tasks.len(), "Publishing tasks snapshot");
        }
        self.snapshot.send_replace(snapshot);
    }

    /// Publish, then mirror according to the sync mode.
    async fn after_write(&self) -> Result<(), RepositoryError> {
        self.publish().await;

        let local = Arc::clone(&self.local);
        let network = Arc::clone(&self.network);
        let sync_lock = Arc::clone(&self.sync_lock);

        match self.sync_mode {
            SyncMode::Inline => mirror(local, network, sync_lock).await,
            SyncMode::Background => {
                let mut mirrors = self.mirrors.lock().await;
                while mirrors.try_join_next().is_some() {}
                mirrors.spawn(async move {
                    // Failures are already logged and counted
                    let _ = mirror(local, network, sync_lock).await;
                });
                Ok(())
            },
        }
    }

    async fn refresh(&self) -> Result<(), RepositoryError> {
        let remote = self
            .network
            .load_tasks()
            .await
            .map_err(RepositoryError::Network)?;
        let tasks: Vec<Task> = remote.into_iter().map(Task::from).collect();
        let count = tasks.len();

        self.local
            .replace_all(tasks)
            .await
            .map_err(RepositoryError::Local)?;
        self.publish().await;

        metrics::counter!(REPOSITORY_REFRESHES).increment(1);
        tracing::debug!(count, "Refreshed local tasks from remote");
        Ok(())
    }

    async fn set_completed(&self, id: TaskId, completed: bool) -> Result<(), RepositoryError> {
        let changed = self
            .local
            .update_completed(&id, completed)
            .await
            .map_err(RepositoryError::Local)?;
        if !changed {
            return Err(RepositoryError::NotFound(id));
        }

        tracing::debug!(task_id = %id, completed, "Task completion changed");
        self.after_write().await
    }
}

/// Copy the whole local table to the remote.
async fn mirror(
    local: Arc<dyn LocalTaskStore>,
    network: Arc<dyn NetworkDataSource>,
    sync_lock: Arc<Mutex<()>>,
) -> Result<(), RepositoryError> {
    let _guard = sync_lock.lock().await;

    let result: Result<usize, RepositoryError> = async {
        let tasks = local.get_tasks().await.map_err(RepositoryError::Local)?;
        let count = tasks.len();
        network
            .save_tasks(tasks.into_iter().map(NetworkTask::from).collect())
            .await
            .map_err(RepositoryError::Network)?;
        Ok(count)
    }
    .await;

    match result {
        Ok(count) => {
            tracing::debug!(count, "Mirrored tasks to remote");
            Ok(())
        },
        Err(error) => {
            tracing::warn!(%error, "Failed to mirror tasks to remote");
            metrics::counter!(REPOSITORY_SYNC_FAILURES).increment(1);
            Err(error)
        },
    }
}

impl TasksRepository for DefaultTasksRepository {
    fn get_tasks(&self, force_update: bool) -> RepositoryFuture<'_, Vec<Task>> {
        Box::pin(async move {
            if force_update {
                self.refresh().await?;
            }
            self.local.get_tasks().await.map_err(RepositoryError::Local)
        })
    }

    fn get_task(&self, id: &TaskId, force_update: bool) -> RepositoryFuture<'_, Option<Task>> {
        let id = id.clone();
        Box::pin(async move {
            if force_update {
                self.refresh().await?;
            }
            self.local.get_task(&id).await.map_err(RepositoryError::Local)
        })
    }

    fn create_task(&self, title: String, description: String) -> RepositoryFuture<'_, Task> {
        Box::pin(async move {
            let task = Task::new(self.ids.next_id(), title, description);
            self.local
                .upsert_task(task.clone())
                .await
                .map_err(RepositoryError::Local)?;

            tracing::debug!(task_id = %task.id, "Task created");
            self.after_write().await?;
            Ok(task)
        })
    }

    fn update_task(
        &self,
        id: &TaskId,
        title: String,
        description: String,
    ) -> RepositoryFuture<'_, ()> {
        let id = id.clone();
        Box::pin(async move {
            // Column update, so a concurrent completion change is not overwritten
            let changed = self
                .local
                .update_fields(&id, title, description)
                .await
                .map_err(RepositoryError::Local)?;
            if !changed {
                return Err(RepositoryError::NotFound(id));
            }

            tracing::debug!(task_id = %id, "Task updated");
            self.after_write().await
        })
    }

    fn complete_task(&self, id: &TaskId) -> RepositoryFuture<'_, ()> {
        Box::pin(self.set_completed(id.clone(), true))
    }

    fn activate_task(&self, id: &TaskId) -> RepositoryFuture<'_, ()> {
        Box::pin(self.set_completed(id.clone(), false))
    }

    fn delete_task(&self, id: &TaskId) -> RepositoryFuture<'_, ()> {
        let id = id.clone();
        Box::pin(async move {
            let deleted = self
                .local
                .delete_task(&id)
                .await
                .map_err(RepositoryError::Local)?;

            tracing::debug!(task_id = %id, deleted, "Task deleted");
            self.after_write().await
        })
    }

    fn clear_completed_tasks(&self) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            let removed = self
                .local
                .delete_completed_tasks()
                .await
                .map_err(RepositoryError::Local)?;

            tracing::debug!(removed, "Cleared completed tasks");
            self.after_write().await
        })
    }

    fn delete_all_tasks(&self) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            self.local
                .delete_all_tasks()
                .await
                .map_err(RepositoryError::Local)?;

            tracing::debug!("Deleted all tasks");
            self.after_write().await
        })
    }

    fn refresh_tasks(&self) -> RepositoryFuture<'_, ()> {
        Box::pin(self.refresh())
    }

    fn refresh_task(&self, id: &TaskId) -> RepositoryFuture<'_, ()> {
        tracing::trace!(task_id = %id, "Refreshing task");
        Box::pin(self.refresh())
    }

    fn observe_tasks(&self) -> watch::Receiver<TasksSnapshot> {
        self.snapshot.subscribe()
    }
}
