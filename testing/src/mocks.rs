//! In-memory data sources and deterministic ids
//!
//! Provides fast, deterministic replacements for the production data layer:
//! - [`InMemoryTaskStore`]: `Vec`-backed local table, insertion ordered
//! - [`FakeNetworkDataSource`]: remote copy with a failure switch and call counters
//! - [`SequentialIdGenerator`]: `task-1`, `task-2`, ...

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use taskboard_core::data_source::{
    DataSourceError, LocalTaskStore, NetworkDataSource, NetworkTask, SourceFuture,
};
use taskboard_core::environment::IdGenerator;
use taskboard_core::task::{Task, TaskId};

/// In-memory local task table for fast, deterministic testing.
///
/// Mirrors `SqliteTaskStore` semantics: insertion order is kept, and an
/// upsert of an existing id updates it in place.
///
/// # Example
///
/// ```
/// use taskboard_testing::mocks::InMemoryTaskStore;
/// use taskboard_core::data_source::LocalTaskStore;
/// use taskboard_core::task::{Task, TaskId};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryTaskStore::new();
/// store.upsert_task(Task::new(TaskId::new("1"), "Title", "Description")).await?;
/// assert_eq!(store.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<Vec<Task>>>,
    fail_reads: Arc<AtomicBool>,
}

impl InMemoryTaskStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `tasks`
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(tasks)),
            fail_reads: Arc::default(),
        }
    }

    /// Make every subsequent read fail with a database error
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the stored tasks
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.read().unwrap().clone()
    }

    /// Number of stored tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.read().unwrap().len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.read().unwrap().is_empty()
    }

    fn check_reads(&self) -> Result<(), DataSourceError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(DataSourceError::Database("reads disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl LocalTaskStore for InMemoryTaskStore {
    fn get_tasks(&self) -> SourceFuture<'_, Vec<Task>> {
        Box::pin(async move {
            self.check_reads()?;
            Ok(self.tasks())
        })
    }

    fn get_task(&self, id: &TaskId) -> SourceFuture<'_, Option<Task>> {
        let id = id.clone();
        Box::pin(async move {
            self.check_reads()?;
            Ok(self.tasks.read().unwrap().iter().find(|t| t.id == id).cloned())
        })
    }

    fn upsert_task(&self, task: Task) -> SourceFuture<'_, ()> {
        Box::pin(async move {
            let mut tasks = self.tasks.write().unwrap();
            match tasks.iter_mut().find(|t| t.id == task.id) {
                Some(existing) => *existing = task,
                None => tasks.push(task),
            }
            Ok(())
        })
    }

    fn update_completed(&self, id: &TaskId, completed: bool) -> SourceFuture<'_, bool> {
        let id = id.clone();
        Box::pin(async move {
            let mut tasks = self.tasks.write().unwrap();
            Ok(tasks
                .iter_mut()
                .find(|t| t.id == id)
                .map(|t| t.is_completed = completed)
                .is_some())
        })
    }

    fn update_fields(
        &self,
        id: &TaskId,
        title: String,
        description: String,
    ) -> SourceFuture<'_, bool> {
        let id = id.clone();
        Box::pin(async move {
            let mut tasks = self.tasks.write().unwrap();
            let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
                return Ok(false);
            };
            task.title = title;
            task.description = description;
            Ok(true)
        })
    }

    fn delete_task(&self, id: &TaskId) -> SourceFuture<'_, bool> {
        let id = id.clone();
        Box::pin(async move {
            let mut tasks = self.tasks.write().unwrap();
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            Ok(tasks.len() < before)
        })
    }

    fn delete_completed_tasks(&self) -> SourceFuture<'_, u64> {
        Box::pin(async move {
            let mut tasks = self.tasks.write().unwrap();
            let before = tasks.len();
            tasks.retain(Task::is_active);
            Ok((before - tasks.len()) as u64)
        })
    }

    fn delete_all_tasks(&self) -> SourceFuture<'_, ()> {
        Box::pin(async move {
            self.tasks.write().unwrap().clear();
            Ok(())
        })
    }

    fn replace_all(&self, tasks: Vec<Task>) -> SourceFuture<'_, ()> {
        Box::pin(async move {
            *self.tasks.write().unwrap() = tasks;
            Ok(())
        })
    }
}

/// Remote data source fake.
///
/// Stores whatever was last saved and counts calls. Flip
/// [`set_failing`](Self::set_failing) to make every call fail with a
/// network error.
#[derive(Clone, Debug, Default)]
pub struct FakeNetworkDataSource {
    tasks: Arc<RwLock<Vec<NetworkTask>>>,
    failing: Arc<AtomicBool>,
    loads: Arc<AtomicUsize>,
    saves: Arc<AtomicUsize>,
}

impl FakeNetworkDataSource {
    /// Create an empty remote
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a remote holding `tasks`
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let fake = Self::new();
        *fake.tasks.write().unwrap() = tasks.into_iter().map(NetworkTask::from).collect();
        fake
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Remote contents converted to tasks
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.read().unwrap().iter().cloned().map(Task::from).collect()
    }

    /// Number of `load_tasks` calls so far
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of successful `save_tasks` calls so far
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), DataSourceError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(DataSourceError::Network("remote unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl NetworkDataSource for FakeNetworkDataSource {
    fn load_tasks(&self) -> SourceFuture<'_, Vec<NetworkTask>> {
        Box::pin(async move {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.check_online()?;
            Ok(self.tasks.read().unwrap().clone())
        })
    }

    fn save_tasks(&self, tasks: Vec<NetworkTask>) -> SourceFuture<'_, ()> {
        Box::pin(async move {
            self.check_online()?;
            *self.tasks.write().unwrap() = tasks;
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

/// Predictable ids for tests: `{prefix}-1`, `{prefix}-2`, ...
///
/// # Example
///
/// ```
/// use taskboard_testing::mocks::SequentialIdGenerator;
/// use taskboard_core::environment::IdGenerator;
///
/// let ids = SequentialIdGenerator::new("task");
/// assert_eq!(ids.next_id().as_str(), "task-1");
/// assert_eq!(ids.next_id().as_str(), "task-2");
/// ```
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Create a generator with the given prefix
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("task")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> TaskId {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        TaskId::new(format!("{}-{n}", self.prefix))
    }
}
