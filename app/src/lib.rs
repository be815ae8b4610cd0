//! Todo application built on Taskboard.
//!
//! Four headless screens, each a reducer over [`TodoEnvironment`]:
//!
//! - [`tasks`]: filtered task list with completion toggles
//! - [`task_detail`]: one task, with delete and completion
//! - [`add_edit`]: draft editing and saving
//! - [`statistics`]: active/completed percentages
//!
//! [`TodoApp`] wires the production data layer (`SQLite` plus the simulated
//! remote) from a [`Config`] and hands out one `Store` per screen.

pub mod add_edit;
pub mod config;
pub mod environment;
pub mod messages;
pub mod statistics;
pub mod task_detail;
pub mod tasks;

pub use add_edit::{AddEditTaskAction, AddEditTaskReducer, AddEditTaskState};
pub use config::{Config, ConfigError};
pub use environment::TodoEnvironment;
pub use messages::{EditResult, UserMessage};
pub use statistics::{StatisticsAction, StatisticsReducer, StatisticsState};
pub use task_detail::{TaskDetailAction, TaskDetailReducer, TaskDetailState};
pub use tasks::{TasksAction, TasksReducer, TasksState};

use std::sync::Arc;
use taskboard_core::data_source::DataSourceError;
use taskboard_core::environment::UuidGenerator;
use taskboard_repository::{DefaultTasksRepository, SimulatedNetworkDataSource};
use taskboard_runtime::{Store, StoreConfig};
use taskboard_sqlite::SqliteTaskStore;
use thiserror::Error;

/// Store for the tasks list
pub type TasksStore = Store<TasksState, TasksAction, TodoEnvironment, TasksReducer>;
/// Store for the detail screen
pub type TaskDetailStore = Store<TaskDetailState, TaskDetailAction, TodoEnvironment, TaskDetailReducer>;
/// Store for the add/edit screen
pub type AddEditTaskStore = Store<AddEditTaskState, AddEditTaskAction, TodoEnvironment, AddEditTaskReducer>;
/// Store for the statistics screen
pub type StatisticsStore = Store<StatisticsState, StatisticsAction, TodoEnvironment, StatisticsReducer>;

/// Errors raised while starting the application
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The local database could not be opened
    #[error(transparent)]
    Database(#[from] DataSourceError),
}

/// The wired application: repository plus store factories.
#[derive(Debug)]
pub struct TodoApp {
    config: Config,
    repository: Arc<DefaultTasksRepository>,
    environment: TodoEnvironment,
}

impl TodoApp {
    /// Open the local database and build the repository.
    ///
    /// # Errors
    ///
    /// [`AppError::Config`] if the configuration does not validate,
    /// [`AppError::Database`] if `SQLite` cannot be opened.
    pub async fn connect(config: Config) -> Result<Self, AppError> {
        config.validate()?;
        let sync_mode = config.sync_mode()?;

        let local =
            SqliteTaskStore::connect(&config.database.url, config.database.max_connections).await?;
        let network = SimulatedNetworkDataSource::new(config.network_latency());

        let repository = Arc::new(
            DefaultTasksRepository::open(
                Arc::new(local),
                Arc::new(network),
                Arc::new(UuidGenerator),
                sync_mode,
            )
            .await,
        );

        tracing::info!(
            database = %config.database.url,
            ?sync_mode,
            latency_ms = config.network.latency_ms,
            "Todo app connected"
        );

        Ok(Self::from_repository(config, repository))
    }

    /// Build the app around an existing repository
    #[must_use]
    pub fn from_repository(config: Config, repository: Arc<DefaultTasksRepository>) -> Self {
        let environment = TodoEnvironment::new(repository.clone());
        Self {
            config,
            repository,
            environment,
        }
    }

    /// Loaded configuration
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Shared repository
    #[must_use]
    pub const fn repository(&self) -> &Arc<DefaultTasksRepository> {
        &self.repository
    }

    /// Shared environment
    #[must_use]
    pub const fn environment(&self) -> &TodoEnvironment {
        &self.environment
    }

    fn store_config(&self) -> StoreConfig {
        StoreConfig::default().with_shutdown_timeout(self.config.shutdown_timeout())
    }

    /// New tasks list store
    #[must_use]
    pub fn tasks_store(&self) -> TasksStore {
        Store::with_config(
            TasksState::default(),
            TasksReducer,
            self.environment.clone(),
            self.store_config(),
        )
    }

    /// New detail store
    #[must_use]
    pub fn task_detail_store(&self) -> TaskDetailStore {
        Store::with_config(
            TaskDetailState::default(),
            TaskDetailReducer,
            self.environment.clone(),
            self.store_config(),
        )
    }

    /// New add/edit store
    #[must_use]
    pub fn add_edit_store(&self) -> AddEditTaskStore {
        Store::with_config(
            AddEditTaskState::default(),
            AddEditTaskReducer,
            self.environment.clone(),
            self.store_config(),
        )
    }

    /// New statistics store
    #[must_use]
    pub fn statistics_store(&self) -> StatisticsStore {
        Store::with_config(
            StatisticsState::default(),
            StatisticsReducer,
            self.environment.clone(),
            self.store_config(),
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    #![allow(clippy::expect_used)] // Test code

    use crate::environment::TodoEnvironment;
    use std::sync::Arc;
    use taskboard_core::task::Task;
    use taskboard_repository::{DefaultTasksRepository, SyncMode};
    use taskboard_testing::{FakeNetworkDataSource, InMemoryTaskStore, SequentialIdGenerator};

    /// Environment over in-memory fakes, for reducer tests that never run effects
    pub fn environment(tasks: Vec<Task>) -> TodoEnvironment {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("test runtime");
        let repository = runtime.block_on(DefaultTasksRepository::open(
            Arc::new(InMemoryTaskStore::with_tasks(tasks)),
            Arc::new(FakeNetworkDataSource::new()),
            Arc::new(SequentialIdGenerator::default()),
            SyncMode::Inline,
        ));
        TodoEnvironment::new(Arc::new(repository))
    }
}
