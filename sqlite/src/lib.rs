//! `SQLite` local task table for Taskboard.
//!
//! This crate provides [`SqliteTaskStore`], the production implementation of
//! the `LocalTaskStore` trait from `taskboard-core`. It uses sqlx with
//! hand-written queries against a single table:
//!
//! ```sql
//! CREATE TABLE tasks (
//!     entryid     TEXT PRIMARY KEY NOT NULL,
//!     title       TEXT NOT NULL,
//!     description TEXT NOT NULL,
//!     completed   INTEGER NOT NULL
//! )
//! ```
//!
//! Rows are read back in insertion (`rowid`) order.
//!
//! # Example
//!
//! ```ignore
//! use taskboard_sqlite::SqliteTaskStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteTaskStore::connect("sqlite://tasks.db", 5).await?;
//!     let tasks = store.get_tasks().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use taskboard_core::data_source::{DataSourceError, LocalTaskStore, SourceFuture};
use taskboard_core::task::{Task, TaskId};

const CREATE_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS tasks (
        entryid     TEXT PRIMARY KEY NOT NULL,
        title       TEXT NOT NULL,
        description TEXT NOT NULL,
        completed   INTEGER NOT NULL
    )
";

const SELECT_ALL: &str =
    "SELECT entryid, title, description, completed FROM tasks ORDER BY rowid";

const SELECT_ONE: &str =
    "SELECT entryid, title, description, completed FROM tasks WHERE entryid = ?";

// ON CONFLICT keeps the original rowid, so an edited task keeps its position
const UPSERT: &str = r"
    INSERT INTO tasks (entryid, title, description, completed)
    VALUES (?, ?, ?, ?)
    ON CONFLICT(entryid) DO UPDATE SET
        title = excluded.title,
        description = excluded.description,
        completed = excluded.completed
";

type TaskRow = (String, String, String, bool);

fn task_from_row((id, title, description, completed): TaskRow) -> Task {
    Task::new(TaskId::new(id), title, description).completed(completed)
}

fn database_error(error: sqlx::Error) -> DataSourceError {
    DataSourceError::Database(error.to_string())
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// `SQLite`-backed [`LocalTaskStore`].
///
/// Cloning shares the underlying connection pool.
#[derive(Clone, Debug)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    /// Wrap an existing pool. The caller is responsible for [`migrate`](Self::migrate).
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `url` and run the migration.
    ///
    /// In-memory URLs are limited to one long-lived connection, since every
    /// `SQLite` memory connection is a separate database.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Database`] if the URL is malformed, the
    /// database cannot be opened, or the migration fails.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DataSourceError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(database_error)?
            .create_if_missing(true);

        let pool_options = if is_memory_url(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(database_error)?;

        tracing::debug!(url, "Opened SQLite task store");

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Fresh, migrated in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Database`] if `SQLite` cannot be opened.
    pub async fn in_memory() -> Result<Self, DataSourceError> {
        Self::connect("sqlite::memory:", 1).await
    }

    /// Create the `tasks` table if it does not exist. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Database`] if the statement fails.
    pub async fn migrate(&self) -> Result<(), DataSourceError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }

    /// The underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for connections to be released
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl LocalTaskStore for SqliteTaskStore {
    fn get_tasks(&self) -> SourceFuture<'_, Vec<Task>> {
        Box::pin(async move {
            let rows: Vec<TaskRow> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&self.pool)
                .await
                .map_err(database_error)?;

            Ok(rows.into_iter().map(task_from_row).collect())
        })
    }

    fn get_task(&self, id: &TaskId) -> SourceFuture<'_, Option<Task>> {
        let id = id.clone();
        Box::pin(async move {
            let row: Option<TaskRow> = sqlx::query_as(SELECT_ONE)
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?;

            Ok(row.map(task_from_row))
        })
    }

    fn upsert_task(&self, task: Task) -> SourceFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query(UPSERT)
                .bind(task.id.as_str())
                .bind(&task.title)
                .bind(&task.description)
                .bind(task.is_completed)
                .execute(&self.pool)
                .await
                .map_err(database_error)?;

            tracing::trace!(task_id = %task.id, "Upserted task");
            Ok(())
        })
    }

    fn update_completed(&self, id: &TaskId, completed: bool) -> SourceFuture<'_, bool> {
        let id = id.clone();
        Box::pin(async move {
            let result = sqlx::query("UPDATE tasks SET completed = ? WHERE entryid = ?")
                .bind(completed)
                .bind(id.as_str())
                .execute(&self.pool)
                .await
                .map_err(database_error)?;

            Ok(result.rows_affected() > 0)
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
            let result =
                sqlx::query("UPDATE tasks SET title = ?, description = ? WHERE entryid = ?")
                    .bind(title)
                    .bind(description)
                    .bind(id.as_str())
                    .execute(&self.pool)
                    .await
                    .map_err(database_error)?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn delete_task(&self, id: &TaskId) -> SourceFuture<'_, bool> {
        let id = id.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM tasks WHERE entryid = ?")
                .bind(id.as_str())
                .execute(&self.pool)
                .await
                .map_err(database_error)?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn delete_completed_tasks(&self) -> SourceFuture<'_, u64> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM tasks WHERE completed = 1")
                .execute(&self.pool)
                .await
                .map_err(database_error)?;

            Ok(result.rows_affected())
        })
    }

    fn delete_all_tasks(&self) -> SourceFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("DELETE FROM tasks")
                .execute(&self.pool)
                .await
                .map_err(database_error)?;
            Ok(())
        })
    }

    fn replace_all(&self, tasks: Vec<Task>) -> SourceFuture<'_, ()> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(database_error)?;

            sqlx::query("DELETE FROM tasks")
                .execute(&mut *tx)
                .await
                .map_err(database_error)?;

            for task in &tasks {
                sqlx::query(UPSERT)
                    .bind(task.id.as_str())
                    .bind(&task.title)
                    .bind(&task.description)
                    .bind(task.is_completed)
                    .execute(&mut *tx)
                    .await
                    .map_err(database_error)?;
            }

            tx.commit().await.map_err(database_error)?;

            tracing::debug!(count = tasks.len(), "Replaced local tasks");
            Ok(())
        })
    }
}
