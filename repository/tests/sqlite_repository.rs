//! End-to-end repository tests over `SQLite` and the simulated remote.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use std::sync::Arc;
use std::time::Duration;
use taskboard_core::environment::UuidGenerator;
use taskboard_repository::{
    DefaultTasksRepository, SimulatedNetworkDataSource, SyncMode, TasksRepository,
};
use taskboard_sqlite::SqliteTaskStore;

async fn repository(network: Arc<SimulatedNetworkDataSource>) -> DefaultTasksRepository {
    let local = SqliteTaskStore::in_memory().await.expect("in-memory SQLite");
    DefaultTasksRepository::open(
        Arc::new(local),
        network,
        Arc::new(UuidGenerator),
        SyncMode::Inline,
    )
    .await
}

#[tokio::test]
async fn forced_refresh_loads_the_seed_tasks() {
    let repo = repository(Arc::new(SimulatedNetworkDataSource::new(Duration::ZERO))).await;
    assert!(repo.get_tasks(false).await.unwrap().is_empty());

    let tasks = repo.get_tasks(true).await.unwrap();

    let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Build tower in Pisa", "Finish bridge in Tacoma"]);
    assert!(tasks.iter().all(|t| t.is_active()));
}

#[tokio::test]
async fn local_edits_survive_a_round_trip_through_the_remote() {
    let network = Arc::new(SimulatedNetworkDataSource::new(Duration::ZERO));
    let repo = repository(Arc::clone(&network)).await;
    repo.refresh_tasks().await.unwrap();

    let created = repo
        .create_task("Paint the fence".into(), "Two coats".into())
        .await
        .unwrap();
    repo.complete_task(&created.id).await.unwrap();

    // A second device sharing the same remote
    let other = repository(network).await;
    let tasks = other.get_tasks(true).await.unwrap();

    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[2], created.completed(true));
}
