//! Remote data source that simulates a slow network service.

use std::time::Duration;
use taskboard_core::data_source::{NetworkDataSource, NetworkTask, SourceFuture, TaskStatus};
use tokio::sync::Mutex;

/// In-memory remote with a fixed latency on every call.
///
/// Seeded with two tasks unless built with [`empty`](Self::empty). Saves
/// replace the whole remote table, keyed by id.
#[derive(Debug)]
pub struct SimulatedNetworkDataSource {
    tasks: Mutex<Vec<NetworkTask>>,
    latency: Duration,
}

impl SimulatedNetworkDataSource {
    /// Remote holding the two seed tasks
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self::with_tasks(seed_tasks(), latency)
    }

    /// Remote with no tasks
    #[must_use]
    pub fn empty(latency: Duration) -> Self {
        Self::with_tasks(Vec::new(), latency)
    }

    /// Remote holding `tasks`
    #[must_use]
    pub fn with_tasks(tasks: Vec<NetworkTask>, latency: Duration) -> Self {
        Self {
            tasks: Mutex::new(dedupe_by_id(tasks)),
            latency,
        }
    }

    /// Configured latency
    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl NetworkDataSource for SimulatedNetworkDataSource {
    fn load_tasks(&self) -> SourceFuture<'_, Vec<NetworkTask>> {
        Box::pin(async move {
            // Contents are read before the delay, like a response already in flight
            let tasks = self.tasks.lock().await.clone();
            self.simulate_latency().await;
            tracing::debug!(count = tasks.len(), "Loaded remote tasks");
            Ok(tasks)
        })
    }

    fn save_tasks(&self, tasks: Vec<NetworkTask>) -> SourceFuture<'_, ()> {
        Box::pin(async move {
            self.simulate_latency().await;
            let tasks = dedupe_by_id(tasks);
            tracing::debug!(count = tasks.len(), "Saved remote tasks");
            *self.tasks.lock().await = tasks;
            Ok(())
        })
    }
}

/// Keeps the first position of each id and the last value written for it
fn dedupe_by_id(tasks: Vec<NetworkTask>) -> Vec<NetworkTask> {
    let mut unique: Vec<NetworkTask> = Vec::with_capacity(tasks.len());
    for task in tasks {
        match unique.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => unique.push(task),
        }
    }
    unique
}

fn seed_tasks() -> Vec<NetworkTask> {
    vec![
        NetworkTask {
            id: "PISA".to_string(),
            title: "Build tower in Pisa".to_string(),
            short_description: "Ground looks good, no foundation work required.".to_string(),
            status: TaskStatus::Active,
        },
        NetworkTask {
            id: "TACOMA".to_string(),
            title: "Finish bridge in Tacoma".to_string(),
            short_description: "Found awesome girders at half the cost!".to_string(),
            status: TaskStatus::Active,
        },
    ]
}
