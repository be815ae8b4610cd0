//! Todo demo binary
//!
//! Runs a scripted walkthrough of the four screens against the configured
//! database and the simulated remote, printing state snapshots along the way.

use anyhow::Context;
use std::time::Duration;
use taskboard_core::task::{Task, TaskFilter};
use taskboard_runtime::Store;
use taskboard_runtime::metrics::register_metrics;
use todo::{
    AddEditTaskAction, Config, StatisticsAction, TaskDetailAction, TaskDetailState, TasksAction,
    TasksState, TodoApp,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long to wait for any one screen to settle
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo=debug,taskboard_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    register_metrics();

    let config = Config::from_env().context("reading configuration")?;
    let app = TodoApp::connect(config).await.context("starting the app")?;

    println!("=== Todo ===\n");

    // Tasks list: subscribe, then wait for the initial refresh from the remote
    let tasks = app.tasks_store();
    tasks.send(TasksAction::Start).await?;
    let state = wait_for(&tasks, |s: &TasksState| !s.is_loading && !s.tasks.is_empty()).await?;
    print_tasks(&state);

    // Add a task
    println!("\n>>> Adding a task");
    let add = app.add_edit_store();
    add.send(AddEditTaskAction::Load { task_id: None }).await?;
    add.send(AddEditTaskAction::Save).await?;
    let rejected = add.current_state();
    if let Some(message) = rejected.user_message {
        println!("Empty draft rejected: {message}");
    }
    add.send(AddEditTaskAction::SnackbarMessageShown).await?;
    add.send(AddEditTaskAction::UpdateTitle("Paint the fence".into())).await?;
    add.send(AddEditTaskAction::UpdateDescription("Two coats, white".into())).await?;
    add.send(AddEditTaskAction::Save).await?;
    let saved = wait_for(&add, |s| s.is_task_saved || s.user_message.is_some()).await?;
    let new_task_id = saved.task_id.clone().context("saved task has no id")?;
    if let Some(result) = saved.edit_result() {
        tasks.send(TasksAction::ShowEditResultMessage(result)).await?;
    }
    let state = wait_for(&tasks, |s| s.tasks.iter().any(|t| t.id == new_task_id)).await?;
    print_tasks(&state);

    // Detail: complete the new task
    println!("\n>>> Completing 'Paint the fence'");
    let detail = app.task_detail_store();
    detail
        .send(TaskDetailAction::Start {
            task_id: new_task_id.clone(),
        })
        .await?;
    wait_for(&detail, TaskDetailState::is_data_available).await?;
    detail.send(TaskDetailAction::SetCompleted(true)).await?;
    let state = wait_for(&detail, |s| s.task.as_ref().is_some_and(|t| t.is_completed)).await?;
    if let Some(message) = state.user_message {
        println!("Detail says: {message}");
    }

    // Filters
    tasks.send(TasksAction::SetFilter(TaskFilter::Completed)).await?;
    print_tasks(&tasks.current_state());
    tasks.send(TasksAction::SetFilter(TaskFilter::All)).await?;

    // Statistics
    println!("\n>>> Statistics");
    let statistics = app.statistics_store();
    statistics.send(StatisticsAction::Start).await?;
    let stats = wait_for(&statistics, |s| !s.is_loading).await?;
    println!(
        "Active: {:.1}%  Completed: {:.1}%",
        stats.active_tasks_percent, stats.completed_tasks_percent
    );

    // Clear completed
    println!("\n>>> Clearing completed tasks");
    tasks.send(TasksAction::ClearCompletedTasks).await?;
    let state = wait_for(&tasks, |s| s.tasks.iter().all(Task::is_active)).await?;
    print_tasks(&state);

    // Let background mirrors reach the remote before tearing down
    app.repository().flush().await;

    let timeout = app.config().shutdown_timeout();
    tasks.shutdown(timeout).await?;
    detail.shutdown(timeout).await?;
    add.shutdown(timeout).await?;
    statistics.shutdown(timeout).await?;

    println!("\n=== Done ===");
    Ok(())
}

/// Wait until the store's state satisfies `done`, returning that state
async fn wait_for<S, A, E, R, F>(store: &Store<S, A, E, R>, done: F) -> anyhow::Result<S>
where
    R: taskboard_core::reducer::Reducer<State = S, Action = A, Environment = E>
        + Send
        + Sync
        + 'static,
    A: Send + Clone + 'static,
    S: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
    F: FnMut(&S) -> bool,
{
    let mut states = store.subscribe_state();
    let state = tokio::time::timeout(SETTLE_TIMEOUT, states.wait_for(done))
        .await
        .context("screen did not settle in time")?
        .context("store dropped")?
        .clone();
    Ok(state)
}

fn print_tasks(state: &TasksState) {
    println!("{}:", state.filtering_label());
    if state.is_empty() {
        println!("  {}", state.no_tasks_label());
    }
    for task in &state.items {
        let status = if task.is_completed { "x" } else { " " };
        println!("  [{status}] {}", task.title_for_list());
    }
    if let Some(message) = state.user_message {
        println!("  ({message})");
    }
}
