//! End-to-end screen tests
//!
//! Each test runs real stores over a repository backed by the in-memory
//! fakes, sends commands the way a renderer would, and waits on published
//! state snapshots.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::Arc;
use std::time::Duration;
use taskboard_core::task::{Task, TaskFilter, TaskId};
use taskboard_repository::{DefaultTasksRepository, SyncMode, TasksRepository};
use taskboard_runtime::Store;
use taskboard_testing::{
    FakeNetworkDataSource, InMemoryTaskStore, SequentialIdGenerator, fixtures,
};
use todo::{
    AddEditTaskAction, Config, EditResult, StatisticsAction, TaskDetailAction, TasksAction,
    TodoApp, UserMessage,
};
use tokio::sync::broadcast::error::RecvError;

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    app: TodoApp,
    local: InMemoryTaskStore,
    remote: FakeNetworkDataSource,
}

async fn harness(local_tasks: Vec<Task>, remote_tasks: Vec<Task>) -> Harness {
    let local = InMemoryTaskStore::with_tasks(local_tasks);
    let remote = FakeNetworkDataSource::with_tasks(remote_tasks);
    let repository = DefaultTasksRepository::open(
        Arc::new(local.clone()),
        Arc::new(remote.clone()),
        Arc::new(SequentialIdGenerator::default()),
        SyncMode::Inline,
    )
    .await;

    Harness {
        app: TodoApp::from_repository(Config::default(), Arc::new(repository)),
        local,
        remote,
    }
}

async fn settle<S, A, E, R, F>(store: &Store<S, A, E, R>, done: F) -> S
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
    tokio::time::timeout(WAIT, states.wait_for(done))
        .await
        .expect("state did not settle in time")
        .expect("store dropped")
        .clone()
}

/// Start the tasks list and wait for its first refresh to finish
async fn start_tasks(tasks: &todo::TasksStore) {
    tasks
        .send_and_wait_for(
            TasksAction::Start,
            |action| matches!(action, TasksAction::RefreshFinished { .. }),
            WAIT,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn tasks_list_shows_remote_tasks_after_start() {
    let h = harness(Vec::new(), fixtures::mixed_tasks(2, 1)).await;
    let tasks = h.app.tasks_store();

    start_tasks(&tasks).await;
    let state = settle(&tasks, |s| !s.is_loading && s.tasks.len() == 3).await;

    assert_eq!(state.items.len(), 3);
    assert_eq!(state.load_error, None);
    assert_eq!(h.local.len(), 3);
    assert_eq!(h.remote.load_count(), 1);
}

#[tokio::test]
async fn second_start_does_not_refresh_again() {
    let h = harness(Vec::new(), fixtures::mixed_tasks(1, 0)).await;
    let tasks = h.app.tasks_store();

    start_tasks(&tasks).await;

    let mut handle = tasks.send(TasksAction::Start).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    assert_eq!(h.remote.load_count(), 1);
}

#[tokio::test]
async fn filter_narrows_visible_items() {
    let h = harness(Vec::new(), fixtures::mixed_tasks(2, 3)).await;
    let tasks = h.app.tasks_store();

    start_tasks(&tasks).await;
    settle(&tasks, |s| s.tasks.len() == 5).await;

    tasks.send(TasksAction::SetFilter(TaskFilter::Active)).await.unwrap();
    let state = tasks.current_state();
    assert_eq!(state.items.len(), 2);
    assert!(state.items.iter().all(Task::is_active));
    assert_eq!(state.filtering_label(), TaskFilter::Active.label());

    tasks.send(TasksAction::SetFilter(TaskFilter::Completed)).await.unwrap();
    assert_eq!(tasks.current_state().items.len(), 3);
}

#[tokio::test]
async fn failed_refresh_reports_and_keeps_local_rows() {
    let h = harness(fixtures::mixed_tasks(2, 0), Vec::new()).await;
    h.remote.set_failing(true);
    let tasks = h.app.tasks_store();

    start_tasks(&tasks).await;
    let state = settle(&tasks, |s| s.user_message.is_some()).await;

    assert_eq!(state.user_message, Some(UserMessage::LoadingTasksError));
    assert_eq!(state.tasks.len(), 2);
    assert_eq!(h.local.len(), 2);
}

#[tokio::test]
async fn saving_a_new_task_reaches_list_statistics_and_remote() {
    let h = harness(Vec::new(), Vec::new()).await;
    let tasks = h.app.tasks_store();
    let statistics = h.app.statistics_store();
    let add = h.app.add_edit_store();

    start_tasks(&tasks).await;
    statistics.send(StatisticsAction::Start).await.unwrap();

    add.send(AddEditTaskAction::Load { task_id: None }).await.unwrap();
    add.send(AddEditTaskAction::UpdateTitle("Buy milk".into())).await.unwrap();
    add.send(AddEditTaskAction::Save).await.unwrap();
    let saved = settle(&add, |s| s.is_task_saved).await;

    assert_eq!(saved.task_id, Some(TaskId::new("task-1")));
    assert_eq!(saved.edit_result(), Some(EditResult::Added));

    let list = settle(&tasks, |s| s.tasks.len() == 1).await;
    assert_eq!(list.tasks[0].title, "Buy milk");
    assert!(list.tasks[0].is_active());

    let stats = settle(&statistics, |s| !s.is_empty).await;
    assert!((stats.active_tasks_percent - 100.0).abs() < f32::EPSILON);
    assert!(stats.completed_tasks_percent.abs() < f32::EPSILON);

    // Inline mode mirrors before the write returns
    assert_eq!(h.remote.tasks().len(), 1);

    tasks
        .send(TasksAction::ShowEditResultMessage(EditResult::Added))
        .await
        .unwrap();
    tasks
        .send(TasksAction::ShowEditResultMessage(EditResult::Added))
        .await
        .unwrap();
    tasks.send(TasksAction::SnackbarMessageShown).await.unwrap();
    tasks
        .send(TasksAction::ShowEditResultMessage(EditResult::Added))
        .await
        .unwrap();
    assert_eq!(tasks.current_state().user_message, None);
}

#[tokio::test]
async fn empty_draft_is_never_written() {
    let h = harness(Vec::new(), Vec::new()).await;
    let add = h.app.add_edit_store();

    add.send(AddEditTaskAction::Load { task_id: None }).await.unwrap();
    add.send(AddEditTaskAction::UpdateTitle("   ".into())).await.unwrap();
    add.send(AddEditTaskAction::Save).await.unwrap();

    let state = add.current_state();
    assert_eq!(state.user_message, Some(UserMessage::EmptyTask));
    assert!(!state.is_task_saved);
    assert!(h.local.is_empty());
    assert_eq!(h.remote.save_count(), 0);
}

#[tokio::test]
async fn editing_keeps_completion() {
    let done = fixtures::completed_task("done-0");
    let h = harness(vec![done.clone()], Vec::new()).await;
    let add = h.app.add_edit_store();

    add.send(AddEditTaskAction::Load {
        task_id: Some(done.id.clone()),
    })
    .await
    .unwrap();
    let loaded = settle(&add, |s| !s.is_loading).await;
    assert_eq!(loaded.title, done.title);
    assert!(loaded.is_task_completed);

    add.send(AddEditTaskAction::UpdateTitle("Renamed".into())).await.unwrap();
    add.send(AddEditTaskAction::Save).await.unwrap();
    let saved = settle(&add, |s| s.is_task_saved).await;
    assert_eq!(saved.edit_result(), Some(EditResult::Saved));

    let stored = h.app.repository().get_task(&done.id, false).await.unwrap().unwrap();
    assert_eq!(stored.title, "Renamed");
    assert!(stored.is_completed);
}

#[tokio::test]
async fn loading_a_missing_task_for_edit_reports_error() {
    let h = harness(Vec::new(), Vec::new()).await;
    let add = h.app.add_edit_store();

    add.send(AddEditTaskAction::Load {
        task_id: Some(TaskId::new("nope")),
    })
    .await
    .unwrap();
    let state = settle(&add, |s| !s.is_loading).await;

    assert_eq!(state.user_message, Some(UserMessage::LoadingTaskError));
}

#[tokio::test]
async fn completing_from_the_list_updates_everything() {
    let task = fixtures::task("active-0");
    let h = harness(vec![task.clone()], vec![task.clone()]).await;
    let tasks = h.app.tasks_store();

    start_tasks(&tasks).await;
    settle(&tasks, |s| s.tasks.len() == 1).await;

    tasks
        .send(TasksAction::SetTaskCompletion {
            task_id: task.id.clone(),
            completed: true,
        })
        .await
        .unwrap();
    let state = settle(&tasks, |s| {
        s.user_message.is_some() && s.tasks.iter().all(|t| t.is_completed)
    })
    .await;

    assert_eq!(state.user_message, Some(UserMessage::TaskMarkedComplete));
    assert!(h.remote.tasks().iter().all(|t| t.is_completed));
}

#[tokio::test]
async fn clearing_completed_leaves_active_tasks() {
    let h = harness(Vec::new(), fixtures::mixed_tasks(2, 2)).await;
    let tasks = h.app.tasks_store();

    start_tasks(&tasks).await;
    settle(&tasks, |s| s.tasks.len() == 4).await;

    tasks.send(TasksAction::ClearCompletedTasks).await.unwrap();
    let state = settle(&tasks, |s| {
        s.user_message == Some(UserMessage::CompletedTasksCleared) && s.tasks.len() == 2
    })
    .await;

    assert!(state.tasks.iter().all(Task::is_active));
    assert_eq!(h.remote.tasks().len(), 2);
}

#[tokio::test]
async fn detail_follows_and_deletes_a_task() {
    let task = fixtures::task("active-0");
    let h = harness(vec![task.clone()], vec![task.clone()]).await;
    let detail = h.app.task_detail_store();

    detail
        .send(TaskDetailAction::Start {
            task_id: task.id.clone(),
        })
        .await
        .unwrap();
    let shown = settle(&detail, |s| s.is_data_available()).await;
    assert_eq!(shown.task.as_ref().map(|t| t.title.as_str()), Some(task.title.as_str()));

    detail.send(TaskDetailAction::SetCompleted(true)).await.unwrap();
    let completed = settle(&detail, |s| {
        s.task.as_ref().is_some_and(|t| t.is_completed) && s.user_message.is_some()
    })
    .await;
    assert_eq!(completed.user_message, Some(UserMessage::TaskMarkedComplete));
    detail.send(TaskDetailAction::SnackbarMessageShown).await.unwrap();

    detail.send(TaskDetailAction::Delete).await.unwrap();
    let deleted = settle(&detail, |s| s.is_task_deleted).await;
    assert!(!deleted.is_data_available());
    assert_eq!(deleted.user_message, None);

    assert!(h.local.is_empty());
    assert!(h.remote.tasks().is_empty());
}

#[tokio::test]
async fn detail_of_unknown_task_reports_error() {
    let h = harness(Vec::new(), Vec::new()).await;
    let detail = h.app.task_detail_store();

    detail
        .send(TaskDetailAction::Start {
            task_id: TaskId::new("missing"),
        })
        .await
        .unwrap();
    let state = settle(&detail, |s| !s.is_loading).await;

    assert!(!state.is_data_available());
    assert_eq!(state.user_message, Some(UserMessage::LoadingTaskError));
}

#[tokio::test]
async fn shutdown_stops_observers() {
    let h = harness(fixtures::mixed_tasks(1, 0), Vec::new()).await;
    let statistics = h.app.statistics_store();

    statistics.send(StatisticsAction::Start).await.unwrap();
    settle(&statistics, |s| !s.is_loading).await;

    statistics
        .shutdown(h.app.config().shutdown_timeout())
        .await
        .unwrap();
    assert!(statistics.is_shutting_down());
    assert!(statistics.send(StatisticsAction::Refresh).await.is_err());
}

#[tokio::test]
async fn detail_ignores_the_task_it_showed_before() {
    let a = fixtures::task("a");
    let b = fixtures::task("b");
    let h = harness(vec![a.clone(), b.clone()], Vec::new()).await;
    let detail = h.app.task_detail_store();
    let mut feedback = detail.subscribe_actions();

    detail
        .send(TaskDetailAction::Start {
            task_id: a.id.clone(),
        })
        .await
        .unwrap();
    detail
        .send(TaskDetailAction::Start {
            task_id: b.id.clone(),
        })
        .await
        .unwrap();
    settle(&detail, |s| s.task.as_ref().is_some_and(|t| t.id == b.id)).await;

    // The first subscription is still live and reports the change to `a`
    h.app.repository().complete_task(&a.id).await.unwrap();
    tokio::time::timeout(WAIT, async {
        loop {
            match feedback.recv().await {
                Ok(TaskDetailAction::TaskUpdated {
                    task_id,
                    result: Ok(Some(task)),
                }) if task_id == a.id && task.is_completed => break,
                Ok(_) | Err(RecvError::Lagged(_)) => {},
                Err(RecvError::Closed) => panic!("store dropped"),
            }
        }
    })
    .await
    .expect("update for the previous task was never observed");

    let state = detail.current_state();
    assert_eq!(state.task_id, Some(b.id.clone()));
    assert_eq!(state.task, Some(b));
    assert_eq!(state.user_message, None);
}

#[tokio::test]
async fn reopening_edit_for_another_task_keeps_its_own_draft() {
    let a = fixtures::task("a");
    let b = fixtures::task("b");
    let h = harness(vec![a.clone(), b.clone()], Vec::new()).await;
    let add = h.app.add_edit_store();

    add.send(AddEditTaskAction::Load {
        task_id: Some(a.id.clone()),
    })
    .await
    .unwrap();
    add.send(AddEditTaskAction::Load {
        task_id: Some(b.id.clone()),
    })
    .await
    .unwrap();
    let loaded = settle(&add, |s| !s.is_loading).await;
    assert_eq!(loaded.task_id, Some(b.id.clone()));
    assert_eq!(loaded.title, b.title);

    add.send(AddEditTaskAction::UpdateDescription("Only b changes".into()))
        .await
        .unwrap();
    add.send(AddEditTaskAction::Save).await.unwrap();
    settle(&add, |s| s.is_task_saved).await;

    let repository = h.app.repository();
    let stored_a = repository.get_task(&a.id, false).await.unwrap().unwrap();
    let stored_b = repository.get_task(&b.id, false).await.unwrap().unwrap();
    assert_eq!(stored_a, a);
    assert_eq!(stored_b.title, b.title);
    assert_eq!(stored_b.description, "Only b changes");
}
