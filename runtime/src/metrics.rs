//! Metric names and descriptions.
//!
//! The Store and the repository record through the `metrics` facade. No
//! exporter is installed here; a binary that wants to scrape them installs a
//! recorder of its choice and then calls [`register_metrics`] so every series
//! carries a description.
//!
//! # Example
//!
//! ```rust,ignore
//! // after installing a recorder
//! taskboard_runtime::metrics::register_metrics();
//! ```

use metrics::{describe_counter, describe_histogram, Unit};

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Actions applied by any store
pub const STORE_COMMANDS_TOTAL: &str = "store.commands.total";
/// Reducer execution time
pub const STORE_REDUCER_DURATION: &str = "store.reducer.duration_seconds";
/// Effects returned per action
pub const STORE_EFFECTS_COUNT: &str = "store.effects.count";
/// Effects started, labelled by `type`
pub const STORE_EFFECTS_EXECUTED: &str = "store.effects.executed";
/// Actions rejected because the store was shutting down
pub const STORE_SHUTDOWN_REJECTED: &str = "store.shutdown.rejected_actions";
/// Remote mirrors that failed after a local write
pub const REPOSITORY_SYNC_FAILURES: &str = "repository.sync.failures";
/// Forced refreshes from the remote
pub const REPOSITORY_REFRESHES: &str = "repository.refreshes.total";

/// Register all metric descriptions.
///
/// Safe to call more than once and without a recorder installed.
pub fn register_metrics() {
    // Store
    describe_counter!(
        STORE_COMMANDS_TOTAL,
        "Total number of actions applied by stores"
    );
    describe_histogram!(
        STORE_REDUCER_DURATION,
        Unit::Seconds,
        "Time taken to run a reducer for one action"
    );
    describe_histogram!(
        STORE_EFFECTS_COUNT,
        Unit::Count,
        "Number of effects returned by a reducer for one action"
    );
    describe_counter!(
        STORE_EFFECTS_EXECUTED,
        "Total number of effects started, by effect type"
    );
    describe_counter!(
        STORE_SHUTDOWN_REJECTED,
        "Actions rejected because the store was shutting down"
    );

    // Repository
    describe_counter!(
        REPOSITORY_SYNC_FAILURES,
        "Remote mirror attempts that failed after a local write"
    );
    describe_counter!(
        REPOSITORY_REFRESHES,
        "Forced refreshes of local data from the remote"
    );
}
