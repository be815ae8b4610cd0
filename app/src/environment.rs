//! Dependencies shared by every screen reducer.

use std::sync::Arc;
use taskboard_repository::TasksRepository;

/// Environment injected into the screen reducers.
///
/// Cloning shares the repository.
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Data layer
    pub repository: Arc<dyn TasksRepository>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(repository: Arc<dyn TasksRepository>) -> Self {
        Self { repository }
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}
