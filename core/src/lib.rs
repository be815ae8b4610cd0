//! # Taskboard Core
//!
//! Core traits and types for Taskboard, a reducer-driven to-do manager.
//!
//! This crate provides the fundamental abstractions every screen and data
//! component builds on:
//!
//! - **State**: Immutable-by-convention UI snapshot for one screen
//! - **Action**: All possible inputs to a reducer (user intents and effect feedback)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! It also owns the domain model ([`task`]) and the seams the data layer is
//! built on ([`data_source`]), so that fakes in `taskboard-testing` and the
//! SQLite store in `taskboard-sqlite` implement the same traits.
//!
//! ## Architecture Principles
//!
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O in reducers)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```ignore
//! use taskboard_core::*;
//!
//! impl Reducer for TasksReducer {
//!     type State = TasksState;
//!     type Action = TasksAction;
//!     type Environment = TodoEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut TasksState,
//!         action: TasksAction,
//!         env: &TodoEnvironment,
//!     ) -> SmallVec<[Effect<TasksAction>; 4]> {
//!         // Screen logic goes here
//!         SmallVec::new()
//!     }
//! }
//! ```

pub use smallvec::{smallvec, SmallVec};

#[doc(hidden)]
pub mod __private {
    pub use futures::StreamExt;
}

/// Declarative helpers for building effects
mod effect_macros;

/// Task model, filters and statistics
pub mod task;

/// Local and remote data-source traits
pub mod data_source;

/// Reducer module - The core trait for screen logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all presentation logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for screen logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The UI state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for StatisticsReducer {
    ///     type State = StatisticsState;
    ///     type Action = StatisticsAction;
    ///     type Environment = TodoEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut StatisticsState,
    ///         action: StatisticsAction,
    ///         env: &TodoEnvironment,
    ///     ) -> SmallVec<[Effect<StatisticsAction>; 4]> {
    ///         match action {
    ///             StatisticsAction::Refresh => {
    ///                 state.is_loading = true;
    ///                 smallvec![refresh_effect(env)]
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Updates state in place
        /// 2. Returns effect descriptions to be executed
        ///
        /// Reducers must not perform I/O and must not panic. Failures of the
        /// work they describe come back later as actions.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use futures::Stream;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Long-lived subscription
        ///
        /// Every item is fed back into the reducer in order. The subscription
        /// ends when the stream ends or the store shuts down.
        Stream(Pin<Box<dyn Stream<Item = Action> + Send>>),
    }

    // Manual Debug implementation since Future and Stream don't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Stream(_) => write!(f, "Effect::Stream(<stream>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Returns true for the no-op effect
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use crate::task::TaskId;

    /// Source of fresh task identifiers
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - random UUIDs
    /// let ids = UuidGenerator;
    ///
    /// // Test - predictable "task-1", "task-2", ...
    /// let ids = SequentialIdGenerator::new("task");
    /// ```
    pub trait IdGenerator: Send + Sync {
        /// Produce an identifier that has not been handed out before
        fn next_id(&self) -> TaskId;
    }

    /// Random UUID v4 identifiers
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UuidGenerator;

    impl IdGenerator for UuidGenerator {
        fn next_id(&self) -> TaskId {
            TaskId::new(uuid::Uuid::new_v4().to_string())
        }
    }
}
