//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when reducers describe repository calls
//! and observation subscriptions.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use taskboard_core::async_effect;
///
/// let repository = Arc::clone(&env.repository);
/// async_effect! {
///     let result = repository.refresh_tasks().await;
///     Some(TasksAction::RefreshFinished { error: result.err().map(|e| e.to_string()) })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use taskboard_core::delay;
///
/// delay! {
///     duration: MESSAGE_TIMEOUT,
///     action: TasksAction::MessageExpired { serial }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create an `Effect::Stream` that maps every item of a stream to an action
///
/// # Example
///
/// ```rust,ignore
/// use taskboard_core::observe;
///
/// observe! {
///     stream: WatchStream::new(repository.observe_tasks()),
///     map: |snapshot| TasksAction::TasksUpdated { result: snapshot }
/// }
/// ```
#[macro_export]
macro_rules! observe {
    (
        stream: $stream:expr,
        map: |$item:pat_param| $body:expr
    ) => {
        $crate::effect::Effect::Stream(::std::boxed::Box::pin(
            $crate::__private::StreamExt::map($stream, move |$item| $body),
        ))
    };
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)] // Test code

    use crate::effect::Effect;
    use std::time::Duration;

    #[derive(Clone, Debug)]
    enum TestAction {
        Loaded { value: i32 },
        MessageExpired,
    }

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::Loaded { value: 42 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }

    #[test]
    fn test_delay_macro() {
        let effect = delay! {
            duration: Duration::from_secs(4),
            action: TestAction::MessageExpired
        };

        assert!(matches!(effect, Effect::Delay { .. }));
    }

    #[test]
    fn test_observe_macro() {
        let effect = observe! {
            stream: futures::stream::iter(vec![1, 2, 3]),
            map: |value| TestAction::Loaded { value }
        };

        assert!(matches!(effect, Effect::Stream(_)));
    }

    #[test]
    fn async_effect_resolves_to_its_action() {
        let Effect::Future(future) = (async_effect! {
            Some(TestAction::Loaded { value: 7 })
        }) else {
            panic!("expected a future effect");
        };

        let action = tokio_test::block_on(future);
        assert!(matches!(action, Some(TestAction::Loaded { value: 7 })));
    }

    #[tokio::test]
    async fn observe_maps_every_item() {
        use futures::StreamExt;

        let Effect::Stream(stream) = (observe! {
            stream: futures::stream::iter(vec![1, 2, 3]),
            map: |value| TestAction::Loaded { value: value * 10 }
        }) else {
            panic!("expected a stream effect");
        };

        let values: Vec<i32> = stream
            .map(|action| match action {
                TestAction::Loaded { value } => value,
                TestAction::MessageExpired => 0,
            })
            .collect()
            .await;
        assert_eq!(values, vec![10, 20, 30]);
    }
}
