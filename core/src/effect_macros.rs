//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```
/// use catalog_sync_core::{async_effect, effect::Effect};
///
/// #[derive(Debug)]
/// enum Action {
///     Loaded(u32),
/// }
///
/// let effect: Effect<Action> = async_effect! {
///     Some(Action::Loaded(3))
/// };
/// assert!(matches!(effect, Effect::Future(_)));
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        AsyncResult { value: i32 },
    }

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::AsyncResult { value: 42 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }

    #[test]
    fn test_async_effect_captures_by_move() {
        let value = 9;
        let effect = async_effect! {
            Some(TestAction::AsyncResult { value })
        };

        let Effect::Future(fut) = effect else {
            unreachable!("async_effect! always builds a future effect");
        };
        let output = tokio_test::block_on(fut);
        assert_eq!(output, Some(TestAction::AsyncResult { value: 9 }));
    }
}
