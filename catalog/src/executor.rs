//! Async action executor.
//!
//! Wraps one remote call in the three-phase lifecycle. A command arm returns
//! [`start`]'s effects: an `Effect::Send` of the `Pending` event, which the
//! store folds and publishes before any call starts, then the future built
//! by [`execute`]. When the call settles the effect yields exactly one
//! action: the fulfilled event on success, the rejected event on failure.
//! Nothing is retried; a retry is a fresh command from the caller.
//!
//! Because the store folds feedback actions as they settle, concurrent
//! invocations are reconciled in settlement order, not invocation order.

use crate::error::GatewayError;
use crate::operation::Operation;
use catalog_sync_core::effect::Effect;
use catalog_sync_core::{smallvec, SmallVec};
use std::future::Future;
use std::time::Instant;

/// Build the effect that drives `call` to exactly one terminal action.
///
/// On failure the rejected event receives the server's most specific
/// detail, or `operation`'s fallback message when the reply is unusable.
pub fn execute<T, A, Fut, F, R>(
    operation: Operation,
    call: Fut,
    fulfilled: F,
    rejected: R,
) -> Effect<A>
where
    Fut: Future<Output = Result<T, GatewayError>> + Send + 'static,
    F: FnOnce(T) -> A + Send + 'static,
    R: FnOnce(String) -> A + Send + 'static,
    T: Send + 'static,
    A: Send + 'static,
{
    Effect::Future(Box::pin(async move {
        let started = Instant::now();
        let outcome = call.await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let action = match outcome {
            Ok(value) => {
                tracing::debug!(operation = operation.name(), elapsed_ms, "fulfilled");
                fulfilled(value)
            },
            Err(error) => {
                let message = error.user_message(operation);
                tracing::warn!(
                    operation = operation.name(),
                    elapsed_ms,
                    %error,
                    message = %message,
                    "rejected"
                );
                rejected(message)
            },
        };
        Some(action)
    }))
}

/// Effects of a command: its `Pending` event, then the call.
pub fn start<A>(pending: A, call: Effect<A>) -> SmallVec<[Effect<A>; 4]> {
    smallvec![Effect::Send(pending), call]
}

/// Log the `Pending` transition of `operation`.
pub fn pending(operation: Operation) {
    tracing::debug!(operation = operation.name(), "pending");
}
