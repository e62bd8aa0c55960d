//! # Catalog Sync Runtime
//!
//! The [`Store`] owns one state snapshot and folds actions into it, one at a
//! time. Reducers hand back effects; `Future` effects run on their own task
//! and whatever action they settle with is folded in turn.
//!
//! ## Ordering
//!
//! The write lock is the only fold queue. An effect's action is folded when
//! the effect *settles*, so two requests racing each other land in
//! settlement order rather than send order. `Send` effects are folded under
//! the same lock as the action that returned them, before any of its
//! futures start. Settled and sent actions are broadcast to observers right
//! after their fold, still under the lock, so observers see fold order.
//!
//! ## Example
//!
//! ```ignore
//! use catalog_sync_runtime::Store;
//!
//! let store = Store::new(initial_state, reducer, environment);
//!
//! let mut handle = store.send(Action::Load).await?;
//! handle.wait().await;
//!
//! let loaded = store.state(|s| s.items.len()).await;
//! ```

use catalog_sync_core::{effect::Effect, reducer::Reducer};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Store errors
pub mod error {
    use thiserror::Error;

    /// Failure of a store operation.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// `send()` was called after shutdown began.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Effects were still in flight when the shutdown deadline passed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// No matching action settled before the deadline.
        #[error("Timeout waiting for action")]
        Timeout,

        /// The action broadcast has no sender left.
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Completion handle for the effects started by one `send()`.
///
/// An effect counts as done once the action it settled with (if any) has
/// been folded, so after [`EffectHandle::wait`] the state already reflects
/// the result.
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    running: Arc<AtomicUsize>,
    settled: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let running = Arc::new(AtomicUsize::new(0));
        let (notifier, settled) = watch::channel(());

        let handle = Self {
            running: Arc::clone(&running),
            settled,
        };
        (handle, EffectTracking { running, notifier })
    }

    /// A handle with nothing to wait for.
    #[must_use]
    pub fn completed() -> Self {
        let (notifier, settled) = watch::channel(());
        let _ = notifier.send(());

        Self {
            running: Arc::new(AtomicUsize::new(0)),
            settled,
        }
    }

    /// Effects not yet settled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Wait until every effect has settled and been folded.
    pub async fn wait(&mut self) {
        while self.running.load(Ordering::SeqCst) > 0 {
            if self.settled.changed().await.is_err() {
                // Every tracker is gone, so nothing is left to decrement
                break;
            }
        }
    }

    /// [`EffectHandle::wait`] with a deadline.
    ///
    /// # Errors
    ///
    /// Returns `Err(())` if effects are still running after `timeout`.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), ()> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| ())
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Sender side of an [`EffectHandle`].
#[derive(Clone)]
struct EffectTracking {
    running: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    fn started(&self) {
        self.running.fetch_add(1, Ordering::SeqCst);
    }

    fn finished(&self) {
        if self.running.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Marks one tracked effect finished when dropped, panics included.
struct FinishGuard(EffectTracking);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.finished();
    }
}

/// Releases one slot of the store-wide in-flight count when dropped.
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The store
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicUsize, Duration, Effect, EffectHandle, EffectTracking,
        FinishGuard, InFlightGuard, Ordering, Reducer, RwLock, StoreError, VecDeque,
    };
    use std::future::Future;
    use std::pin::Pin;
    use tokio::sync::broadcast;

    type BoxedEffect<A> = Pin<Box<dyn Future<Output = Option<A>> + Send>>;

    const DEFAULT_BROADCAST_CAPACITY: usize = 16;
    const SHUTDOWN_POLL: Duration = Duration::from_millis(20);

    /// Single owner of a state snapshot.
    ///
    /// Cloning is cheap and every clone shares the same state, in-flight
    /// count and broadcast channel.
    ///
    /// # Type Parameters
    ///
    /// - `S`: state
    /// - `A`: action
    /// - `E`: environment handed to the reducer
    /// - `R`: reducer
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        in_flight: Arc<AtomicUsize>,
        /// Settled and sent actions, broadcast after their fold.
        observed: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Store with a 16-slot action broadcast.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(
                initial_state,
                reducer,
                environment,
                DEFAULT_BROADCAST_CAPACITY,
            )
        }

        /// Store whose action broadcast buffers `capacity` actions per
        /// observer.
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (observed, _) = broadcast::channel(capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                in_flight: Arc::new(AtomicUsize::new(0)),
                observed,
            }
        }

        /// Stop accepting actions and wait for in-flight effects.
        ///
        /// Nothing is cancelled. Effects that settle during the wait are still
        /// folded and broadcast.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] with the number of effects
        /// still running once `timeout` has passed.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);
            self.shutdown.store(true, Ordering::Release);

            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                let running = self.in_flight.load(Ordering::Acquire);
                if running == 0 {
                    tracing::info!("All effects settled, shutdown complete");
                    return Ok(());
                }

                if tokio::time::Instant::now() >= deadline {
                    tracing::error!(running, "Shutdown timed out with effects in flight");
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(running));
                }

                tokio::time::sleep(SHUTDOWN_POLL).await;
            }
        }

        /// Fold `action` and start the effects it returns.
        ///
        /// Returns once the effects are started, not settled; use the handle
        /// to wait for them. Concurrent sends queue on the write lock.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] after shutdown began.
        ///
        /// # Panics
        ///
        /// A panicking reducer panics the caller.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store.commands.total").increment(1);
            Ok(self.dispatch(action, false).await)
        }

        /// Fold an action and start its effects, ignoring the shutdown flag.
        ///
        /// `Send` effects are folded in the same write-lock hold, in the order
        /// they were returned. Every sent action, and `action` itself when
        /// `publish` is set, is broadcast before the lock is released. Futures
        /// start only after that.
        ///
        /// Settled effects feed back through here so that a result arriving
        /// during shutdown is still applied.
        async fn dispatch(&self, action: A, publish: bool) -> EffectHandle
        where
            R: Clone,
            E: Clone,
        {
            let (handle, tracking) = EffectHandle::new();

            let futures = {
                let mut state = self.state.write().await;
                let mut queue = VecDeque::from([(action, publish)]);
                let mut futures = Vec::new();

                while let Some((action, publish)) = queue.pop_front() {
                    let observed = publish.then(|| action.clone());
                    let started = std::time::Instant::now();
                    let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                    metrics::histogram!("store.reducer.duration_seconds")
                        .record(started.elapsed().as_secs_f64());

                    if let Some(action) = observed {
                        // No observers is fine
                        let _ = self.observed.send(action);
                    }

                    for effect in effects {
                        match effect {
                            Effect::None => {
                                metrics::counter!("store.effects.executed", "type" => "none")
                                    .increment(1);
                            },
                            Effect::Send(next) => {
                                metrics::counter!("store.effects.executed", "type" => "send")
                                    .increment(1);
                                queue.push_back((next, true));
                            },
                            Effect::Future(fut) => futures.push(fut),
                        }
                    }
                }
                futures
            };

            tracing::trace!(futures = futures.len(), "folded");
            for fut in futures {
                self.run(fut, &tracking);
            }
            handle
        }

        /// Send `action`, then wait for the first settled or sent action matching
        /// `predicate`.
        ///
        /// The subscription is taken before sending, so a result that settles
        /// immediately is not missed. The returned action is already folded.
        ///
        /// # Errors
        ///
        /// - [`StoreError::ShutdownInProgress`]: shutdown began
        /// - [`StoreError::Timeout`]: nothing matched within `timeout`
        /// - [`StoreError::ChannelClosed`]: the broadcast closed
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool,
        {
            let mut rx = self.observed.subscribe();
            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // A dropped match surfaces as a timeout
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Observe settled and sent actions, each after its fold and in fold
        /// order.
        ///
        /// Actions passed to `send` are not broadcast. A slow observer skips
        /// the oldest actions.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.observed.subscribe()
        }

        /// Project the current state under the read lock.
        ///
        /// ```ignore
        /// let count = store.state(|s| s.products.list.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Start one future effect on its own task.
        ///
        /// Its action is folded and broadcast through `dispatch`. A panic
        /// inside the future stays in that task.
        fn run(&self, fut: BoxedEffect<A>, tracking: &EffectTracking)
        where
            R: Clone,
            E: Clone,
        {
            metrics::counter!("store.effects.executed", "type" => "future").increment(1);

            tracking.started();
            let finish = FinishGuard(tracking.clone());
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            let in_flight = InFlightGuard(Arc::clone(&self.in_flight));
            let store = self.clone();

            tokio::spawn(async move {
                let _finish = finish;
                let _in_flight = in_flight;

                let Some(action) = fut.await else {
                    tracing::trace!("effect settled without an action");
                    return;
                };

                metrics::counter!("store.feedback.total").increment(1);
                let _ = store.dispatch(action, true).await;
            });
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                in_flight: Arc::clone(&self.in_flight),
                observed: self.observed.clone(),
            }
        }
    }
}

pub use store::Store;
