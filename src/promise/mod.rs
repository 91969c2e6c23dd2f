//! Single-assignment future for in-flight request executions.


use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::error::{ClientError, ClientResult};
use crate::transport::Response;

/// Eventual result of one asynchronous execution.
///
/// Settlement is exactly-once: the first `resolve` or `reject` wins and
/// later calls are silently discarded, so racing settlers are safe. Handles
/// are cheap to clone, and every `wait` observes the same terminal value.
#[derive(Clone)]
pub struct Promise {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<State>,
    settled: Notify,
}

enum State {
    Pending,
    Settled(ClientResult<Response>),
}

impl Promise {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::Pending),
                settled: Notify::new(),
            }),
        }
    }

    /// Transitions to fulfilled; discarded if already settled.
    pub fn resolve(&self, response: Response) {
        self.settle(Ok(response));
    }

    /// Transitions to rejected; discarded if already settled.
    pub fn reject(&self, error: ClientError) {
        self.settle(Err(error));
    }

    fn settle(&self, outcome: ClientResult<Response>) {
        let mut state = match self.shared.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if matches!(*state, State::Pending) {
            *state = State::Settled(outcome);
            drop(state);
            self.shared.settled.notify_waiters();
        }
    }

    fn outcome(&self) -> Option<ClientResult<Response>> {
        let state = match self.shared.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        match &*state {
            State::Pending => None,
            State::Settled(outcome) => Some(outcome.clone()),
        }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.outcome().is_some()
    }

    /// Waits until settlement and returns the terminal value.
    ///
    /// Callable repeatedly and by multiple waiters; only the awaiting task
    /// is suspended, never the worker executing the request.
    ///
    /// # Errors
    ///
    /// Returns the rejection error once the promise is rejected.
    pub async fn wait(&self) -> ClientResult<Response> {
        loop {
            // Register before re-checking so a settlement between the check
            // and the await cannot be missed.
            let notified = self.shared.settled.notified();
            if let Some(outcome) = self.outcome() {
                return outcome;
            }
            notified.await;
        }
    }

    /// Derived promise that applies `map` once this one fulfills.
    ///
    /// The continuation runs on its own task and never blocks the caller;
    /// rejection skips `map` and propagates to the derived promise.
    #[must_use]
    pub fn then<F>(&self, map: F) -> Promise
    where
        F: FnOnce(Response) -> ClientResult<Response> + Send + 'static,
    {
        let derived = Promise::new();
        let source = self.clone();
        let target = derived.clone();
        drop(tokio::spawn(async move {
            match source.wait().await {
                Ok(response) => match map(response) {
                    Ok(mapped) => target.resolve(mapped),
                    Err(err) => target.reject(err),
                },
                Err(err) => target.reject(err),
            }
        }));
        derived
    }

    /// Mirror of [`Promise::then`] for the rejection path.
    ///
    /// Fulfillment passes through untouched; on rejection the transformed
    /// error becomes the derived promise's rejection.
    #[must_use]
    pub fn catch<F>(&self, map: F) -> Promise
    where
        F: FnOnce(ClientError) -> ClientError + Send + 'static,
    {
        let derived = Promise::new();
        let source = self.clone();
        let target = derived.clone();
        drop(tokio::spawn(async move {
            match source.wait().await {
                Ok(response) => target.resolve(response),
                Err(err) => target.reject(map(err)),
            }
        }));
        derived
    }
}

impl Default for Promise {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Promise")
            .field("settled", &self.is_settled())
            .finish()
    }
}
