use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinHandle;

type Action = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Collapses bursts of calls into one run of `action`, `delay` after the
/// last call.
///
/// Each debouncer owns its own timer, so two debouncers never cancel each
/// other. Cancellation only reaches a call that is still waiting; once the
/// action has started it runs to completion. Must be called from within a
/// tokio runtime.
pub struct Debouncer {
    delay: Duration,
    action: Action,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            delay,
            action: Arc::new(move || action().boxed()),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn call(&self) {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(timer) = pending.take() {
            timer.abort();
        }

        let action = Arc::clone(&self.action);
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // detached so a later call() cannot abort a run in progress
            tokio::spawn(action());
        }));
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(timer) = pending.take() {
                timer.abort();
            }
        }
    }
}
