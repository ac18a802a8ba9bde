//! Bounded-concurrency batch runner.
//!
//! Items are pushed into an unbounded channel; `run` drains it and spawns one
//! handler task per item, but never more than `concurrency` at a time.

use crate::domain::DomainError;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Default number of simultaneous handler invocations (tunable via config).
pub const DEFAULT_SEND_CONCURRENCY: usize = 10;

/// Generic work queue with an async per-item handler.
///
/// The handler owns its error handling: the queue only knows that an item was
/// processed. A panicking handler is logged and still counts as processed.
pub struct BatchJobQueue<T, F> {
    handler: Arc<F>,
    concurrency: usize,
    tx: StdMutex<Option<mpsc::UnboundedSender<T>>>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<T>>>,
}

impl<T, F, Fut> BatchJobQueue<T, F>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    /// Create a queue. `concurrency` is clamped to at least 1.
    pub fn new(concurrency: usize, handler: F) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            handler: Arc::new(handler),
            concurrency: concurrency.max(1),
            tx: StdMutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Enqueue an item. Fails once `signal_eof` has been called.
    pub fn push(&self, item: T) -> Result<(), DomainError> {
        let guard = self.tx.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_ref() {
            Some(tx) => tx
                .send(item)
                .map_err(|_| DomainError::QueueClosed("receiver dropped".into())),
            None => Err(DomainError::QueueClosed("push after end of input".into())),
        }
    }

    /// Mark the end of input. `run` returns once everything pushed so far is processed.
    pub fn signal_eof(&self) {
        let mut guard = self.tx.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.take();
    }

    /// Drain the queue. Resolves after every handler has settled and `signal_eof`
    /// was called. Returns the number of processed items. Can be called once.
    pub async fn run(&self) -> Result<usize, DomainError> {
        let mut rx = self
            .rx
            .lock()
            .await
            .take()
            .ok_or_else(|| DomainError::QueueClosed("run already called".into()))?;

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut processed = 0usize;

        while let Some(item) = rx.recv().await {
            // Waiting for a permit here keeps the number of spawned tasks bounded too.
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| DomainError::QueueClosed(e.to_string()))?;
            let handler = Arc::clone(&self.handler);
            tasks.spawn(async move {
                let _permit = permit;
                (*handler)(item).await;
            });

            while let Some(res) = tasks.try_join_next() {
                processed += 1;
                if let Err(e) = res {
                    error!(error = %e, "batch handler panicked");
                }
            }
        }

        while let Some(res) = tasks.join_next().await {
            processed += 1;
            if let Err(e) = res {
                error!(error = %e, "batch handler panicked");
            }
        }

        debug!(processed, concurrency = self.concurrency, "batch queue drained");
        Ok(processed)
    }
}
