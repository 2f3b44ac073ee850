//! Per-connection run queue.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

type QueuedRun = BoxFuture<'static, ()>;

/// Cancellation tokens and the ordered run queue of one connection.
///
/// Runs execute one at a time on a single worker task, in the order they
/// were enqueued. Every run gets a child of the current connection token. An
/// explicit cancel fires that token and installs a fresh one, so requests
/// that arrive afterwards start normally.
pub struct RunTracker {
    token: Mutex<CancellationToken>,
    queue: Mutex<Option<mpsc::UnboundedSender<QueuedRun>>>,
    backlog: Mutex<Option<mpsc::UnboundedReceiver<QueuedRun>>>,
    pending: Arc<AtomicUsize>,
    tasks: TaskTracker,
}

impl RunTracker {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            token: Mutex::new(CancellationToken::new()),
            queue: Mutex::new(Some(tx)),
            backlog: Mutex::new(Some(rx)),
            pending: Arc::new(AtomicUsize::new(0)),
            tasks: TaskTracker::new(),
        }
    }

    /// Token for a new run.
    pub fn child_token(&self) -> CancellationToken {
        self.token.lock().child_token()
    }

    /// Cancel the runs queued or started so far.
    pub fn cancel_runs(&self) {
        let previous = std::mem::replace(&mut *self.token.lock(), CancellationToken::new());
        previous.cancel();
    }

    /// Queue a run behind the ones already accepted.
    ///
    /// Returns false once the tracker has been closed by [`wait`](Self::wait)
    /// or [`shutdown`](Self::shutdown).
    pub fn enqueue<F>(&self, run: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let queue = self.queue.lock();
        let Some(tx) = queue.as_ref() else {
            return false;
        };

        // The worker starts with the first run.
        if let Some(rx) = self.backlog.lock().take() {
            self.tasks.spawn(drain(rx, self.pending.clone()));
        }

        self.pending.fetch_add(1, Ordering::AcqRel);
        if tx.send(Box::pin(run)).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return false;
        }
        true
    }

    /// Runs queued or executing.
    pub fn in_flight(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Stop accepting runs and wait for the queued ones to finish.
    pub async fn wait(&self) {
        self.queue.lock().take();
        self.tasks.close();
        self.tasks.wait().await;
    }

    /// Cancel everything and wait for the queue to drain.
    pub async fn shutdown(&self) {
        self.token.lock().cancel();
        self.wait().await;
    }
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

async fn drain(mut rx: mpsc::UnboundedReceiver<QueuedRun>, pending: Arc<AtomicUsize>) {
    while let Some(run) = rx.recv().await {
        run.await;
        pending.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_runs_replaces_token() {
        let tracker = RunTracker::new();
        let first = tracker.child_token();

        tracker.cancel_runs();
        let second = tracker.child_token();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_runs() {
        let tracker = RunTracker::new();
        let token = tracker.child_token();
        assert!(tracker.enqueue(async move {
            token.cancelled().await;
            tokio::time::sleep(Duration::from_millis(10)).await;
        }));
        assert_eq!(tracker.in_flight(), 1);

        tokio::time::timeout(Duration::from_secs(1), tracker.shutdown())
            .await
            .unwrap();
        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_runs_execute_in_enqueue_order() {
        let tracker = Arc::new(RunTracker::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let producer = {
            let tracker = tracker.clone();
            let order = order.clone();
            tokio::spawn(async move {
                for (id, delay) in [(0, 30), (1, 10), (2, 0)] {
                    let order = order.clone();
                    tracker.enqueue(async move {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        order.lock().push(id);
                    });
                }
            })
        };
        producer.await.unwrap();
        tracker.wait().await;

        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_enqueue_after_wait_is_rejected() {
        let tracker = RunTracker::new();
        tracker.wait().await;
        assert!(!tracker.enqueue(async {}));
        assert_eq!(tracker.in_flight(), 0);
    }
}
