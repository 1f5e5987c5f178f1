//! Callback bridge to the UI host.
//!
//! UI-owned resources may only be touched from the UI-affinity thread. The
//! mirror hands work over through a [`UiDispatcher`]; every posted task runs
//! exactly once, in submission order, on that thread.

use std::thread::{self, JoinHandle, ThreadId};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use session_mirror_core::{Error, Result};

/// Unit of work executed on the UI-affinity thread.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Dispatch onto the UI-affinity thread.
pub trait UiDispatcher: Send + Sync {
    /// Queue a task. Fire-and-forget; tasks run in submission order.
    fn post(&self, task: UiTask);

    /// Whether the caller is already on the UI-affinity thread.
    fn is_ui_thread(&self) -> bool;
}

/// Run a closure on the UI-affinity thread and wait for its result.
///
/// Runs inline when already on that thread.
pub async fn invoke<D, F, R>(dispatcher: &D, f: F) -> Result<R>
where
    D: UiDispatcher + ?Sized,
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if dispatcher.is_ui_thread() {
        return Ok(f());
    }

    let (tx, rx) = oneshot::channel();
    dispatcher.post(Box::new(move || {
        let _ = tx.send(f());
    }));
    rx.await.map_err(|_| Error::DispatcherClosed)
}

/// Dispatcher backed by a dedicated OS thread draining an ordered queue.
///
/// The thread exits once every clone of the dispatcher is dropped.
#[derive(Debug, Clone)]
pub struct TaskDispatcher {
    tx: mpsc::UnboundedSender<UiTask>,
    thread_id: ThreadId,
}

impl TaskDispatcher {
    /// Spawn the UI-affinity thread.
    pub fn spawn(name: &str) -> Result<(Self, JoinHandle<()>)> {
        let (tx, mut rx) = mpsc::unbounded_channel::<UiTask>();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!("UI dispatcher thread started");
                while let Some(task) = rx.blocking_recv() {
                    task();
                }
                debug!("UI dispatcher thread stopped");
            })?;

        let thread_id = handle.thread().id();
        Ok((Self { tx, thread_id }, handle))
    }
}

impl UiDispatcher for TaskDispatcher {
    fn post(&self, task: UiTask) {
        if self.tx.send(task).is_err() {
            warn!("UI dispatcher closed, dropping task");
        }
    }

    fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_tasks_run_in_order() {
        let (dispatcher, handle) = TaskDispatcher::spawn("ui-test").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..50 {
            let seen = Arc::clone(&seen);
            dispatcher.post(Box::new(move || seen.lock().unwrap().push(i)));
        }

        drop(dispatcher);
        handle.join().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, (0..50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_invoke_runs_on_ui_thread() {
        let (dispatcher, _handle) = TaskDispatcher::spawn("ui-invoke").unwrap();

        assert!(!dispatcher.is_ui_thread());

        let name = invoke(&dispatcher, || {
            thread::current().name().map(str::to_string)
        })
        .await
        .unwrap();
        assert_eq!(name.as_deref(), Some("ui-invoke"));

        let probe = dispatcher.clone();
        let on_ui = invoke(&dispatcher, move || probe.is_ui_thread()).await.unwrap();
        assert!(on_ui);
    }

    #[tokio::test]
    async fn test_invoke_returns_value() {
        let (dispatcher, _handle) = TaskDispatcher::spawn("ui-value").unwrap();
        let value = invoke(&dispatcher, || 6 * 7).await.unwrap();
        assert_eq!(value, 42);
    }

    struct DroppingDispatcher;

    impl UiDispatcher for DroppingDispatcher {
        fn post(&self, _task: UiTask) {}

        fn is_ui_thread(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_invoke_reports_closed_dispatcher() {
        let result = invoke(&DroppingDispatcher, || ()).await;
        assert!(matches!(result, Err(Error::DispatcherClosed)));
    }
}
