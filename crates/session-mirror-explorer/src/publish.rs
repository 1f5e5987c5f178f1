//! Hand snapshot changes to the UI-affinity thread.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use session_mirror_session::UiDispatcher;

use crate::snapshot::SessionSnapshot;

/// Post every new snapshot to `sink` on the UI-affinity thread.
///
/// Snapshots replaced faster than the task observes them are skipped; the
/// sink always sees the latest one. The task ends when the mirror is dropped.
pub fn forward_to_ui<F>(
    mut snapshots: watch::Receiver<Arc<SessionSnapshot>>,
    dispatcher: Arc<dyn UiDispatcher>,
    sink: F,
) -> JoinHandle<()>
where
    F: Fn(Arc<SessionSnapshot>) + Send + Sync + 'static,
{
    let sink = Arc::new(sink);

    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = Arc::clone(&snapshots.borrow_and_update());
            debug!(
                "Posting snapshot generation {} to UI thread",
                snapshot.generation()
            );

            let sink = Arc::clone(&sink);
            dispatcher.post(Box::new(move || sink(snapshot)));
        }
    })
}
