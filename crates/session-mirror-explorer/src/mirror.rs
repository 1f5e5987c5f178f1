//! Session mirror: keeps a snapshot of the session's global variables.
//!
//! The mirror is either Idle or Refreshing. A mutation notification received
//! while Idle starts a refresh; one received while Refreshing is dropped. The
//! next notification after the refresh brings the snapshot up to date again.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use session_mirror_core::{EvalError, MirrorSettings, PropertyFlags, Representation, ValueDescriptor};
use session_mirror_session::{
    ChildrenRequest, Environment, EvaluateRequest, EvaluationSession, SessionEvent,
};

use crate::snapshot::SessionSnapshot;

/// Why a refresh did or did not replace the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Snapshot replaced
    Refreshed {
        /// Generation of the new snapshot
        generation: u64,
        /// Number of variables in it
        count: usize,
    },
    /// Another refresh was in flight
    Skipped,
    /// Remote session is not running
    NotRunning,
    /// No stack frame is flagged global
    NoGlobalFrame,
    /// A remote call failed
    Failed(EvalError),
}

/// Marks a refresh in flight; clears the flag when dropped.
struct RefreshGuard {
    flag: Arc<AtomicBool>,
}

impl RefreshGuard {
    fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Mirror of a session's global variables.
pub struct SessionMirror {
    session: Arc<dyn EvaluationSession>,
    settings: MirrorSettings,
    refreshing: Arc<AtomicBool>,
    generation: AtomicU64,
    refresh_runs: AtomicUsize,
    snapshot: watch::Sender<Arc<SessionSnapshot>>,
}

impl std::fmt::Debug for SessionMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMirror")
            .field("settings", &self.settings)
            .field("refreshing", &self.is_refreshing())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl SessionMirror {
    /// Create a mirror over `session` with an empty snapshot.
    pub fn new(session: Arc<dyn EvaluationSession>, settings: MirrorSettings) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(SessionSnapshot::empty()));
        Self {
            session,
            settings,
            refreshing: Arc::new(AtomicBool::new(false)),
            generation: AtomicU64::new(0),
            refresh_runs: AtomicUsize::new(0),
            snapshot,
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    /// Receive every snapshot replacement.
    pub fn subscribe_snapshots(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.snapshot.subscribe()
    }

    /// Whether a refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Number of refreshes that actually started (skipped ones excluded).
    pub fn refresh_runs(&self) -> usize {
        self.refresh_runs.load(Ordering::SeqCst)
    }

    /// Refresh now, unless a refresh is already in flight.
    pub async fn refresh(&self) -> RefreshOutcome {
        match RefreshGuard::try_acquire(&self.refreshing) {
            Some(guard) => self.run_refresh(guard).await,
            None => {
                debug!("Refresh already in flight, skipping");
                RefreshOutcome::Skipped
            }
        }
    }

    /// Start refreshing on every mutation notification of the session.
    ///
    /// Dropping the returned subscription stops listening.
    pub fn attach(self: &Arc<Self>) -> MirrorSubscription {
        let mut events = self.session.subscribe();
        let mirror = Arc::clone(self);

        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::Mutated) => mirror.on_mutation(),
                    Ok(SessionEvent::Terminated) => {
                        info!("Session terminated, mirror detached");
                        break;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Missed {} session notifications", skipped);
                        mirror.on_mutation();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        MirrorSubscription { handle }
    }

    /// Start a refresh in the background, or drop the notification.
    fn on_mutation(self: &Arc<Self>) {
        let Some(guard) = RefreshGuard::try_acquire(&self.refreshing) else {
            debug!("Mutation notification dropped, refresh in flight");
            return;
        };

        let mirror = Arc::clone(self);
        tokio::spawn(async move {
            mirror.run_refresh(guard).await;
        });
    }

    #[instrument(skip_all)]
    async fn run_refresh(&self, _guard: RefreshGuard) -> RefreshOutcome {
        self.refresh_runs.fetch_add(1, Ordering::SeqCst);

        if !self.session.is_running() {
            debug!("Session not running, snapshot unchanged");
            return RefreshOutcome::NotRunning;
        }

        let globals = match self.load_globals().await {
            Ok(Some(globals)) => globals,
            Ok(None) => {
                debug!("No global frame on the stack, snapshot unchanged");
                return RefreshOutcome::NoGlobalFrame;
            }
            Err(e) => {
                warn!("Refresh failed, snapshot unchanged: {}", e);
                return RefreshOutcome::Failed(e);
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = SessionSnapshot::from_values(generation, &globals);
        let count = snapshot.len();
        self.snapshot.send_replace(Arc::new(snapshot));

        debug!("Snapshot replaced: generation={}, variables={}", generation, count);
        RefreshOutcome::Refreshed { generation, count }
    }

    /// Describe the children of the global environment.
    ///
    /// `Ok(None)` when no frame is flagged global.
    async fn load_globals(&self) -> Result<Option<Vec<ValueDescriptor>>, EvalError> {
        let frames = self.session.stack_frames().await?;
        let Some(frame) = frames.iter().find(|frame| frame.is_global) else {
            return Ok(None);
        };
        let environment = Environment::Frame(frame.index);
        let representation = Representation::Str {
            max_length: self.settings.representation_max_length,
        };

        let request = EvaluateRequest::new(
            self.settings.global_expression.clone(),
            self.settings.global_display_name.clone(),
        )
        .with_properties(PropertyFlags::GLOBAL_ENVIRONMENT)
        .with_representation(representation)
        .in_environment(environment);
        let global_env = self.session.evaluate_and_describe(request).await?;

        let expression = global_env
            .expression
            .unwrap_or_else(|| self.settings.global_expression.clone());
        let request = ChildrenRequest::new(expression, environment)
            .with_properties(PropertyFlags::GLOBAL_ENVIRONMENT)
            .with_representation(representation);
        let children = self.session.describe_children(request).await?;

        Ok(Some(children))
    }
}

/// Listener task started by [`SessionMirror::attach`]; aborted on drop.
#[derive(Debug)]
pub struct MirrorSubscription {
    handle: JoinHandle<()>,
}

impl MirrorSubscription {
    /// Whether the listener has stopped (session terminated or closed).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for MirrorSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
