//! Scripted in-memory evaluation session.
//!
//! Answers from canned replies keyed by expression, counts calls, and lets
//! tests inject latency, failures and calls that never complete.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::debug;

use session_mirror_core::{EvalError, EvalResult, StackFrame, ValueDescriptor};

use crate::session::{ChildrenRequest, EvaluateRequest, EvaluationSession, SessionEvent};

const DEFAULT_GLOBAL_EXPRESSION: &str = "base::environment()";
const EVENT_CAPACITY: usize = 16;

/// Canned answer for an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Expression evaluates to a value with these children
    Children(Vec<ValueDescriptor>),
    /// Expression fails
    Fail(EvalError),
    /// Call never completes unless cancelled
    Hang,
}

/// Fixture format accepted by [`ScriptedSession::from_json`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScriptedFixture {
    global_expression: Option<String>,
    frames: Option<Vec<StackFrame>>,
    globals: Vec<ValueDescriptor>,
    children: HashMap<String, Vec<ValueDescriptor>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Evaluation session answering from canned replies.
#[derive(Debug)]
pub struct ScriptedSession {
    running: AtomicBool,
    global_expression: String,
    frames: Mutex<EvalResult<Vec<StackFrame>>>,
    replies: Mutex<HashMap<String, ScriptedReply>>,
    evaluate_delay: Mutex<Duration>,
    children_requests: Mutex<Vec<ChildrenRequest>>,
    events: broadcast::Sender<SessionEvent>,
    stack_frame_calls: AtomicUsize,
    evaluate_calls: AtomicUsize,
    children_calls: AtomicUsize,
}

impl ScriptedSession {
    /// Create a running session with a single global frame and no variables.
    pub fn new() -> Self {
        Self::with_global_expression(DEFAULT_GLOBAL_EXPRESSION)
    }

    /// Create a session whose global environment is reached via `expression`.
    pub fn with_global_expression(expression: impl Into<String>) -> Self {
        let global_expression = expression.into();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let mut replies = HashMap::new();
        replies.insert(global_expression.clone(), ScriptedReply::Children(Vec::new()));

        Self {
            running: AtomicBool::new(true),
            global_expression,
            frames: Mutex::new(Ok(vec![StackFrame::new(0, true).with_call("<toplevel>")])),
            replies: Mutex::new(replies),
            evaluate_delay: Mutex::new(Duration::ZERO),
            children_requests: Mutex::new(Vec::new()),
            events,
            stack_frame_calls: AtomicUsize::new(0),
            evaluate_calls: AtomicUsize::new(0),
            children_calls: AtomicUsize::new(0),
        }
    }

    /// Build a session from a JSON fixture.
    ///
    /// ```
    /// use session_mirror_session::ScriptedSession;
    ///
    /// let session = ScriptedSession::from_json(r#"{
    ///     "globals": [{"name": "x", "type_name": "double"}],
    ///     "children": {"lst": [{"name": "$a", "accessor_kind": "dollar"}]}
    /// }"#).unwrap();
    /// assert!(session.has_reply("lst"));
    /// ```
    pub fn from_json(json: &str) -> session_mirror_core::Result<Self> {
        let fixture: ScriptedFixture = serde_json::from_str(json)?;

        let session = match fixture.global_expression {
            Some(expression) => Self::with_global_expression(expression),
            None => Self::new(),
        };
        if let Some(frames) = fixture.frames {
            session.set_frames(frames);
        }
        session.set_globals(fixture.globals);
        for (expression, children) in fixture.children {
            session.set_reply(expression, ScriptedReply::Children(children));
        }

        Ok(session)
    }

    /// Expression used for the global environment.
    pub fn global_expression(&self) -> &str {
        &self.global_expression
    }

    /// Mark the remote process as running or stopped.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Replace the call stack.
    pub fn set_frames(&self, frames: Vec<StackFrame>) {
        *lock(&self.frames) = Ok(frames);
    }

    /// Make stack frame enumeration fail.
    pub fn fail_frames(&self, error: EvalError) {
        *lock(&self.frames) = Err(error);
    }

    /// Replace the variables of the global environment, in order.
    pub fn set_globals(&self, globals: Vec<ValueDescriptor>) {
        let expression = self.global_expression.clone();
        self.set_reply(expression, ScriptedReply::Children(globals));
    }

    /// Set the reply for an expression.
    pub fn set_reply(&self, expression: impl Into<String>, reply: ScriptedReply) {
        lock(&self.replies).insert(expression.into(), reply);
    }

    /// Whether a reply exists for an expression.
    pub fn has_reply(&self, expression: &str) -> bool {
        lock(&self.replies).contains_key(expression)
    }

    /// Delay every `evaluate_and_describe` call.
    pub fn set_evaluate_delay(&self, delay: Duration) {
        *lock(&self.evaluate_delay) = delay;
    }

    /// Publish a mutation notification.
    pub fn notify_mutation(&self) {
        // No subscribers is fine
        let _ = self.events.send(SessionEvent::Mutated);
    }

    /// Stop the session and publish a termination notification.
    pub fn terminate(&self) {
        self.set_running(false);
        let _ = self.events.send(SessionEvent::Terminated);
    }

    /// Number of `stack_frames` calls so far.
    pub fn stack_frame_calls(&self) -> usize {
        self.stack_frame_calls.load(Ordering::SeqCst)
    }

    /// Number of `evaluate_and_describe` calls so far.
    pub fn evaluate_calls(&self) -> usize {
        self.evaluate_calls.load(Ordering::SeqCst)
    }

    /// Number of `describe_children` calls so far.
    pub fn children_calls(&self) -> usize {
        self.children_calls.load(Ordering::SeqCst)
    }

    /// Every `describe_children` request received, in order.
    pub fn children_requests(&self) -> Vec<ChildrenRequest> {
        lock(&self.children_requests).clone()
    }

    fn reply_for(&self, expression: &str) -> Option<ScriptedReply> {
        lock(&self.replies).get(expression).cloned()
    }
}

impl Default for ScriptedSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EvaluationSession for ScriptedSession {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn stack_frames(&self) -> EvalResult<Vec<StackFrame>> {
        self.stack_frame_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.frames).clone()
    }

    async fn evaluate_and_describe(&self, request: EvaluateRequest) -> EvalResult<ValueDescriptor> {
        self.evaluate_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *lock(&self.evaluate_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match self.reply_for(&request.expression) {
            Some(ScriptedReply::Children(children)) => Ok(ValueDescriptor {
                name: request.display_name,
                expression: Some(request.expression),
                type_name: Some("environment".to_string()),
                length: Some(children.len() as u64),
                has_children: !children.is_empty(),
                ..ValueDescriptor::default()
            }),
            Some(ScriptedReply::Fail(error)) => Err(error),
            Some(ScriptedReply::Hang) => std::future::pending().await,
            None => Err(EvalError::Evaluation(format!(
                "object '{}' not found",
                request.expression
            ))),
        }
    }

    async fn describe_children(
        &self,
        request: ChildrenRequest,
    ) -> EvalResult<Vec<ValueDescriptor>> {
        self.children_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.children_requests).push(request.clone());
        debug!("Scripted describe_children: expression='{}'", request.expression);

        match self.reply_for(&request.expression) {
            Some(ScriptedReply::Children(children)) => Ok(children
                .into_iter()
                .filter(|child| match &request.filter {
                    Some(filter) => child.name.contains(filter.as_str()),
                    None => true,
                })
                .take(request.max_count.unwrap_or(usize::MAX))
                .collect()),
            Some(ScriptedReply::Fail(error)) => Err(error),
            Some(ScriptedReply::Hang) => {
                request.cancel.cancelled().await;
                Err(EvalError::Cancelled)
            }
            None => Err(EvalError::Evaluation(format!(
                "object '{}' not found",
                request.expression
            ))),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
