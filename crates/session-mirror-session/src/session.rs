//! Remote evaluation session interface.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use session_mirror_core::{EvalResult, PropertyFlags, Representation, StackFrame, ValueDescriptor};

/// Notification published by an evaluation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Session state changed; mirrors may be stale
    Mutated,
    /// Session ended; no further events will follow
    Terminated,
}

/// Environment an expression is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// The session's global environment
    #[default]
    Global,
    /// The environment of a stack frame, by frame index
    Frame(usize),
}

/// Request to evaluate an expression and describe its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluateRequest {
    /// Expression text
    pub expression: String,
    /// Display name given to the resulting descriptor
    pub display_name: String,
    /// Properties to fill in
    pub properties: PropertyFlags,
    /// Representation hint
    pub representation: Representation,
    /// Environment to evaluate in
    pub environment: Environment,
}

impl EvaluateRequest {
    /// Create a request evaluating in the global environment.
    pub fn new(expression: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            display_name: display_name.into(),
            properties: PropertyFlags::empty(),
            representation: Representation::None,
            environment: Environment::Global,
        }
    }

    /// Set requested properties.
    pub fn with_properties(mut self, properties: PropertyFlags) -> Self {
        self.properties = properties;
        self
    }

    /// Set the representation hint.
    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    /// Set the environment.
    pub fn in_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }
}

/// Request to describe the children of a value.
///
/// `timeout` is the deadline the remote side should honour. The token lets
/// the caller abandon the call; implementations should stop waiting and
/// return `EvalError::Cancelled` once it fires.
#[derive(Debug, Clone)]
pub struct ChildrenRequest {
    /// Expression whose value is enumerated
    pub expression: String,
    /// Environment to evaluate in
    pub environment: Environment,
    /// Properties to fill in for each child
    pub properties: PropertyFlags,
    /// Representation hint for each child
    pub representation: Representation,
    /// Optional remote-side name filter. Completion leaves it unset and
    /// filters by prefix locally.
    pub filter: Option<String>,
    /// Maximum number of children, `None` for all
    pub max_count: Option<usize>,
    /// Deadline, `None` for no deadline
    pub timeout: Option<Duration>,
    /// Cancellation signal
    pub cancel: CancellationToken,
}

impl ChildrenRequest {
    /// Create an untruncated, unbounded request.
    pub fn new(expression: impl Into<String>, environment: Environment) -> Self {
        Self {
            expression: expression.into(),
            environment,
            properties: PropertyFlags::empty(),
            representation: Representation::None,
            filter: None,
            max_count: None,
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Set requested properties.
    pub fn with_properties(mut self, properties: PropertyFlags) -> Self {
        self.properties = properties;
        self
    }

    /// Set the representation hint.
    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    /// Cap the number of children.
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Only enumerate children whose name contains `filter`.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// A remote interactive evaluation session.
///
/// Every call can fail with a tagged [`EvalError`](session_mirror_core::EvalError);
/// callers in this workspace treat all of them as "no data".
#[async_trait]
pub trait EvaluationSession: Send + Sync {
    /// Whether the remote process is running. Must not block.
    fn is_running(&self) -> bool;

    /// Current call stack, outermost frame first.
    async fn stack_frames(&self) -> EvalResult<Vec<StackFrame>>;

    /// Evaluate an expression and describe its value.
    async fn evaluate_and_describe(&self, request: EvaluateRequest) -> EvalResult<ValueDescriptor>;

    /// Evaluate an expression and describe its children, in remote order.
    async fn describe_children(&self, request: ChildrenRequest)
        -> EvalResult<Vec<ValueDescriptor>>;

    /// Subscribe to session notifications.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}
