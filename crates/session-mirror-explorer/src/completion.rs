//! Member completion over the mirror and the remote session.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use session_mirror_core::{
    strip_selector, AccessorPath, CompletionCandidate, CompletionSettings, EvalError, EvalResult,
    PathScope, PropertyFlags, ValueDescriptor, VariableKind,
};
use session_mirror_session::{ChildrenRequest, Environment, EvaluationSession};

use crate::mirror::SessionMirror;

/// Answers member completion queries.
///
/// Global queries (no `$`/`@`) are served from the mirror's snapshot without
/// touching the session. Nested queries evaluate the base expression
/// remotely, bounded by the configured timeout. Every failure yields an
/// empty candidate list.
pub struct CompletionResolver {
    mirror: Arc<SessionMirror>,
    session: Arc<dyn EvaluationSession>,
    settings: CompletionSettings,
}

impl std::fmt::Debug for CompletionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionResolver")
            .field("mirror", &self.mirror)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CompletionResolver {
    /// Create a resolver.
    pub fn new(
        mirror: Arc<SessionMirror>,
        session: Arc<dyn EvaluationSession>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            mirror,
            session,
            settings,
        }
    }

    /// Number of members available under `path`.
    ///
    /// Exact for the global scope. Any non-empty path reports the configured
    /// `nested_member_count`: the session has no cheap way to count members
    /// of an arbitrary expression.
    pub fn member_count(&self, path: &str) -> usize {
        if path.is_empty() {
            self.mirror.snapshot().len()
        } else {
            self.settings.nested_member_count
        }
    }

    /// Up to `max_count` completion candidates for `path`.
    ///
    /// Global scope returns visible variables in snapshot order and ignores
    /// any typed prefix; callers filter.
    #[instrument(skip(self, cancel))]
    pub async fn members(
        &self,
        path: &str,
        max_count: usize,
        cancel: &CancellationToken,
    ) -> Vec<CompletionCandidate> {
        let path = AccessorPath::parse(path);

        match path.scope() {
            PathScope::Global => self.global_members(max_count),
            PathScope::Degenerate => {
                debug!("Nothing to complete for '{}'", path.raw());
                Vec::new()
            }
            PathScope::Nested => match self.fetch_children(&path, cancel).await {
                Ok(children) => Self::shape_children(&path, children, max_count),
                Err(e) => {
                    debug!("No members for '{}': {}", path.raw(), e);
                    Vec::new()
                }
            },
        }
    }

    fn global_members(&self, max_count: usize) -> Vec<CompletionCandidate> {
        self.mirror
            .snapshot()
            .visible()
            .take(max_count)
            .map(CompletionCandidate::from)
            .collect()
    }

    /// Describe the children of the base expression, bounded by the timeout
    /// and by the caller's cancellation.
    async fn fetch_children(
        &self,
        path: &AccessorPath,
        cancel: &CancellationToken,
    ) -> EvalResult<Vec<ValueDescriptor>> {
        let base = path.base_expression().unwrap_or_default();
        let timeout = self.settings.timeout();
        let call_token = cancel.child_token();

        let request = ChildrenRequest::new(base, Environment::Global)
            .with_properties(PropertyFlags::MEMBER_COMPLETION)
            .with_max_count(self.settings.result_ceiling)
            .with_timeout(timeout)
            .with_cancellation(call_token.clone());
        let call = self.session.describe_children(request);

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(EvalError::Cancelled),
            outcome = tokio::time::timeout(timeout, call) => {
                outcome.unwrap_or(Err(EvalError::Timeout(self.settings.timeout_ms)))
            }
        };

        // Stop the remote side from working for a reader that left
        if result.is_err() {
            call_token.cancel();
        }
        result
    }

    /// Keep `$`/`@` members, strip their selector, filter by the typed
    /// prefix and cap the count.
    fn shape_children(
        path: &AccessorPath,
        children: Vec<ValueDescriptor>,
        max_count: usize,
    ) -> Vec<CompletionCandidate> {
        children
            .iter()
            .filter(|child| child.accessor_kind.is_named())
            .map(|child| strip_selector(&child.name))
            .filter(|name| path.matches(name))
            .take(max_count)
            .map(|name| CompletionCandidate::new(name, VariableKind::Variable))
            .collect()
    }
}
