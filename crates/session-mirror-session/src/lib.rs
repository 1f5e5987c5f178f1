//! # session-mirror-session
//!
//! Boundary to the collaborators of the session mirror.
//!
//! This crate provides:
//! - The remote evaluation session interface and its request types
//! - Session mutation notifications
//! - The UI callback bridge (ordered dispatch onto a UI-affinity thread)
//! - A scripted in-memory session for tests and demos
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on session-mirror-core
//! and is consumed by the explorer (mirror + completion) layer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod scripted;
pub mod session;

// Re-export commonly used types
pub use bridge::{invoke, TaskDispatcher, UiDispatcher, UiTask};
pub use scripted::{ScriptedReply, ScriptedSession};
pub use session::{ChildrenRequest, Environment, EvaluateRequest, EvaluationSession, SessionEvent};
