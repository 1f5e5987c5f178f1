//! # session-mirror-explorer
//!
//! Variable explorer and member completion for a remote evaluation session.
//!
//! This crate provides:
//! - [`SessionMirror`]: keeps a snapshot of the session's global variables
//!   fresh as mutation notifications arrive
//! - [`CompletionResolver`]: answers member completion queries such as
//!   `df$co`, from the snapshot or through a bounded remote call
//! - Forwarding of snapshot changes onto the UI-affinity thread
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on session-mirror-core
//! and session-mirror-session.
//!
//! No failure of the remote session propagates out of this crate: the mirror
//! keeps its last good snapshot and completion answers with no candidates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod completion;
pub mod mirror;
pub mod publish;
pub mod snapshot;

// Re-export commonly used types
pub use completion::CompletionResolver;
pub use mirror::{MirrorSubscription, RefreshOutcome, SessionMirror};
pub use publish::forward_to_ui;
pub use snapshot::SessionSnapshot;
