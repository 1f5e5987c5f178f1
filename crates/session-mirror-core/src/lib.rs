//! # session-mirror-core
//!
//! Core types for the session mirror.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other session-mirror crates. It provides:
//!
//! - Variable and completion candidate types
//! - Accessor path parsing (`df$col`, `obj@slot`)
//! - Value shapes of the remote evaluation channel
//! - Configuration loading
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other session-mirror crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accessor;
pub mod config;
pub mod error;
pub mod eval;
pub mod variable;

// Re-export commonly used types
pub use accessor::{strip_selector, AccessorPath, PathScope, SELECTORS};
pub use config::{CompletionSettings, MirrorConfig, MirrorSettings};
pub use error::{Error, EvalError, EvalResult, Result};
pub use eval::{AccessorKind, PropertyFlags, Representation, StackFrame, ValueDescriptor};
pub use variable::{CompletionCandidate, VariableDescriptor, VariableKind};
