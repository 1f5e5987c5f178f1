//! Error types for the session mirror.

use thiserror::Error;

/// Failures of local setup and of the UI dispatcher.
///
/// Remote call failures are `EvalError`s and never escape the mirror or the
/// completion resolver.
#[derive(Debug, Error)]
pub enum Error {
    /// UI dispatcher stopped before running a task
    #[error("UI dispatcher is closed")]
    DispatcherClosed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Tagged failure of a single call on the remote evaluation channel.
///
/// Every variant is recoverable: the mirror keeps its last snapshot and the
/// completion resolver answers with an empty candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Call did not complete before its deadline
    #[error("Timeout waiting for remote evaluation after {0}ms")]
    Timeout(u64),

    /// Expression failed on the remote side
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Channel-level failure (disconnect, protocol error)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Caller abandoned the call
    #[error("Remote evaluation cancelled")]
    Cancelled,
}

/// Result type alias for remote channel calls.
pub type EvalResult<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_error() {
        let err = EvalError::Timeout(2000);
        assert_eq!(
            err.to_string(),
            "Timeout waiting for remote evaluation after 2000ms"
        );
    }

    #[test]
    fn test_evaluation_error() {
        let err = EvalError::Evaluation("object 'lst' not found".to_string());
        assert_eq!(err.to_string(), "Evaluation error: object 'lst' not found");
    }

    #[test]
    fn test_transport_error() {
        let err = EvalError::Transport("connection reset".to_string());
        assert_eq!(err.to_string(), "Transport error: connection reset");
    }

    #[test]
    fn test_cancelled_error() {
        assert_eq!(
            EvalError::Cancelled.to_string(),
            "Remote evaluation cancelled"
        );
    }

    #[test]
    fn test_dispatcher_closed_error() {
        assert_eq!(Error::DispatcherClosed.to_string(), "UI dispatcher is closed");
    }

    #[test]
    fn test_config_error() {
        let err = Error::Config("completion.timeout_ms must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: completion.timeout_ms must be > 0"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_errors_are_local_failures() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let errors = [
            Error::DispatcherClosed,
            Error::Io(io_err),
            Error::Config("bad".to_string()),
        ];

        // Exhaustive: remote failures stay in EvalError
        for err in errors {
            match err {
                Error::DispatcherClosed | Error::Io(_) | Error::Config(_) => {}
                Error::Serialization(_) => unreachable!(),
            }
        }
    }

    #[test]
    fn test_error_debug() {
        let err = Error::Config("test".to_string());
        let debug_str = format!("{err:?}");
        assert!(debug_str.contains("Config"));
    }
}
