use thiserror::Error;

pub mod log;
pub mod value;
pub use log::{LogLine, MessageLog, Severity, SharedLog};
pub use value::{Address, Binding, Number, Value, ValueKind};

/// Console specific error types.
///
/// Nothing here is fatal to the host: every variant degrades to a no-op
/// plus a log line, or to silence for [`ConsoleError::CompileIncomplete`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    #[error("unresolved path segment '{segment}'")]
    UnresolvedPath { segment: String },

    #[error("indirection chain deeper than {limit} levels")]
    DepthExhausted { limit: usize },

    #[error("incomplete input: {0}")]
    CompileIncomplete(String),

    #[error("{0}")]
    CompileError(String),

    #[error("{0}")]
    RuntimeError(String),

    #[error("no runtime bound")]
    NoRuntimeBound,

    #[error("binding '{name}' cannot be edited: {reason}")]
    Edit { name: String, reason: String },
}

impl ConsoleError {
    /// Whether the failure should stay out of the console log.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            ConsoleError::CompileIncomplete(_)
                | ConsoleError::UnresolvedPath { .. }
                | ConsoleError::DepthExhausted { .. }
        )
    }
}

pub type ConsoleResult<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_errors() {
        assert!(ConsoleError::CompileIncomplete("near <eof>".into()).is_silent());
        assert!(ConsoleError::DepthExhausted { limit: 10 }.is_silent());
        assert!(!ConsoleError::CompileError("oops".into()).is_silent());
        assert!(!ConsoleError::NoRuntimeBound.is_silent());
    }

    #[test]
    fn test_runtime_error_displays_message_verbatim() {
        let err = ConsoleError::RuntimeError("console:1: boom".into());
        assert_eq!(err.to_string(), "console:1: boom");
    }
}
