//! Error taxonomy shared by all tool operations.

use thiserror::Error;

/// Classified failure of a tool operation.
///
/// Every variant carries a fully formed, client-facing message. The message is
/// built once at the failure site and never reformatted on the way out, so
/// nothing is lost between the failing syscall and the wire.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A referenced file or directory does not exist.
    #[error("{0}")]
    NotFound(String),
    /// A request parameter failed validation before any work started.
    #[error("{0}")]
    InvalidInput(String),
    /// An external command exceeded its wall-clock budget and was killed.
    #[error("{0}")]
    Timeout(String),
    /// An OS-level or otherwise unexpected failure.
    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    /// Stable lowercase category name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::NotFound(_) => "not_found",
            ToolError::InvalidInput(_) => "invalid_input",
            ToolError::Timeout(_) => "timeout",
            ToolError::Internal(_) => "internal",
        }
    }
}
