use crate::process::ProcessError;
use thiserror::Error;

/// Core error types for shell operations
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Backend process error: {0}")]
    Process(#[from] ProcessError),

    #[error("Window error: {0}")]
    Window(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ShellError {
    /// Errors the lifecycle logs and carries on from.
    ///
    /// Backend failures never stop the window from opening; a window that cannot be
    /// created or a broken configuration can't be recovered from.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ShellError::Process(_))
    }
}
