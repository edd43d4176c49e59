use crate::stdio::{BackendStream, forward_to_log};
use async_trait::async_trait;
use tokio::process::Child;
use tokio::sync::watch;
use tracing::{info, warn};

/// OS process identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::From)]
pub struct ProcessId(pub u32);

/// Status of a process
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessStatus {
    /// Process is currently running
    Running,
    /// Process exited with status information
    Exited(std::process::ExitStatus),
    /// Waiting on the process failed
    Failed(String),
    /// Process status is unknown
    Unknown,
}

impl ProcessStatus {
    /// Exit code, when the process exited normally
    pub fn code(&self) -> Option<i32> {
        match self {
            ProcessStatus::Exited(status) => status.code(),
            _ => None,
        }
    }
}

/// Result of a terminate request
#[derive(Debug, Clone, PartialEq)]
pub enum TerminationResult {
    /// The terminate signal was delivered
    Success,
    /// Process was not found (already exited)
    ProcessNotFound,
    /// Insufficient privileges
    AccessDenied,
    /// Delivery failed for another reason
    Failed(String),
}

/// Error types for process operations
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to spawn process: {0}")]
    SpawnFailed(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ProcessError {
    /// Classify the error from spawning `command`
    pub fn from_spawn(command: &str, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => {
                ProcessError::SpawnFailed(format!("{command} not found: {error}"))
            }
            std::io::ErrorKind::PermissionDenied => {
                ProcessError::PermissionDenied(format!("{command}: {error}"))
            }
            _ => ProcessError::IoError(error),
        }
    }
}

/// Trait representing a handle to a spawned backend process
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    /// Get the process ID (None if it was never known)
    fn get_pid(&self) -> Option<ProcessId>;

    /// Get the command that started this process
    fn get_command(&self) -> &str;

    /// Get the arguments passed to this process
    fn get_args(&self) -> &[String];

    /// Exit status if the process has already exited (non-blocking)
    fn exit_status(&self) -> Option<ProcessStatus>;

    /// Check if the process is still running
    async fn is_running(&self) -> bool;

    /// Wait for the process to exit
    async fn wait(&mut self) -> ProcessStatus;
}

/// Owns nothing but the observable side of a spawned child.
///
/// The child itself moves into a monitor task that forwards its stdout and stderr
/// to the log, reaps it and publishes the exit status. Platform handles wrap this
/// and add their own liveness checks and signal delivery by pid.
pub struct ChildMonitor {
    pid: Option<ProcessId>,
    command: String,
    args: Vec<String>,
    status: watch::Receiver<Option<ProcessStatus>>,
}

impl ChildMonitor {
    /// Must be called from within a tokio runtime.
    pub fn spawn(mut child: Child, command: String, args: Vec<String>) -> Self {
        let pid = child.id().map(ProcessId::from);

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(async move {
                if let Err(e) = forward_to_log(stdout, BackendStream::Stdout, pid).await {
                    warn!(pid = ?pid, error = %e, "Backend stdout forwarding stopped");
                }
            });
        }

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                if let Err(e) = forward_to_log(stderr, BackendStream::Stderr, pid).await {
                    warn!(pid = ?pid, error = %e, "Backend stderr forwarding stopped");
                }
            });
        }

        let (tx, rx) = watch::channel(None);
        tokio::spawn(async move {
            let status = match child.wait().await {
                Ok(status) => {
                    info!(pid = ?pid, status = %status, "Backend process exited");
                    ProcessStatus::Exited(status)
                }
                Err(e) => {
                    warn!(pid = ?pid, error = %e, "Failed to wait on backend process");
                    ProcessStatus::Failed(e.to_string())
                }
            };
            // Nobody listening is fine, the status is only informational.
            let _ = tx.send(Some(status));
        });

        Self {
            pid,
            command,
            args,
            status: rx,
        }
    }

    pub fn pid(&self) -> Option<ProcessId> {
        self.pid
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn exit_status(&self) -> Option<ProcessStatus> {
        self.status.borrow().clone()
    }

    pub fn has_exited(&self) -> bool {
        self.status.borrow().is_some()
    }

    pub async fn wait(&mut self) -> ProcessStatus {
        if let Ok(status) = self.status.wait_for(Option::is_some).await {
            if let Some(status) = status.clone() {
                return status;
            }
        }
        // Sender dropped without publishing, the monitor task is gone.
        self.status.borrow().clone().unwrap_or(ProcessStatus::Unknown)
    }
}
