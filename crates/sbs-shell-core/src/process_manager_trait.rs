use crate::config::BackendConfig;
use crate::process::{ProcessError, ProcessHandle, TerminationResult};
use async_trait::async_trait;

/// Starts and stops the backend process.
///
/// Implemented once per platform. There is exactly one spawn and at most one
/// terminate per handle: no restart, no escalation and no confirmation that the
/// process actually went away.
///
/// ```rust,no_run
/// use anyhow::Result;
/// use sbs_shell_core::{BackendConfig, BackendProcessManager};
///
/// async fn example_usage<M: BackendProcessManager>() -> Result<()> {
///     let config = BackendConfig::builder()
///         .interpreter("python3")
///         .script("side_by_side.py")
///         .build()?;
///
///     let manager = M::new(&config);
///     let mut backend = manager.start_backend().await?;
///
///     // ... the window talks to the backend over HTTP ...
///
///     manager.terminate(&mut backend).await;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait BackendProcessManager: Send + Sync {
    /// The type of process handle returned by this process manager
    type Handle: ProcessHandle;

    /// Create a manager for the given backend configuration
    fn new(config: &BackendConfig) -> Self
    where
        Self: Sized;

    /// Spawn `<interpreter> <script>` with its stdout and stderr forwarded to the log.
    ///
    /// A missing interpreter is reported as [`ProcessError::SpawnFailed`], one that
    /// can't be executed as [`ProcessError::PermissionDenied`].
    async fn start_backend(&self) -> Result<Self::Handle, ProcessError>;

    /// Send a single terminate request to the backend
    async fn terminate(&self, handle: &mut Self::Handle) -> TerminationResult;

    /// Platform name for logging
    fn platform_name(&self) -> &'static str;
}

/// Factory trait for creating platform-specific BackendProcessManager implementations
pub trait BackendProcessManagerFactory {
    /// The type of process manager this factory creates
    type Manager: BackendProcessManager;

    fn create_process_manager(config: &BackendConfig) -> Self::Manager;
}
