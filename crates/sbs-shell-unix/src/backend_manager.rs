use crate::unix_process_manager::{UnixProcessHandle, UnixProcessManager};
use async_trait::async_trait;
use sbs_shell_core::{
    BackendConfig, BackendProcessManager, BackendProcessManagerFactory, ProcessError,
    ProcessHandle, TerminationResult,
};
use tracing::debug;

/// Unix implementation of the BackendProcessManager trait
pub struct UnixBackendManager {
    platform_manager: UnixProcessManager,
    config: BackendConfig,
}

#[async_trait]
impl BackendProcessManager for UnixBackendManager {
    type Handle = UnixProcessHandle;

    fn new(config: &BackendConfig) -> Self {
        Self {
            platform_manager: UnixProcessManager::new(),
            config: config.clone(),
        }
    }

    async fn start_backend(&self) -> Result<Self::Handle, ProcessError> {
        debug!(
            name = %self.config.name,
            interpreter = %self.config.interpreter,
            script = %self.config.script,
            "Starting backend"
        );
        self.platform_manager.spawn_process(
            &self.config.interpreter,
            &self.config.args(),
            self.config.working_directory.as_deref(),
        )
    }

    async fn terminate(&self, handle: &mut Self::Handle) -> TerminationResult {
        match handle.get_pid() {
            Some(pid) => self.platform_manager.terminate(pid),
            None => TerminationResult::ProcessNotFound,
        }
    }

    fn platform_name(&self) -> &'static str {
        crate::platform_name()
    }
}

/// Factory for creating Unix BackendProcessManager instances
pub struct UnixBackendManagerFactory;

impl BackendProcessManagerFactory for UnixBackendManagerFactory {
    type Manager = UnixBackendManager;

    fn create_process_manager(config: &BackendConfig) -> Self::Manager {
        UnixBackendManager::new(config)
    }
}
