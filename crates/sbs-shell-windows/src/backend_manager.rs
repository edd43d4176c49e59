use crate::windows_process_manager::{WindowsProcessHandle, WindowsProcessManager};
use async_trait::async_trait;
use sbs_shell_core::{
    BackendConfig, BackendProcessManager, BackendProcessManagerFactory, ProcessError,
    ProcessHandle, TerminationResult,
};
use tracing::debug;

/// Windows implementation of the BackendProcessManager trait
pub struct WindowsBackendManager {
    platform_manager: WindowsProcessManager,
    config: BackendConfig,
}

#[async_trait]
impl BackendProcessManager for WindowsBackendManager {
    type Handle = WindowsProcessHandle;

    fn new(config: &BackendConfig) -> Self {
        Self {
            platform_manager: WindowsProcessManager::new(),
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

/// Factory for creating Windows BackendProcessManager instances
pub struct WindowsBackendManagerFactory;

impl BackendProcessManagerFactory for WindowsBackendManagerFactory {
    type Manager = WindowsBackendManager;

    fn create_process_manager(config: &BackendConfig) -> Self::Manager {
        WindowsBackendManager::new(config)
    }
}
