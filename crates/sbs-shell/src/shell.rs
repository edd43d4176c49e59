use crate::factory::{PlatformBackendManager, PlatformBackendManagerFactory};
use sbs_shell_core::{BackendProcessManagerFactory, ShellConfig, ShellError, ShellLifecycle};
use tracing::info;

/// The shell lifecycle wired to this platform's backend manager
pub type SideShell = ShellLifecycle<PlatformBackendManager>;

/// Validate `config` and build a lifecycle with the platform backend manager.
///
/// Nothing is spawned until the host reports it is ready.
pub fn new_shell(config: ShellConfig) -> Result<SideShell, ShellError> {
    config
        .validate()
        .map_err(|e| ShellError::Configuration(format!("{e:#}")))?;

    let manager = PlatformBackendManagerFactory::create_process_manager(&config.backend);
    info!(
        interpreter = %config.backend.interpreter,
        script = %config.backend.script,
        url = %config.window.url,
        "Created desktop shell"
    );
    Ok(ShellLifecycle::new(config, manager))
}
