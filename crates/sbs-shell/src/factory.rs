use sbs_shell_core::BackendProcessManagerFactory;
use sbs_shell_core::config::BackendConfig;

/// Platform-independent factory that selects the appropriate implementation at compile time
pub struct PlatformBackendManagerFactory;

impl BackendProcessManagerFactory for PlatformBackendManagerFactory {
    #[cfg(unix)]
    type Manager = sbs_shell_unix::UnixBackendManager;

    #[cfg(windows)]
    type Manager = sbs_shell_windows::WindowsBackendManager;

    fn create_process_manager(config: &BackendConfig) -> Self::Manager {
        #[cfg(unix)]
        return sbs_shell_unix::UnixBackendManagerFactory::create_process_manager(config);

        #[cfg(windows)]
        return sbs_shell_windows::WindowsBackendManagerFactory::create_process_manager(config);
    }
}

/// Backend manager for the platform this crate was built for
pub type PlatformBackendManager =
    <PlatformBackendManagerFactory as BackendProcessManagerFactory>::Manager;

#[cfg(not(any(unix, windows)))]
compile_error!("Unsupported platform: only Unix and Windows are currently supported");
