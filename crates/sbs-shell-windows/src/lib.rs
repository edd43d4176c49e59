//! Windows backend process management: console-less spawn and `TerminateProcess`

#[cfg(windows)]
mod backend_manager;
#[cfg(windows)]
mod windows_process_manager;

#[cfg(windows)]
pub use backend_manager::{WindowsBackendManager, WindowsBackendManagerFactory};
#[cfg(windows)]
pub use windows_process_manager::{WindowsProcessHandle, WindowsProcessManager};

pub fn platform_name() -> &'static str {
    "Windows"
}
