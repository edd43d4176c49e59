//! Unix backend process management: process-group spawn and `SIGTERM` delivery

#[cfg(unix)]
mod backend_manager;
#[cfg(unix)]
mod unix_process_manager;

#[cfg(unix)]
pub use backend_manager::{UnixBackendManager, UnixBackendManagerFactory};
#[cfg(unix)]
pub use unix_process_manager::{UnixProcessHandle, UnixProcessManager};

pub fn platform_name() -> &'static str {
    "Unix"
}
