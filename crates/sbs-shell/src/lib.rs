//! Side by Side desktop shell
//!
//! Picks the backend process manager for the current platform and wires it into
//! the [`ShellLifecycle`] from `sbs-shell-core`. The desktop binary supplies the
//! window host and turns [`ShutdownSignals`] into an orderly exit.

mod factory;
mod shell;
mod signals;

pub use factory::{PlatformBackendManager, PlatformBackendManagerFactory};
pub use shell::{SideShell, new_shell};
pub use signals::{ShutdownSignal, ShutdownSignals};

// Re-export core functionality
pub use sbs_shell_core::*;
