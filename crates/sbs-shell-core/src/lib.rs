//! Side by Side shell core - platform-independent lifecycle, configuration and process abstractions
//!
//! This crate provides the traits, configurations and error types shared by the
//! platform-specific backend managers and the desktop host.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod process;
pub mod process_manager_trait;
pub mod stdio;
pub mod window;

#[cfg(test)]
mod test_support;

pub use config::*;
pub use error::*;
pub use lifecycle::{ExitDecision, ShellEvent, ShellLifecycle};
pub use process::*;
pub use process_manager_trait::{BackendProcessManager, BackendProcessManagerFactory};
pub use stdio::{BackendStream, LogLineCodec, forward_lines, forward_to_log};
pub use window::{WindowHost, WindowId};
