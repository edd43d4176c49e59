use std::io;
use tracing::{debug, info};

/// A request from outside the window system to stop the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ShutdownSignal {
    /// Ctrl+C / `SIGINT`
    #[display("interrupt")]
    Interrupt,
    /// `SIGTERM`
    #[display("terminate")]
    Terminate,
    /// `SIGHUP`, the controlling terminal went away
    #[display("hangup")]
    Hangup,
    /// The console window was closed
    #[display("console close")]
    ConsoleClose,
}

/// Listens for the signals that should tear the shell down like a last-window close.
///
/// Ctrl+C, `SIGTERM` and `SIGHUP` on Unix; Ctrl+C and console close on Windows.
pub struct ShutdownSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
    #[cfg(windows)]
    ctrl_close: tokio::signal::windows::CtrlClose,
}

impl ShutdownSignals {
    /// Register the handlers. Must be called from within a tokio runtime.
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        let signals = Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        };
        debug!("Installed shutdown signal handlers");
        Ok(signals)
    }

    /// Register the handlers. Must be called from within a tokio runtime.
    #[cfg(windows)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::windows::{ctrl_c, ctrl_close};

        let signals = Self {
            ctrl_c: ctrl_c()?,
            ctrl_close: ctrl_close()?,
        };
        debug!("Installed shutdown signal handlers");
        Ok(signals)
    }

    /// Wait for the next shutdown signal
    #[cfg(unix)]
    pub async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
            _ = self.hangup.recv() => ShutdownSignal::Hangup,
        }
    }

    /// Wait for the next shutdown signal
    #[cfg(windows)]
    pub async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.ctrl_c.recv() => ShutdownSignal::Interrupt,
            _ = self.ctrl_close.recv() => ShutdownSignal::ConsoleClose,
        }
    }

    /// Wait for the first shutdown signal and hand it to `on_signal`.
    ///
    /// The host answers by asking its event loop to exit, which delivers
    /// [`ShellEvent::Exit`](sbs_shell_core::ShellEvent::Exit) and tears the backend down.
    pub async fn exit_on_signal<F>(mut self, on_signal: F)
    where
        F: FnOnce(ShutdownSignal),
    {
        let signal = self.recv().await;
        info!(signal = %signal, "Shutdown signal received, exiting");
        on_signal(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_display() {
        assert_eq!(ShutdownSignal::Interrupt.to_string(), "interrupt");
        assert_eq!(ShutdownSignal::Terminate.to_string(), "terminate");
        assert_eq!(ShutdownSignal::ConsoleClose.to_string(), "console close");
    }
}
