use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid as NixPid;
use sbs_shell_core::{
    ChildMonitor, ProcessError, ProcessHandle, ProcessId, ProcessStatus, TerminationResult,
};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Unix-specific process handle implementation
pub struct UnixProcessHandle {
    monitor: ChildMonitor,
}

impl UnixProcessHandle {
    pub fn new(monitor: ChildMonitor) -> Self {
        Self { monitor }
    }
}

#[async_trait]
impl ProcessHandle for UnixProcessHandle {
    fn get_pid(&self) -> Option<ProcessId> {
        self.monitor.pid()
    }

    fn get_command(&self) -> &str {
        self.monitor.command()
    }

    fn get_args(&self) -> &[String] {
        self.monitor.args()
    }

    fn exit_status(&self) -> Option<ProcessStatus> {
        self.monitor.exit_status()
    }

    async fn is_running(&self) -> bool {
        if self.monitor.has_exited() {
            return false;
        }

        let Some(pid) = self.get_pid() else {
            warn!("Unix process handle has no PID - process may have exited");
            return false;
        };

        // Signal 0 only checks that the process exists.
        let alive = signal::kill(NixPid::from_raw(pid.0 as i32), None).is_ok();
        debug!(pid = %pid, alive, "Checked Unix process liveness");
        alive
    }

    async fn wait(&mut self) -> ProcessStatus {
        self.monitor.wait().await
    }
}

/// Spawns processes into their own group and signals them by pid
#[derive(Debug, Default)]
pub struct UnixProcessManager;

impl UnixProcessManager {
    pub fn new() -> Self {
        Self
    }

    /// Spawn `command args...` with stdout and stderr piped into the log.
    ///
    /// The child leads a new process group so a single signal reaches anything
    /// it forks (the backend's reloader, for one).
    pub fn spawn_process(
        &self,
        command: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<UnixProcessHandle, ProcessError> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|e| {
            warn!(command = %command, args = ?args, error = %e, "Failed to spawn Unix process");
            ProcessError::from_spawn(command, e)
        })?;

        if let Some(pid) = child.id() {
            info!(pid, command = %command, args = ?args, "Spawned Unix process");
        }

        Ok(UnixProcessHandle::new(ChildMonitor::spawn(
            child,
            command.to_string(),
            args.to_vec(),
        )))
    }

    /// Send one `SIGTERM` to the process group led by `pid`. Never escalates.
    ///
    /// The child was spawned as a group leader, so a missing group means the
    /// backend and everything it forked are already gone.
    pub fn terminate(&self, pid: ProcessId) -> TerminationResult {
        let nix_pid = NixPid::from_raw(pid.0 as i32);

        match signal::killpg(nix_pid, Signal::SIGTERM) {
            Ok(()) => {
                info!(pid = %pid, "Sent SIGTERM to process group");
                TerminationResult::Success
            }
            Err(Errno::ESRCH) => {
                info!(pid = %pid, "Process group not found (already terminated)");
                TerminationResult::ProcessNotFound
            }
            Err(Errno::EPERM) => {
                warn!(pid = %pid, "Permission denied to terminate process group");
                TerminationResult::AccessDenied
            }
            Err(e) => {
                warn!(pid = %pid, error = %e, "Failed to send SIGTERM to process group");
                TerminationResult::Failed(format!("SIGTERM failed: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_and_terminate() {
        let manager = UnixProcessManager::new();
        let mut handle = manager
            .spawn_process("sleep", &["30".to_string()], None)
            .unwrap();

        let pid = handle.get_pid().unwrap();
        assert!(handle.is_running().await);
        assert_eq!(handle.get_command(), "sleep");

        assert_eq!(manager.terminate(pid), TerminationResult::Success);

        let status = handle.wait().await;
        assert!(matches!(status, ProcessStatus::Exited(s) if !s.success()));
        assert!(!handle.is_running().await);
    }

    #[tokio::test]
    async fn test_terminate_after_exit_reports_not_found() {
        let manager = UnixProcessManager::new();
        let mut handle = manager.spawn_process("true", &[], None).unwrap();
        let pid = handle.get_pid().unwrap();

        assert_eq!(handle.wait().await.code(), Some(0));
        assert_eq!(manager.terminate(pid), TerminationResult::ProcessNotFound);
        // Repeated requests stay harmless.
        assert_eq!(manager.terminate(pid), TerminationResult::ProcessNotFound);
    }

    #[tokio::test]
    async fn test_spawn_missing_command_fails() {
        let manager = UnixProcessManager::new();
        let err = manager
            .spawn_process("/nonexistent/sbs-python", &[], None)
            .err()
            .unwrap();
        assert!(
            matches!(&err, ProcessError::SpawnFailed(msg) if msg.contains("/nonexistent/sbs-python"))
        );
    }

    #[tokio::test]
    async fn test_spawn_non_executable_is_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let path = std::env::temp_dir().join(format!("sbs-not-executable-{}", std::process::id()));
        std::fs::write(&path, "print('never runs')\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let manager = UnixProcessManager::new();
        let result = manager.spawn_process(path.to_str().unwrap(), &[], None);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ProcessError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_working_directory_is_applied() {
        let manager = UnixProcessManager::new();
        let dir = std::env::temp_dir().canonicalize().unwrap();
        let args = [
            "-c".to_string(),
            r#"test "$(pwd -P)" = "$0""#.to_string(),
            dir.display().to_string(),
        ];
        let mut handle = manager.spawn_process("sh", &args, Some(&dir)).unwrap();
        assert_eq!(handle.wait().await.code(), Some(0));
    }
}
