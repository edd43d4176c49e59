use async_trait::async_trait;
use sbs_shell_core::{
    ChildMonitor, ProcessError, ProcessHandle, ProcessId, ProcessStatus, TerminationResult,
};
use std::path::Path;
use std::process::Stdio;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::process::Command;
use tracing::{debug, info, warn};
use windows::Win32::Foundation::{CloseHandle, ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER};
use windows::Win32::System::Threading::{
    CREATE_NO_WINDOW, OpenProcess, PROCESS_TERMINATE, TerminateProcess,
};

/// Exit code reported by a backend killed from the shell
const TERMINATED_EXIT_CODE: u32 = 1;

/// Windows-specific process handle implementation
pub struct WindowsProcessHandle {
    monitor: ChildMonitor,
}

impl WindowsProcessHandle {
    pub fn new(monitor: ChildMonitor) -> Self {
        Self { monitor }
    }
}

#[async_trait]
impl ProcessHandle for WindowsProcessHandle {
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
            warn!("Windows process handle has no PID - process may have exited");
            return false;
        };

        let sys_pid = Pid::from_u32(pid.0);
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[sys_pid]), true);
        let alive = system.process(sys_pid).is_some();
        debug!(pid = %pid, alive, "Checked Windows process liveness");
        alive
    }

    async fn wait(&mut self) -> ProcessStatus {
        self.monitor.wait().await
    }
}

/// Spawns console-less processes and terminates them by pid
#[derive(Debug, Default)]
pub struct WindowsProcessManager;

impl WindowsProcessManager {
    pub fn new() -> Self {
        Self
    }

    /// Spawn `command args...` without a console window, stdout and stderr piped into the log
    pub fn spawn_process(
        &self,
        command: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<WindowsProcessHandle, ProcessError> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .creation_flags(CREATE_NO_WINDOW.0);

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|e| {
            warn!(command = %command, args = ?args, error = %e, "Failed to spawn Windows process");
            ProcessError::from_spawn(command, e)
        })?;

        if let Some(pid) = child.id() {
            info!(pid, command = %command, args = ?args, "Spawned Windows process");
        }

        Ok(WindowsProcessHandle::new(ChildMonitor::spawn(
            child,
            command.to_string(),
            args.to_vec(),
        )))
    }

    /// One `TerminateProcess` call. Windows has no graceful equivalent of `SIGTERM`
    /// for a console-less child.
    pub fn terminate(&self, pid: ProcessId) -> TerminationResult {
        // SAFETY: the handle is only used within this block and closed before leaving it.
        unsafe {
            let process = match OpenProcess(PROCESS_TERMINATE, false, pid.0) {
                Ok(process) => process,
                Err(e) if e.code() == ERROR_INVALID_PARAMETER.to_hresult() => {
                    info!(pid = %pid, "Process not found (already terminated)");
                    return TerminationResult::ProcessNotFound;
                }
                Err(e) if e.code() == ERROR_ACCESS_DENIED.to_hresult() => {
                    warn!(pid = %pid, "Permission denied to open process");
                    return TerminationResult::AccessDenied;
                }
                Err(e) => {
                    warn!(pid = %pid, error = %e, "Failed to open process");
                    return TerminationResult::Failed(format!("OpenProcess failed: {e}"));
                }
            };

            let result = match TerminateProcess(process, TERMINATED_EXIT_CODE) {
                Ok(()) => {
                    info!(pid = %pid, "Terminated process");
                    TerminationResult::Success
                }
                Err(e) if e.code() == ERROR_ACCESS_DENIED.to_hresult() => {
                    // Also what a process that is already exiting reports.
                    warn!(pid = %pid, "Access denied terminating process");
                    TerminationResult::AccessDenied
                }
                Err(e) => {
                    warn!(pid = %pid, error = %e, "Failed to terminate process");
                    TerminationResult::Failed(format!("TerminateProcess failed: {e}"))
                }
            };

            if let Err(e) = CloseHandle(process) {
                warn!(pid = %pid, error = %e, "Failed to close process handle");
            }

            result
        }
    }
}
