use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::process::{ProcessError, ProcessHandle, ProcessId, TerminationResult};
use crate::process_manager_trait::BackendProcessManager;
use crate::window::{WindowHost, WindowId};
use tracing::{debug, error, info, warn};

/// Host notifications the shell reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// The host finished launching
    Ready,
    /// A window was destroyed
    WindowClosed(WindowId),
    /// The last window is gone
    AllWindowsClosed,
    /// The application was re-activated (dock click on macOS)
    Activate,
    /// The host is exiting
    Exit,
}

/// What the host should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    KeepRunning,
    Exit,
}

/// Owns the window reference and the backend handle for the lifetime of the host.
///
/// Both are optional: the window exists between `on_ready`/`on_activate` and its
/// close, the backend between a successful spawn and `on_all_windows_closed` or
/// `shutdown`. The backend is spawned at most once per lifecycle.
pub struct ShellLifecycle<Manager: BackendProcessManager> {
    config: ShellConfig,
    manager: Manager,
    window: Option<WindowId>,
    backend: Option<Manager::Handle>,
    backend_attempted: bool,
    spawn_count: usize,
    window_count: usize,
}

impl<Manager: BackendProcessManager> ShellLifecycle<Manager> {
    pub fn new(config: ShellConfig, manager: Manager) -> Self {
        Self {
            config,
            manager,
            window: None,
            backend: None,
            backend_attempted: false,
            spawn_count: 0,
            window_count: 0,
        }
    }

    /// Dispatch a host event to the matching lifecycle method
    pub async fn handle<H: WindowHost + ?Sized>(
        &mut self,
        event: ShellEvent,
        host: &mut H,
    ) -> Result<ExitDecision, ShellError> {
        debug!(event = ?event, "Handling shell event");
        match event {
            ShellEvent::Ready => {
                self.on_ready(host).await?;
                Ok(ExitDecision::KeepRunning)
            }
            ShellEvent::WindowClosed(id) => {
                self.on_window_closed(&id);
                Ok(ExitDecision::KeepRunning)
            }
            ShellEvent::AllWindowsClosed => Ok(self.on_all_windows_closed().await),
            ShellEvent::Activate => {
                self.on_activate(host).await?;
                Ok(ExitDecision::KeepRunning)
            }
            ShellEvent::Exit => {
                self.shutdown().await;
                Ok(ExitDecision::Exit)
            }
        }
    }

    /// Start the backend, then open the window.
    ///
    /// A backend that fails to start is logged and otherwise ignored; the window
    /// still opens and shows whatever the address serves.
    pub async fn on_ready<H: WindowHost + ?Sized>(&mut self, host: &mut H) -> Result<(), ShellError> {
        info!(
            platform = self.manager.platform_name(),
            url = %self.config.window.url,
            "Host application ready"
        );

        if !self.backend_attempted {
            match self.start_backend().await {
                Ok(()) => {}
                Err(ShellError::Process(ProcessError::SpawnFailed(reason))) => {
                    error!(
                        interpreter = %self.config.backend.interpreter,
                        reason = %reason,
                        "Backend interpreter not found, continuing without it"
                    );
                }
                Err(ShellError::Process(ProcessError::PermissionDenied(reason))) => {
                    error!(
                        interpreter = %self.config.backend.interpreter,
                        reason = %reason,
                        "Backend interpreter is not executable, continuing without it"
                    );
                }
                Err(e) if e.is_recoverable() => {
                    error!(error = %e, "Backend did not start, continuing without it");
                }
                Err(e) => return Err(e),
            }
        }

        self.ensure_window(host)
    }

    /// Forget the window if it is the one we opened
    pub fn on_window_closed(&mut self, id: &WindowId) {
        if self.window.as_ref() == Some(id) {
            info!(window = %id, "Window closed");
            self.window = None;
        } else {
            debug!(window = %id, "Ignoring close of unknown window");
        }
    }

    /// Terminate the backend if one is running and decide whether the host exits
    pub async fn on_all_windows_closed(&mut self) -> ExitDecision {
        info!("All windows closed");
        self.window = None;
        self.terminate_backend().await;

        if self.config.quit_on_last_window_closed {
            ExitDecision::Exit
        } else {
            ExitDecision::KeepRunning
        }
    }

    /// Reopen the window when none is open. Never spawns another backend.
    pub async fn on_activate<H: WindowHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<(), ShellError> {
        info!("Application activated");
        self.ensure_window(host)
    }

    /// Explicit teardown; terminates a backend that is still around. Safe to call twice.
    pub async fn shutdown(&mut self) {
        self.window = None;
        self.terminate_backend().await;
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    pub fn window(&self) -> Option<&WindowId> {
        self.window.as_ref()
    }

    pub fn backend(&self) -> Option<&Manager::Handle> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut Manager::Handle> {
        self.backend.as_mut()
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_pid(&self) -> Option<ProcessId> {
        self.backend.as_ref().and_then(|handle| handle.get_pid())
    }

    /// Backends successfully spawned by this lifecycle
    pub fn spawn_count(&self) -> usize {
        self.spawn_count
    }

    /// Windows opened by this lifecycle
    pub fn window_count(&self) -> usize {
        self.window_count
    }

    async fn start_backend(&mut self) -> Result<(), ShellError> {
        self.backend_attempted = true;
        let backend = &self.config.backend;

        let handle = self.manager.start_backend().await?;

        info!(
            name = %backend.name,
            pid = ?handle.get_pid(),
            command = %handle.get_command(),
            args = ?handle.get_args(),
            "Backend process started"
        );

        self.backend = Some(handle);
        self.spawn_count += 1;
        Ok(())
    }

    fn ensure_window<H: WindowHost + ?Sized>(&mut self, host: &mut H) -> Result<(), ShellError> {
        if let Some(window) = &self.window {
            debug!(window = %window, "Window already open");
            return Ok(());
        }

        let id = host.open_window(&self.config.window)?;
        info!(window = %id, url = %self.config.window.url, "Window opened");
        self.window = Some(id);
        self.window_count += 1;
        Ok(())
    }

    async fn terminate_backend(&mut self) {
        let Some(mut handle) = self.backend.take() else {
            debug!("No backend process to terminate");
            return;
        };

        if let Some(status) = handle.exit_status() {
            info!(status = ?status, "Backend process had already exited");
            return;
        }

        let pid = handle.get_pid();
        match self.manager.terminate(&mut handle).await {
            TerminationResult::Success => {
                info!(pid = ?pid, "Sent terminate request to backend process");
            }
            TerminationResult::ProcessNotFound => {
                info!(pid = ?pid, "Backend process already terminated");
            }
            other => {
                warn!(pid = ?pid, result = ?other, "Failed to terminate backend process");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendConfig, ShellConfig, WindowConfig};
    use crate::process::ProcessStatus;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingHost {
        opened: Vec<String>,
        fail: bool,
    }

    impl WindowHost for RecordingHost {
        fn open_window(&mut self, config: &WindowConfig) -> Result<WindowId, ShellError> {
            if self.fail {
                return Err(ShellError::Window("no display".to_string()));
            }
            self.opened.push(config.url.clone());
            Ok(WindowId::new(config.label.clone()))
        }
    }

    struct FakeHandle {
        running: Arc<AtomicBool>,
        args: Vec<String>,
    }

    #[async_trait]
    impl ProcessHandle for FakeHandle {
        fn get_pid(&self) -> Option<ProcessId> {
            Some(ProcessId(4242))
        }

        fn get_command(&self) -> &str {
            "python3"
        }

        fn get_args(&self) -> &[String] {
            &self.args
        }

        fn exit_status(&self) -> Option<ProcessStatus> {
            None
        }

        async fn is_running(&self) -> bool {
            self.running.load(Ordering::SeqCst)
        }

        async fn wait(&mut self) -> ProcessStatus {
            ProcessStatus::Unknown
        }
    }

    #[derive(Default)]
    struct FakeManager {
        spawns: AtomicUsize,
        terminates: AtomicUsize,
        fail_spawn: Option<std::io::ErrorKind>,
        running: Arc<AtomicBool>,
        args: Vec<String>,
    }

    #[async_trait]
    impl BackendProcessManager for FakeManager {
        type Handle = FakeHandle;

        fn new(config: &BackendConfig) -> Self {
            Self {
                args: config.args(),
                ..Default::default()
            }
        }

        async fn start_backend(&self) -> Result<FakeHandle, ProcessError> {
            if let Some(kind) = self.fail_spawn {
                return Err(ProcessError::from_spawn("python3", kind.into()));
            }
            self.spawns.fetch_add(1, Ordering::SeqCst);
            self.running.store(true, Ordering::SeqCst);
            Ok(FakeHandle {
                running: self.running.clone(),
                args: self.args.clone(),
            })
        }

        async fn terminate(&self, handle: &mut FakeHandle) -> TerminationResult {
            self.terminates.fetch_add(1, Ordering::SeqCst);
            handle.running.store(false, Ordering::SeqCst);
            TerminationResult::Success
        }

        fn platform_name(&self) -> &'static str {
            "fake"
        }
    }

    fn shell(quit_on_last_window_closed: bool) -> ShellLifecycle<FakeManager> {
        let config = ShellConfig {
            quit_on_last_window_closed,
            ..Default::default()
        };
        let manager = FakeManager::new(&config.backend);
        ShellLifecycle::new(config, manager)
    }

    #[tokio::test]
    async fn test_ready_spawns_one_backend_and_one_window() {
        let mut shell = shell(true);
        let mut host = RecordingHost::default();

        shell.on_ready(&mut host).await.unwrap();

        assert_eq!(shell.manager().spawns.load(Ordering::SeqCst), 1);
        assert_eq!(shell.spawn_count(), 1);
        assert_eq!(shell.window_count(), 1);
        assert_eq!(host.opened, vec!["http://127.0.0.1:8050".to_string()]);
        assert_eq!(shell.window(), Some(&WindowId::new("main")));
        assert_eq!(shell.backend_pid(), Some(ProcessId(4242)));
        assert_eq!(
            shell.backend().map(|b| b.get_args().to_vec()),
            Some(vec!["side_by_side.py".to_string()])
        );
    }

    #[tokio::test]
    async fn test_second_ready_does_not_respawn() {
        let mut shell = shell(true);
        let mut host = RecordingHost::default();

        shell.on_ready(&mut host).await.unwrap();
        shell.on_ready(&mut host).await.unwrap();

        assert_eq!(shell.manager().spawns.load(Ordering::SeqCst), 1);
        assert_eq!(host.opened.len(), 1);
    }

    #[tokio::test]
    async fn test_all_windows_closed_terminates_and_exits() {
        let mut shell = shell(true);
        let mut host = RecordingHost::default();
        shell.on_ready(&mut host).await.unwrap();

        let decision = shell.on_all_windows_closed().await;

        assert_eq!(decision, ExitDecision::Exit);
        assert_eq!(shell.manager().terminates.load(Ordering::SeqCst), 1);
        assert!(!shell.manager().running.load(Ordering::SeqCst));
        assert!(!shell.has_backend());
        assert!(shell.window().is_none());
    }

    #[tokio::test]
    async fn test_all_windows_closed_on_mac_keeps_running() {
        let mut shell = shell(false);
        let mut host = RecordingHost::default();
        shell.on_ready(&mut host).await.unwrap();

        let decision = shell.on_all_windows_closed().await;

        assert_eq!(decision, ExitDecision::KeepRunning);
        // The backend goes away regardless of platform.
        assert_eq!(shell.manager().terminates.load(Ordering::SeqCst), 1);
        assert!(!shell.has_backend());
    }

    #[tokio::test]
    async fn test_all_windows_closed_without_backend() {
        let mut shell = shell(true);

        let decision = shell.on_all_windows_closed().await;

        assert_eq!(decision, ExitDecision::Exit);
        assert_eq!(shell.manager().terminates.load(Ordering::SeqCst), 0);
    }

    fn failing_shell(kind: std::io::ErrorKind) -> ShellLifecycle<FakeManager> {
        let config = ShellConfig::default();
        let manager = FakeManager {
            fail_spawn: Some(kind),
            ..FakeManager::new(&config.backend)
        };
        ShellLifecycle::new(config, manager)
    }

    #[tokio::test]
    async fn test_spawn_failure_still_opens_window() {
        let mut shell = failing_shell(std::io::ErrorKind::NotFound);
        let mut host = RecordingHost::default();

        shell.on_ready(&mut host).await.unwrap();

        assert_eq!(shell.spawn_count(), 0);
        assert!(!shell.has_backend());
        assert_eq!(shell.window_count(), 1);
        assert_eq!(shell.on_all_windows_closed().await, ExitDecision::Exit);
    }

    #[tokio::test]
    async fn test_spawn_errors_are_classified() {
        let mut shell = failing_shell(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(
            shell.start_backend().await,
            Err(ShellError::Process(ProcessError::PermissionDenied(_)))
        ));

        let mut shell = failing_shell(std::io::ErrorKind::NotFound);
        assert!(matches!(
            shell.start_backend().await,
            Err(ShellError::Process(ProcessError::SpawnFailed(_)))
        ));

        // Any spawn error is survivable; the window still opens.
        let mut shell = failing_shell(std::io::ErrorKind::OutOfMemory);
        let mut host = RecordingHost::default();
        shell.on_ready(&mut host).await.unwrap();
        assert_eq!(shell.window_count(), 1);
    }

    #[tokio::test]
    async fn test_window_failure_is_returned() {
        let mut shell = shell(true);
        let mut host = RecordingHost {
            fail: true,
            ..Default::default()
        };

        let err = shell.on_ready(&mut host).await.unwrap_err();

        assert!(matches!(err, ShellError::Window(_)));
        // The backend was still started and is torn down on shutdown.
        assert_eq!(shell.spawn_count(), 1);
        shell.shutdown().await;
        assert_eq!(shell.manager().terminates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_activate_reopens_without_respawn() {
        let mut shell = shell(false);
        let mut host = RecordingHost::default();
        shell.on_ready(&mut host).await.unwrap();
        shell.on_window_closed(&WindowId::new("main"));
        assert_eq!(shell.on_all_windows_closed().await, ExitDecision::KeepRunning);

        shell.on_activate(&mut host).await.unwrap();

        assert_eq!(shell.window_count(), 2);
        assert_eq!(host.opened.len(), 2);
        assert_eq!(shell.manager().spawns.load(Ordering::SeqCst), 1);
        assert!(shell.window().is_some());
    }

    #[tokio::test]
    async fn test_activate_with_open_window_is_noop() {
        let mut shell = shell(false);
        let mut host = RecordingHost::default();
        shell.on_ready(&mut host).await.unwrap();

        shell.on_activate(&mut host).await.unwrap();

        assert_eq!(shell.window_count(), 1);
    }

    #[tokio::test]
    async fn test_close_of_unknown_window_keeps_reference() {
        let mut shell = shell(true);
        let mut host = RecordingHost::default();
        shell.on_ready(&mut host).await.unwrap();

        shell.on_window_closed(&WindowId::new("devtools"));

        assert_eq!(shell.window(), Some(&WindowId::new("main")));
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let mut shell = shell(true);
        let mut host = RecordingHost::default();
        shell.on_ready(&mut host).await.unwrap();

        shell.shutdown().await;
        shell.shutdown().await;

        assert_eq!(shell.manager().terminates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_event_dispatch() {
        let mut shell = shell(true);
        let mut host = RecordingHost::default();

        let events = [
            (ShellEvent::Ready, ExitDecision::KeepRunning),
            (ShellEvent::WindowClosed("main".into()), ExitDecision::KeepRunning),
            (ShellEvent::AllWindowsClosed, ExitDecision::Exit),
            (ShellEvent::Exit, ExitDecision::Exit),
        ];
        for (event, expected) in events {
            assert_eq!(shell.handle(event, &mut host).await.unwrap(), expected);
        }

        assert_eq!(shell.spawn_count(), 1);
        assert_eq!(shell.manager().terminates.load(Ordering::SeqCst), 1);
        assert!(shell.window().is_none());
    }
}
