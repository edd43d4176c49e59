// Side by Side desktop shell
// Starts the survey comparison backend and shows it in a native window.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod host;
mod logging;

use anyhow::Context;
use host::TauriWindowHost;
use sbs_shell::{ExitDecision, ShellConfig, ShellEvent, ShutdownSignals, WindowId, new_shell};
use tauri::{RunEvent, WindowEvent};
use tracing::{debug, error, warn};

fn main() {
    logging::init();

    if let Err(e) = run() {
        error!(error = %format!("{e:#}"), "Desktop shell failed to start");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = ShellConfig::default();
    debug!(config = %serde_json::to_string(&config)?, "Effective shell configuration");

    let mut shell = new_shell(config)?;

    let app = tauri::Builder::default()
        .build(tauri::generate_context!())
        .context("failed to build Tauri application")?;

    // Ctrl+C and SIGTERM leave through the event loop, which delivers RunEvent::Exit.
    let exit_handle = app.handle().clone();
    tauri::async_runtime::spawn(async move {
        match ShutdownSignals::install() {
            Ok(signals) => signals.exit_on_signal(move |_| exit_handle.exit(0)).await,
            Err(e) => warn!(error = %e, "Failed to install shutdown signal handlers"),
        }
    });

    app.run(move |app_handle, event| {
        let Some(shell_event) = shell_event_for(&event) else {
            return;
        };

        let mut host = TauriWindowHost::new(app_handle);
        match tauri::async_runtime::block_on(shell.handle(shell_event, &mut host)) {
            Ok(ExitDecision::KeepRunning) => {
                if let RunEvent::ExitRequested { api, .. } = &event {
                    api.prevent_exit();
                }
            }
            Ok(ExitDecision::Exit) => {}
            Err(e) => {
                error!(error = %e, "Shell lifecycle failed, exiting");
                app_handle.exit(1);
            }
        }
    });

    Ok(())
}

/// Translate the Tauri events the shell cares about
fn shell_event_for(event: &RunEvent) -> Option<ShellEvent> {
    match event {
        RunEvent::Ready => Some(ShellEvent::Ready),
        RunEvent::WindowEvent {
            label,
            event: WindowEvent::Destroyed,
            ..
        } => Some(ShellEvent::WindowClosed(WindowId::new(label.clone()))),
        // No exit code means the last window went away rather than an explicit exit().
        RunEvent::ExitRequested { code: None, .. } => Some(ShellEvent::AllWindowsClosed),
        #[cfg(target_os = "macos")]
        RunEvent::Reopen {
            has_visible_windows: false,
            ..
        } => Some(ShellEvent::Activate),
        RunEvent::Exit => Some(ShellEvent::Exit),
        _ => None,
    }
}
