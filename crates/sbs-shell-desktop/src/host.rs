use sbs_shell::{ShellError, WindowConfig, WindowHost, WindowId};
use tauri::image::Image;
use tauri::{AppHandle, Url, WebviewUrl, WebviewWindowBuilder};
use tracing::warn;

/// Opens webview windows through Tauri
pub struct TauriWindowHost<'a> {
    app: &'a AppHandle,
}

impl<'a> TauriWindowHost<'a> {
    pub fn new(app: &'a AppHandle) -> Self {
        Self { app }
    }
}

impl WindowHost for TauriWindowHost<'_> {
    fn open_window(&mut self, config: &WindowConfig) -> Result<WindowId, ShellError> {
        let url: Url = config.url.parse().map_err(|e| {
            ShellError::Configuration(format!("invalid window url {}: {e}", config.url))
        })?;

        let mut builder =
            WebviewWindowBuilder::new(self.app, config.label.as_str(), WebviewUrl::External(url))
                .title(config.title.as_str())
                .inner_size(config.width, config.height);

        if let Some(path) = config.icon.as_deref() {
            match Image::from_path(path) {
                Ok(icon) => {
                    builder = builder
                        .icon(icon)
                        .map_err(|e| ShellError::Window(e.to_string()))?;
                }
                Err(e) => {
                    warn!(icon = %path.display(), error = %e, "Window icon not loaded");
                }
            }
        }

        let window = builder
            .build()
            .map_err(|e| ShellError::Window(e.to_string()))?;
        Ok(WindowId::new(window.label()))
    }
}
