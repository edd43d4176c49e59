use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Address the backend listens on; the window always loads this.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8050";

/// Backend entry point handed to the interpreter.
pub const DEFAULT_BACKEND_SCRIPT: &str = "side_by_side.py";

/// How the backend process is started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into, strip_option))]
pub struct BackendConfig {
    /// Name used in log output
    #[serde(default = "default_backend_name")]
    #[builder(default = "default_backend_name()")]
    pub name: String,

    /// Interpreter executable
    #[serde(default = "default_interpreter")]
    #[builder(default = "default_interpreter()")]
    pub interpreter: String,

    /// Script passed as the interpreter's only argument
    #[serde(default = "default_script")]
    #[builder(default = "default_script()")]
    pub script: String,

    /// Working directory for the backend, defaults to the shell's own
    #[serde(default)]
    #[builder(default)]
    pub working_directory: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            name: default_backend_name(),
            interpreter: default_interpreter(),
            script: default_script(),
            working_directory: None,
        }
    }
}

impl BackendConfig {
    pub fn builder() -> BackendConfigBuilder {
        BackendConfigBuilder::default()
    }

    /// Arguments for the interpreter. Nothing else is passed through.
    pub fn args(&self) -> Vec<String> {
        vec![self.script.clone()]
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interpreter.trim().is_empty() {
            return Err(anyhow::anyhow!("backend interpreter cannot be empty"));
        }
        if self.script.trim().is_empty() {
            return Err(anyhow::anyhow!("backend script cannot be empty"));
        }
        Ok(())
    }
}

/// The single top-level window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into, strip_option))]
pub struct WindowConfig {
    #[serde(default = "default_window_label")]
    #[builder(default = "default_window_label()")]
    pub label: String,

    #[serde(default = "default_window_title")]
    #[builder(default = "default_window_title()")]
    pub title: String,

    /// Logical width in pixels
    #[serde(default = "default_window_width")]
    #[builder(default = "default_window_width()")]
    pub width: f64,

    /// Logical height in pixels
    #[serde(default = "default_window_height")]
    #[builder(default = "default_window_height()")]
    pub height: f64,

    #[serde(default = "default_window_url")]
    #[builder(default = "default_window_url()")]
    pub url: String,

    #[serde(default = "default_window_icon")]
    #[builder(default = "default_window_icon()")]
    pub icon: Option<PathBuf>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            label: default_window_label(),
            title: default_window_title(),
            width: default_window_width(),
            height: default_window_height(),
            url: default_window_url(),
            icon: default_window_icon(),
        }
    }
}

impl WindowConfig {
    pub fn builder() -> WindowConfigBuilder {
        WindowConfigBuilder::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.label.trim().is_empty() {
            return Err(anyhow::anyhow!("window label cannot be empty"));
        }

        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(anyhow::anyhow!(
                "window size must be positive, got {}x{}",
                self.width,
                self.height
            ));
        }

        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "window url must be an http(s) address, got {}",
                self.url
            ));
        }

        Ok(())
    }
}

/// Main shell configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct ShellConfig {
    #[serde(default)]
    #[builder(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    #[builder(default)]
    pub window: WindowConfig,

    /// Exit the host once the last window is gone (everywhere but macOS by default)
    #[serde(default = "default_quit_on_last_window_closed")]
    #[builder(default = "default_quit_on_last_window_closed()")]
    pub quit_on_last_window_closed: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            window: WindowConfig::default(),
            quit_on_last_window_closed: default_quit_on_last_window_closed(),
        }
    }
}

impl ShellConfig {
    pub fn builder() -> ShellConfigBuilder {
        ShellConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        self.backend.validate()?;
        self.window.validate()
    }
}

// Default value functions for serde
fn default_backend_name() -> String {
    "side-by-side".to_string()
}
fn default_interpreter() -> String {
    if cfg!(windows) {
        "python".to_string()
    } else {
        "python3".to_string()
    }
}
fn default_script() -> String {
    DEFAULT_BACKEND_SCRIPT.to_string()
}
fn default_window_label() -> String {
    "main".to_string()
}
fn default_window_title() -> String {
    "Side by Side".to_string()
}
fn default_window_width() -> f64 {
    1400.0
}
fn default_window_height() -> f64 {
    900.0
}
fn default_window_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}
fn default_window_icon() -> Option<PathBuf> {
    Some(PathBuf::from("assets").join("favicon.ico"))
}
fn default_quit_on_last_window_closed() -> bool {
    !cfg!(target_os = "macos")
}
