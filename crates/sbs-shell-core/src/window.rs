use crate::config::WindowConfig;
use crate::error::ShellError;

/// Identifies an open window by its label
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::From)]
pub struct WindowId(String);

impl WindowId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WindowId {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// The windowing toolkit as seen by the lifecycle.
///
/// Creating the window is all the lifecycle asks for. Loading the page, showing a
/// failed load and closing are left to the toolkit, which reports closes back as
/// events.
pub trait WindowHost {
    fn open_window(&mut self, config: &WindowConfig) -> Result<WindowId, ShellError>;
}
