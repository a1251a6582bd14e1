use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::download::DocumentContext;
use crate::persist::PersistError;

#[derive(Debug, thiserror::Error)]
pub enum NativeSaveError {
    #[error("native save capability unavailable: {0}")]
    Unavailable(String),
    #[error("save dialog failed: {0}")]
    Dialog(String),
    #[error("writing the selected file failed: {0}")]
    Write(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDialogOptions {
    /// Suggested file name (or path) pre-filled in the dialog.
    pub default_path: String,
    pub title: String,
    pub filters: Vec<FileFilter>,
}

/// Save-file dialog plus write access provided by a desktop shell.
#[async_trait::async_trait]
pub trait NativeSaveCapability: Send + Sync {
    /// `Ok(None)` means the user dismissed the dialog.
    async fn prompt_save_path(
        &self,
        options: SaveDialogOptions,
    ) -> Result<Option<PathBuf>, NativeSaveError>;

    async fn write_text(&self, path: &Path, content: &str) -> Result<(), NativeSaveError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStrategy {
    NativeDialog,
    BrowserDownload,
}

/// Save facilities present in the running environment.
#[derive(Clone, Default)]
pub struct SaveCapabilities {
    native: Option<Arc<dyn NativeSaveCapability>>,
    document: Option<Arc<dyn DocumentContext>>,
}

impl SaveCapabilities {
    /// No native shell and no document: every export resolves to `None`.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_native(mut self, native: Arc<dyn NativeSaveCapability>) -> Self {
        self.native = Some(native);
        self
    }

    pub fn with_document(mut self, document: Arc<dyn DocumentContext>) -> Self {
        self.document = Some(document);
        self
    }

    /// Available strategies in preference order. Only inspects what was
    /// registered; never touches the environment.
    pub fn available(&self) -> Vec<SaveStrategy> {
        let mut strategies = Vec::with_capacity(2);
        if self.native.is_some() {
            strategies.push(SaveStrategy::NativeDialog);
        }
        if self.document.is_some() {
            strategies.push(SaveStrategy::BrowserDownload);
        }
        strategies
    }

    pub fn native(&self) -> Option<&dyn NativeSaveCapability> {
        self.native.as_deref()
    }

    pub fn document(&self) -> Option<&dyn DocumentContext> {
        self.document.as_deref()
    }
}

/// Whether a graphical session is reachable for native dialogs.
///
/// Windows and macOS always have one. Elsewhere a dialog needs an X11 or
/// Wayland display; without either, file choosers fail and report nothing
/// but an empty selection.
pub fn desktop_session_available() -> bool {
    desktop_session_from(|key| std::env::var_os(key))
}

fn desktop_session_from(var: impl Fn(&str) -> Option<OsString>) -> bool {
    if cfg!(any(target_os = "windows", target_os = "macos")) {
        return true;
    }
    ["WAYLAND_DISPLAY", "DISPLAY"]
        .into_iter()
        .any(|key| var(key).is_some_and(|value| !value.is_empty()))
}

impl fmt::Debug for SaveCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveCapabilities")
            .field("available", &self.available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Vars = &'static [(&'static str, &'static str)];

    fn env_with(vars: Vars) -> impl Fn(&str) -> Option<OsString> {
        move |key: &str| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| OsString::from(value))
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    #[test]
    fn headless_unix_has_no_desktop_session() {
        assert!(!desktop_session_from(env_with(&[])));
        assert!(!desktop_session_from(env_with(&[("DISPLAY", "")])));
        assert!(!desktop_session_from(env_with(&[("TERM", "xterm")])));
    }

    #[test]
    fn x11_or_wayland_display_counts_as_desktop_session() {
        assert!(desktop_session_from(env_with(&[("DISPLAY", ":0")])));
        assert!(desktop_session_from(env_with(&[("WAYLAND_DISPLAY", "wayland-0")])));
    }
}
