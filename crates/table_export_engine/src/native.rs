use std::path::{Path, PathBuf};

use export_logging::export_debug;
use rfd::FileDialog;

use crate::capability::{
    desktop_session_available, NativeSaveCapability, NativeSaveError, SaveDialogOptions,
};
use crate::persist::write_atomic;

/// Native save dialog through the platform file chooser.
///
/// The dialog is modal and blocks the calling thread until the user answers.
/// Without a graphical session the prompt reports `Unavailable` instead of
/// opening, so the exporter can fall back to a download.
#[derive(Debug, Default, Clone)]
pub struct RfdNativeSave {
    start_dir: Option<PathBuf>,
}

impl RfdNativeSave {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory the dialog opens in.
    pub fn with_start_dir(mut self, dir: PathBuf) -> Self {
        self.start_dir = Some(dir);
        self
    }
}

#[async_trait::async_trait]
impl NativeSaveCapability for RfdNativeSave {
    async fn prompt_save_path(
        &self,
        options: SaveDialogOptions,
    ) -> Result<Option<PathBuf>, NativeSaveError> {
        if !desktop_session_available() {
            return Err(NativeSaveError::Unavailable(
                "no graphical session (DISPLAY and WAYLAND_DISPLAY are unset)".to_string(),
            ));
        }

        let mut dialog = FileDialog::new()
            .set_title(&options.title)
            .set_file_name(&options.default_path);
        if let Some(dir) = &self.start_dir {
            dialog = dialog.set_directory(dir);
        }
        for filter in &options.filters {
            dialog = dialog.add_filter(&filter.name, filter.extensions.as_slice());
        }

        let picked = dialog.save_file();
        export_debug!("Save dialog returned {:?}", picked);
        Ok(picked)
    }

    async fn write_text(&self, path: &Path, content: &str) -> Result<(), NativeSaveError> {
        write_atomic(path, content)?;
        Ok(())
    }
}
