use std::fs;
use std::path::{Path, PathBuf};

use export_logging::{export_info, export_warn};
use serde::{Deserialize, Serialize};
use table_export_core::{ExportFormat, HeaderQuoting};

/// Settings read from `tablex.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where downloads land; the user's download directory when unset.
    pub download_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub header_quoting: HeaderQuoting,
    pub default_format: ExportFormat,
    /// Offer the native save dialog without passing `--dialog`.
    pub native_dialog: bool,
}

impl AppConfig {
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Load the configuration; a missing or unreadable file yields defaults.
pub fn load_config(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppConfig::default();
        }
        Err(err) => {
            export_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            export_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            export_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}
