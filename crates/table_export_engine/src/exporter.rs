use std::sync::Arc;

use chrono::Utc;
use export_logging::{export_debug, export_info, export_warn};
use table_export_core::{CsvOptions, ExportFormat, SaveOutcome, TableModel};

use crate::capability::{
    FileFilter, NativeSaveCapability, NativeSaveError, SaveCapabilities, SaveDialogOptions,
    SaveStrategy,
};
use crate::download::{trigger_download, Blob, DownloadError};
use crate::extract::{HtmlTableExtractor, TableExtractor};
use crate::filename::export_filename;

/// Source of the timestamp used in generated file names.
pub type EpochMillis = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Clone)]
pub struct ExporterConfig {
    pub csv_options: CsvOptions,
    pub dialog_title: String,
    pub epoch_millis: EpochMillis,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            csv_options: CsvOptions::default(),
            dialog_title: "Save table".to_string(),
            epoch_millis: Arc::new(|| Utc::now().timestamp_millis()),
        }
    }
}

/// Extracts the first table of a container and saves it with the best
/// available strategy. Export is best effort: every failure ends in a
/// `SaveOutcome` and is logged, never returned.
pub struct TableExporter {
    extractor: Arc<dyn TableExtractor>,
    capabilities: SaveCapabilities,
    config: ExporterConfig,
}

impl TableExporter {
    pub fn new(capabilities: SaveCapabilities) -> Self {
        Self {
            extractor: Arc::new(HtmlTableExtractor::new()),
            capabilities,
            config: ExporterConfig::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TableExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_config(mut self, config: ExporterConfig) -> Self {
        self.config = config;
        self
    }

    /// Export the first table of `container_html` as CSV.
    pub async fn export_table(
        &self,
        container_html: &str,
        default_filename: Option<&str>,
    ) -> SaveOutcome {
        self.export_table_as(container_html, default_filename, ExportFormat::Csv)
            .await
    }

    pub async fn export_table_as(
        &self,
        container_html: &str,
        default_filename: Option<&str>,
        format: ExportFormat,
    ) -> SaveOutcome {
        let Some(model) = self.extractor.extract_first(container_html) else {
            export_info!("No table found in container; nothing to export");
            return SaveOutcome::None;
        };
        self.export_model(&model, default_filename, format).await
    }

    /// Save an already extracted table, e.g. one picked from `extract_all`.
    pub async fn export_model(
        &self,
        model: &TableModel,
        default_filename: Option<&str>,
        format: ExportFormat,
    ) -> SaveOutcome {
        let content = match format.render(model, self.config.csv_options) {
            Ok(content) => content,
            Err(err) => {
                export_warn!("Could not serialize table as {}: {}", format, err);
                return SaveOutcome::None;
            }
        };
        let filename = export_filename(default_filename, format, (self.config.epoch_millis)());
        export_debug!(
            "Exporting {} columns x {} rows as {} to {:?}",
            model.headers.len(),
            model.records.len(),
            format,
            filename
        );

        for strategy in self.capabilities.available() {
            match strategy {
                SaveStrategy::NativeDialog => {
                    let Some(native) = self.capabilities.native() else {
                        continue;
                    };
                    match self.save_native(native, &filename, &content, format).await {
                        Ok(true) => return SaveOutcome::NativeSave,
                        Ok(false) => {
                            export_info!("Save dialog dismissed; nothing written");
                            return SaveOutcome::None;
                        }
                        Err(err) => {
                            export_warn!("Native save failed, falling back to download: {}", err);
                        }
                    }
                }
                SaveStrategy::BrowserDownload => {
                    return match self.download(&filename, &content, format) {
                        Ok(()) => SaveOutcome::BrowserDownload,
                        Err(err) => {
                            export_warn!("Download of {:?} failed: {}", filename, err);
                            SaveOutcome::None
                        }
                    };
                }
            }
        }

        export_info!("No save strategy available for {:?}", filename);
        SaveOutcome::None
    }

    /// `Ok(false)` when the user cancelled the dialog.
    async fn save_native(
        &self,
        native: &dyn NativeSaveCapability,
        filename: &str,
        content: &str,
        format: ExportFormat,
    ) -> Result<bool, NativeSaveError> {
        let options = SaveDialogOptions {
            default_path: filename.to_string(),
            title: self.config.dialog_title.clone(),
            filters: vec![FileFilter {
                name: format.filter_name().to_string(),
                extensions: vec![format.extension().to_string()],
            }],
        };
        let Some(path) = native.prompt_save_path(options).await? else {
            return Ok(false);
        };
        native.write_text(&path, content).await?;
        export_info!("Saved table to {:?}", path);
        Ok(true)
    }

    fn download(
        &self,
        filename: &str,
        content: &str,
        format: ExportFormat,
    ) -> Result<(), DownloadError> {
        let document = self
            .capabilities
            .document()
            .ok_or(DownloadError::NoDocument)?;
        trigger_download(document, Blob::new(content, format.mime_type()), filename)
    }
}
