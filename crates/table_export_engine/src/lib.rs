//! Table export engine: HTML table extraction and save orchestration.
mod capability;
mod decode;
mod download;
mod exporter;
mod extract;
mod filename;
#[cfg(feature = "native-dialog")]
mod native;
mod persist;

pub use capability::{
    desktop_session_available, FileFilter, NativeSaveCapability, NativeSaveError,
    SaveCapabilities, SaveDialogOptions, SaveStrategy,
};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use download::{
    trigger_download, AnchorId, Blob, DocumentContext, DownloadDirDocument, DownloadError,
    ObjectUrl,
};
pub use exporter::{EpochMillis, ExporterConfig, TableExporter};
pub use extract::{extract_table, find_tables, HtmlTableExtractor, TableExtractor};
pub use filename::{export_filename, sanitize_filename, DEFAULT_FILENAME_PREFIX};
#[cfg(feature = "native-dialog")]
pub use native::RfdNativeSave;
pub use persist::{ensure_output_dir, write_atomic, AtomicFileWriter, PersistError};

pub use table_export_core::{ExportFormat, SaveOutcome, TableModel};
