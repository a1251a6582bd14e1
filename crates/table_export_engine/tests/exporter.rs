use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use table_export_engine::{
    AnchorId, Blob, DocumentContext, DownloadDirDocument, DownloadError, ExportFormat,
    ExporterConfig, NativeSaveCapability, NativeSaveError, ObjectUrl, SaveCapabilities,
    SaveDialogOptions, SaveOutcome, SaveStrategy, TableExporter,
};

const TABLE_HTML: &str = "<div><table><thead><tr><th>Title</th><th>Link</th></tr></thead>\
    <tbody><tr><td>He said \"hi\"</td><td><a href=\"https://a.example\">a</a></td></tr>\
    </tbody></table></div>";

fn init_logging() {
    export_logging::initialize_for_tests();
}

fn fixed_clock_config() -> ExporterConfig {
    ExporterConfig {
        epoch_millis: Arc::new(|| 1_700_000_000_000),
        ..ExporterConfig::default()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DialogAnswer {
    Path,
    Cancel,
    Fail,
}

struct FakeNative {
    answer: DialogAnswer,
    fail_write: bool,
    chosen: PathBuf,
    prompts: Mutex<Vec<SaveDialogOptions>>,
    writes: Mutex<Vec<(PathBuf, String)>>,
}

impl FakeNative {
    fn new(answer: DialogAnswer, fail_write: bool) -> Self {
        Self {
            answer,
            fail_write,
            chosen: PathBuf::from("/chosen/table.csv"),
            prompts: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl NativeSaveCapability for FakeNative {
    async fn prompt_save_path(
        &self,
        options: SaveDialogOptions,
    ) -> Result<Option<PathBuf>, NativeSaveError> {
        self.prompts.lock().unwrap().push(options);
        match self.answer {
            DialogAnswer::Path => Ok(Some(self.chosen.clone())),
            DialogAnswer::Cancel => Ok(None),
            DialogAnswer::Fail => Err(NativeSaveError::Unavailable("dialog plugin missing".into())),
        }
    }

    async fn write_text(&self, path: &Path, content: &str) -> Result<(), NativeSaveError> {
        if self.fail_write {
            return Err(NativeSaveError::Dialog("permission denied".into()));
        }
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), content.to_string()));
        Ok(())
    }
}

/// Records every document call; clicks can be made to fail.
#[derive(Default)]
struct RecordingDocument {
    fail_click: bool,
    calls: Mutex<Vec<String>>,
    blobs: Mutex<Vec<Blob>>,
}

impl RecordingDocument {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl DocumentContext for RecordingDocument {
    fn create_object_url(&self, blob: Blob) -> Result<ObjectUrl, DownloadError> {
        self.blobs.lock().unwrap().push(blob);
        self.calls.lock().unwrap().push("create".into());
        Ok(ObjectUrl::new("blob:test/1"))
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("revoke {}", url.as_str()));
    }

    fn append_anchor(
        &self,
        _href: &ObjectUrl,
        download_name: &str,
    ) -> Result<AnchorId, DownloadError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("append {download_name}"));
        Ok(AnchorId::new(9))
    }

    fn click(&self, anchor: AnchorId) -> Result<(), DownloadError> {
        self.calls.lock().unwrap().push("click".into());
        if self.fail_click {
            return Err(DownloadError::UnknownAnchor(anchor.value()));
        }
        Ok(())
    }

    fn remove_anchor(&self, anchor: AnchorId) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("remove {}", anchor.value()));
    }
}

#[test]
fn capability_detection_lists_registered_strategies_in_order() {
    let native = Arc::new(FakeNative::new(DialogAnswer::Path, false));
    let document = Arc::new(RecordingDocument::default());

    assert!(SaveCapabilities::none().available().is_empty());
    assert_eq!(
        SaveCapabilities::none()
            .with_document(document.clone())
            .available(),
        vec![SaveStrategy::BrowserDownload]
    );
    assert_eq!(
        SaveCapabilities::none()
            .with_document(document)
            .with_native(native)
            .available(),
        vec![SaveStrategy::NativeDialog, SaveStrategy::BrowserDownload]
    );
}

#[tokio::test]
async fn container_without_table_exports_nothing() {
    init_logging();
    let native = Arc::new(FakeNative::new(DialogAnswer::Path, false));
    let document = Arc::new(RecordingDocument::default());
    let exporter = TableExporter::new(
        SaveCapabilities::none()
            .with_native(native.clone())
            .with_document(document.clone()),
    );

    let outcome = exporter.export_table("<p>no rows</p>", None).await;

    assert_eq!(outcome, SaveOutcome::None);
    assert!(native.prompts.lock().unwrap().is_empty());
    assert!(native.writes.lock().unwrap().is_empty());
    assert!(document.calls().is_empty());
}

#[tokio::test]
async fn native_save_writes_csv_to_chosen_path() {
    init_logging();
    let native = Arc::new(FakeNative::new(DialogAnswer::Path, false));
    let exporter = TableExporter::new(SaveCapabilities::none().with_native(native.clone()))
        .with_config(fixed_clock_config());

    let outcome = exporter.export_table(TABLE_HTML, None).await;

    assert_eq!(outcome, SaveOutcome::NativeSave);
    let prompts = native.prompts.lock().unwrap();
    assert_eq!(prompts[0].default_path, "search-results-1700000000000.csv");
    assert_eq!(prompts[0].filters[0].extensions, vec!["csv"]);
    let writes = native.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, PathBuf::from("/chosen/table.csv"));
    assert_eq!(
        writes[0].1,
        "\"Title\",\"Link\"\n\"He said \"\"hi\"\"\",\"https://a.example\""
    );
}

#[tokio::test]
async fn cancelled_dialog_writes_nothing_and_skips_download() {
    init_logging();
    let native = Arc::new(FakeNative::new(DialogAnswer::Cancel, false));
    let document = Arc::new(RecordingDocument::default());
    let exporter = TableExporter::new(
        SaveCapabilities::none()
            .with_native(native.clone())
            .with_document(document.clone()),
    );

    let outcome = exporter.export_table(TABLE_HTML, Some("report")).await;

    assert_eq!(outcome, SaveOutcome::None);
    assert_eq!(native.prompts.lock().unwrap()[0].default_path, "report.csv");
    assert!(native.writes.lock().unwrap().is_empty());
    assert!(document.calls().is_empty());
}

#[tokio::test]
async fn failing_native_write_falls_back_to_download() {
    init_logging();
    let native = Arc::new(FakeNative::new(DialogAnswer::Path, true));
    let document = Arc::new(RecordingDocument::default());
    let exporter = TableExporter::new(
        SaveCapabilities::none()
            .with_native(native)
            .with_document(document.clone()),
    );

    let outcome = exporter.export_table(TABLE_HTML, Some("report.csv")).await;

    assert_eq!(outcome, SaveOutcome::BrowserDownload);
    assert_eq!(
        document.calls(),
        vec![
            "create",
            "append report.csv",
            "click",
            "remove 9",
            "revoke blob:test/1"
        ]
    );
    let blobs = document.blobs.lock().unwrap();
    assert_eq!(blobs[0].mime_type, "text/csv;charset=utf-8");
    assert!(blobs[0].content.starts_with("\"Title\",\"Link\"\n"));
}

#[tokio::test]
async fn unavailable_dialog_falls_back_to_download() {
    init_logging();
    let native = Arc::new(FakeNative::new(DialogAnswer::Fail, false));
    let document = Arc::new(RecordingDocument::default());
    let exporter = TableExporter::new(
        SaveCapabilities::none()
            .with_native(native)
            .with_document(document.clone()),
    );

    assert_eq!(
        exporter.export_table(TABLE_HTML, None).await,
        SaveOutcome::BrowserDownload
    );
}

#[tokio::test]
async fn failed_click_still_releases_resources() {
    init_logging();
    let document = Arc::new(RecordingDocument {
        fail_click: true,
        ..RecordingDocument::default()
    });
    let exporter = TableExporter::new(SaveCapabilities::none().with_document(document.clone()));

    let outcome = exporter.export_table(TABLE_HTML, Some("t.csv")).await;

    assert_eq!(outcome, SaveOutcome::None);
    let calls = document.calls();
    assert_eq!(calls[calls.len() - 2..], ["remove 9", "revoke blob:test/1"]);
}

#[tokio::test]
async fn no_save_capability_yields_none() {
    init_logging();
    let exporter = TableExporter::new(SaveCapabilities::none());
    assert_eq!(
        exporter.export_table(TABLE_HTML, None).await,
        SaveOutcome::None
    );
}

#[tokio::test]
async fn download_dir_document_writes_unique_files_and_releases_everything() {
    init_logging();
    let temp = tempfile::TempDir::new().unwrap();
    let document = Arc::new(DownloadDirDocument::new(temp.path().to_path_buf()));
    let exporter = TableExporter::new(SaveCapabilities::none().with_document(document.clone()))
        .with_config(fixed_clock_config());

    for _ in 0..2 {
        assert_eq!(
            exporter.export_table(TABLE_HTML, None).await,
            SaveOutcome::BrowserDownload
        );
    }

    let downloads = document.downloads();
    let names: Vec<_> = downloads
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "search-results-1700000000000.csv",
            "search-results-1700000000000 (1).csv"
        ]
    );
    assert_eq!(
        std::fs::read_to_string(&downloads[0]).unwrap(),
        "\"Title\",\"Link\"\n\"He said \"\"hi\"\"\",\"https://a.example\""
    );
    assert_eq!(document.live_resources(), (0, 0));
}

#[tokio::test]
async fn markdown_export_uses_markdown_extension_and_body() {
    init_logging();
    let temp = tempfile::TempDir::new().unwrap();
    let document = Arc::new(DownloadDirDocument::new(temp.path().to_path_buf()));
    let exporter = TableExporter::new(SaveCapabilities::none().with_document(document.clone()));

    let outcome = exporter
        .export_table_as(TABLE_HTML, Some("notes"), ExportFormat::Markdown)
        .await;

    assert_eq!(outcome, SaveOutcome::BrowserDownload);
    let path = &document.downloads()[0];
    assert_eq!(path.file_name().unwrap(), "notes.md");
    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "| Title | Link |\n| --- | --- |\n| He said \"hi\" | https://a.example |"
    );
}
