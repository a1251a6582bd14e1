use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use export_logging::{export_debug, export_info};

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("no document context available")]
    NoDocument,
    #[error("object url {0} is not registered")]
    UnknownObjectUrl(String),
    #[error("anchor {0} is not attached")]
    UnknownAnchor(u64),
    #[error("document state is poisoned")]
    Poisoned,
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Downloadable text payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content: String,
    pub mime_type: String,
}

impl Blob {
    pub fn new(content: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            mime_type: mime_type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorId(u64);

impl AnchorId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Browser-like document that can turn a blob into a download.
///
/// Every object url handed out must be revoked and every anchor removed by
/// the caller; `trigger_download` does both on all paths.
pub trait DocumentContext: Send + Sync {
    fn create_object_url(&self, blob: Blob) -> Result<ObjectUrl, DownloadError>;
    fn revoke_object_url(&self, url: &ObjectUrl);
    fn append_anchor(&self, href: &ObjectUrl, download_name: &str)
        -> Result<AnchorId, DownloadError>;
    fn click(&self, anchor: AnchorId) -> Result<(), DownloadError>;
    fn remove_anchor(&self, anchor: AnchorId);
}

/// Blob → object url → transient anchor → click, then release both.
pub fn trigger_download(
    document: &dyn DocumentContext,
    blob: Blob,
    filename: &str,
) -> Result<(), DownloadError> {
    let url = ObjectUrlGuard::create(document, blob)?;
    // Guards drop in reverse order: anchor removed first, then the url revoked.
    let anchor = AnchorGuard::append(document, &url.url, filename)?;
    document.click(anchor.id)
}

struct ObjectUrlGuard<'a> {
    document: &'a dyn DocumentContext,
    url: ObjectUrl,
}

impl<'a> ObjectUrlGuard<'a> {
    fn create(document: &'a dyn DocumentContext, blob: Blob) -> Result<Self, DownloadError> {
        let url = document.create_object_url(blob)?;
        Ok(Self { document, url })
    }
}

impl Drop for ObjectUrlGuard<'_> {
    fn drop(&mut self) {
        self.document.revoke_object_url(&self.url);
    }
}

struct AnchorGuard<'a> {
    document: &'a dyn DocumentContext,
    id: AnchorId,
}

impl<'a> AnchorGuard<'a> {
    fn append(
        document: &'a dyn DocumentContext,
        href: &ObjectUrl,
        download_name: &str,
    ) -> Result<Self, DownloadError> {
        let id = document.append_anchor(href, download_name)?;
        Ok(Self { document, id })
    }
}

impl Drop for AnchorGuard<'_> {
    fn drop(&mut self) {
        self.document.remove_anchor(self.id);
    }
}

#[derive(Debug)]
struct Anchor {
    href: ObjectUrl,
    download_name: String,
}

#[derive(Debug, Default)]
struct DocumentState {
    next_id: u64,
    blobs: HashMap<ObjectUrl, Blob>,
    anchors: HashMap<AnchorId, Anchor>,
    downloads: Vec<PathBuf>,
}

/// Document whose downloads land in a directory, the way a browser saves
/// into its downloads folder: existing files are never overwritten.
#[derive(Debug)]
pub struct DownloadDirDocument {
    writer: AtomicFileWriter,
    state: Mutex<DocumentState>,
}

impl DownloadDirDocument {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
            state: Mutex::new(DocumentState::default()),
        }
    }

    /// Files written so far, in click order.
    pub fn downloads(&self) -> Vec<PathBuf> {
        self.state
            .lock()
            .map(|state| state.downloads.clone())
            .unwrap_or_default()
    }

    /// Object urls and anchors that have not been released yet.
    pub fn live_resources(&self) -> (usize, usize) {
        self.state
            .lock()
            .map(|state| (state.blobs.len(), state.anchors.len()))
            .unwrap_or_default()
    }
}

impl DocumentContext for DownloadDirDocument {
    fn create_object_url(&self, blob: Blob) -> Result<ObjectUrl, DownloadError> {
        let mut state = self.state.lock().map_err(|_| DownloadError::Poisoned)?;
        state.next_id += 1;
        let url = ObjectUrl::new(format!("blob:tablex/{}", state.next_id));
        export_debug!(
            "Created {} ({} bytes, {})",
            url.as_str(),
            blob.content.len(),
            blob.mime_type
        );
        state.blobs.insert(url.clone(), blob);
        Ok(url)
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        if let Ok(mut state) = self.state.lock() {
            state.blobs.remove(url);
        }
    }

    fn append_anchor(
        &self,
        href: &ObjectUrl,
        download_name: &str,
    ) -> Result<AnchorId, DownloadError> {
        let mut state = self.state.lock().map_err(|_| DownloadError::Poisoned)?;
        if !state.blobs.contains_key(href) {
            return Err(DownloadError::UnknownObjectUrl(href.as_str().to_string()));
        }
        state.next_id += 1;
        let id = AnchorId::new(state.next_id);
        state.anchors.insert(
            id,
            Anchor {
                href: href.clone(),
                download_name: download_name.to_string(),
            },
        );
        Ok(id)
    }

    fn click(&self, anchor: AnchorId) -> Result<(), DownloadError> {
        let (download_name, content) = {
            let state = self.state.lock().map_err(|_| DownloadError::Poisoned)?;
            let anchor = state
                .anchors
                .get(&anchor)
                .ok_or(DownloadError::UnknownAnchor(anchor.value()))?;
            let blob = state
                .blobs
                .get(&anchor.href)
                .ok_or_else(|| DownloadError::UnknownObjectUrl(anchor.href.as_str().to_string()))?;
            (anchor.download_name.clone(), blob.content.clone())
        };

        let path = self.writer.write_unique(&download_name, &content)?;
        export_info!("Downloaded {:?}", path);
        if let Ok(mut state) = self.state.lock() {
            state.downloads.push(path);
        }
        Ok(())
    }

    fn remove_anchor(&self, anchor: AnchorId) {
        if let Ok(mut state) = self.state.lock() {
            state.anchors.remove(&anchor);
        }
    }
}
