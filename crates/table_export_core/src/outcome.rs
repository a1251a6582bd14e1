use std::fmt;

/// What an export attempt ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to a path chosen in the native save dialog.
    NativeSave,
    /// Delivered as a browser-style download.
    BrowserDownload,
    /// Nothing was saved: no table, dialog cancelled, or no place to save.
    None,
}

impl SaveOutcome {
    pub fn is_saved(self) -> bool {
        !matches!(self, SaveOutcome::None)
    }
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveOutcome::NativeSave => write!(f, "native save"),
            SaveOutcome::BrowserDownload => write!(f, "browser download"),
            SaveOutcome::None => write!(f, "none"),
        }
    }
}
